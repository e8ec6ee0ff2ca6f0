use console::Style;
use driftcorr_core::pipeline::config::AlignConfig;
use driftcorr_core::pipeline::AlignmentOutput;

struct Styles {
    title: Style,
    header: Style,
    label: Style,
    value: Style,
    method: Style,
    disabled: Style,
    path: Style,
}

impl Styles {
    fn new() -> Self {
        Self {
            title: Style::new().cyan().bold(),
            header: Style::new().cyan().bold(),
            label: Style::new().dim(),
            value: Style::new().bold().white(),
            method: Style::new().green(),
            disabled: Style::new().dim().yellow(),
            path: Style::new().underlined(),
        }
    }
}

pub fn print_align_summary(config: &AlignConfig) {
    let s = Styles::new();

    println!();
    println!("  {}", s.title.apply_to("Drift Correction"));
    println!("  {}", s.title.apply_to("\u{2550}".repeat(16)));
    println!();

    println!(
        "  {:<14}{}",
        s.label.apply_to("Input"),
        s.path.apply_to(config.input.display())
    );
    match config.output {
        Some(ref path) => println!(
            "  {:<14}{}",
            s.label.apply_to("Output"),
            s.path.apply_to(path.display())
        ),
        None => println!(
            "  {:<14}{}",
            s.label.apply_to("Output"),
            s.disabled.apply_to("not saved")
        ),
    }
    println!(
        "  {:<14}{}",
        s.label.apply_to("Frames"),
        s.value.apply_to(format!("{}..={}", config.range.min, config.range.max))
    );
    println!();

    println!("  {}", s.header.apply_to("Registration"));
    println!(
        "    {:<12}{}",
        s.label.apply_to("Method"),
        s.method.apply_to(config.registration.method)
    );
    println!(
        "    {:<12}{}",
        s.label.apply_to("Resample"),
        s.method.apply_to(config.registration.interpolation)
    );
    println!();

    match config.report {
        Some(ref report) => {
            println!("  {}", s.header.apply_to("Report"));
            println!(
                "    {:<12}{}",
                s.label.apply_to("Directory"),
                s.path.apply_to(report.dir.display())
            );
            println!(
                "    {:<12}{}",
                s.label.apply_to("Plots"),
                s.value.apply_to(if report.plot { "yes" } else { "no" })
            );
        }
        None => println!(
            "  {:<14}{}",
            s.header.apply_to("Report"),
            s.disabled.apply_to("disabled")
        ),
    }
    println!();
}

pub fn print_result_summary(config: &AlignConfig, output: &AlignmentOutput) {
    let s = Styles::new();
    let (height, width) = output.source_dims;

    println!("  {}", s.header.apply_to("Result"));
    println!(
        "    {:<12}{}",
        s.label.apply_to("Aligned"),
        s.value.apply_to(format!("{} frames", output.len()))
    );
    println!(
        "    {:<12}{}",
        s.label.apply_to("Drift"),
        s.value.apply_to(output.total_drift())
    );
    println!(
        "    {:<12}{}",
        s.label.apply_to("Cropped"),
        s.value.apply_to(format!(
            "{}x{} -> {}x{}",
            width,
            height,
            output.region.width(),
            output.region.height()
        ))
    );
    println!(
        "    {:<12}{}",
        s.label.apply_to("Region"),
        s.value.apply_to(output.region)
    );
    if let Some(ref path) = config.output {
        println!(
            "    {:<12}{}",
            s.label.apply_to("Saved"),
            s.path.apply_to(path.display())
        );
    }
    println!();
}
