use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use driftcorr_core::pipeline::config::{
    AlignConfig, FrameRange, Interpolation, RegistrationConfig, RegistrationMethod, ReportConfig,
};
use driftcorr_core::pipeline::{run_alignment, PipelineStage, ProgressReporter};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use crate::summary::{print_align_summary, print_result_summary};

#[derive(Clone, ValueEnum)]
pub enum MethodArg {
    /// Plain cross-correlation, tolerant of pixel noise
    Cross,
    /// Whitened cross-power spectrum, sharper on clean data
    Phase,
}

#[derive(Clone, ValueEnum)]
pub enum InterpolationArg {
    Linear,
    Nearest,
}

#[derive(Args)]
pub struct AlignArgs {
    /// Image directory, SER file or multi-page TIFF
    pub input: Option<PathBuf>,

    /// Alignment config file (TOML); other options are ignored when given
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Aligned stack: a .ser file, a .tif multi-page TIFF, or a directory of TIFF frames
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// First frame index to align
    #[arg(long, default_value = "0")]
    pub min: usize,

    /// Last frame index to align (inclusive, clamped to the stack)
    #[arg(long, default_value = "9999")]
    pub max: usize,

    /// Shift estimation method
    #[arg(long, value_enum, default_value = "cross")]
    pub method: MethodArg,

    /// Resampling interpolation
    #[arg(long, value_enum, default_value = "linear")]
    pub interpolation: InterpolationArg,

    /// Directory receiving shifts.txt, shifts_cumul.txt and their plots
    #[arg(long)]
    pub report_dir: Option<PathBuf>,

    /// Skip the shift plots
    #[arg(long)]
    pub no_plot: bool,
}

pub fn run(args: &AlignArgs) -> Result<()> {
    let config = if let Some(ref config_path) = args.config {
        let contents = std::fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config {}", config_path.display()))?;
        let config: AlignConfig = toml::from_str(&contents).context("Invalid alignment config")?;
        info!(path = %config_path.display(), "Loaded alignment config");
        config
    } else {
        build_config_from_args(args)?
    };

    print_align_summary(&config);

    let reporter = Arc::new(BarReporter::new()?);
    let output = run_alignment(&config, reporter.clone(), None)?;
    reporter.bar.finish_and_clear();

    print_result_summary(&config, &output);
    Ok(())
}

fn build_config_from_args(args: &AlignArgs) -> Result<AlignConfig> {
    let input = args
        .input
        .clone()
        .context("An input path is required unless --config is given")?;

    let method = match args.method {
        MethodArg::Phase => RegistrationMethod::PhaseCorrelation,
        MethodArg::Cross => RegistrationMethod::CrossCorrelation,
    };
    let interpolation = match args.interpolation {
        InterpolationArg::Linear => Interpolation::Linear,
        InterpolationArg::Nearest => Interpolation::Nearest,
    };

    Ok(AlignConfig {
        input,
        output: args.output.clone(),
        range: FrameRange::new(args.min, args.max),
        registration: RegistrationConfig {
            method,
            interpolation,
        },
        report: args.report_dir.as_ref().map(|dir| ReportConfig {
            dir: dir.clone(),
            plot: !args.no_plot,
        }),
    })
}

/// Drives a terminal progress bar from pipeline stage updates.
struct BarReporter {
    bar: ProgressBar,
}

impl BarReporter {
    fn new() -> Result<Self> {
        let bar = ProgressBar::new(0);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{msg:20} [{bar:40}] {pos}/{len}")?
                .progress_chars("=> "),
        );
        Ok(Self { bar })
    }
}

impl ProgressReporter for BarReporter {
    fn begin_stage(&self, stage: PipelineStage, total_items: Option<usize>) {
        self.bar.set_message(stage.to_string());
        self.bar.set_length(total_items.unwrap_or(0) as u64);
        self.bar.set_position(0);
    }

    fn advance(&self, items_done: usize) {
        self.bar.set_position(items_done as u64);
    }

    fn finish_stage(&self) {
        if let Some(len) = self.bar.length() {
            self.bar.set_position(len);
        }
    }
}
