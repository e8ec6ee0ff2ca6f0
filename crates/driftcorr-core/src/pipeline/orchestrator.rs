use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::error::Result;
use crate::io::write_stack;
use crate::register::Registrar;
use crate::report::{Reporter, ShiftTableReporter};
use crate::source::open_source;

use super::align::AlignmentPipeline;
use super::config::AlignConfig;
use super::types::{AlignmentOutput, CancelToken, PipelineStage, ProgressReporter};

/// Open the configured source, align it, then write the aligned stack and the
/// shift report when the config asks for them.
pub fn run_alignment(
    config: &AlignConfig,
    reporter: Arc<dyn ProgressReporter>,
    cancel: Option<CancelToken>,
) -> Result<AlignmentOutput> {
    reporter.begin_stage(PipelineStage::Reading, None);
    let source = open_source(&config.input)?;
    let available = source.len();
    info!(
        input = %config.input.display(),
        frames = available,
        "Opened frame source"
    );
    if config.range.clamps_explicit_max(available) {
        warn!(
            requested = config.range.max,
            last = available.saturating_sub(1),
            "Frame range clamped to the available frames"
        );
    } else if config.range.max >= available {
        debug!(last = available.saturating_sub(1), "Using every frame from the range start");
    }
    let selected = config.range.resolve(available)?.len();
    reporter.finish_stage();

    let registrar = Registrar::from_config(&config.registration);
    info!(
        method = %registrar.method,
        interpolation = %registrar.interpolation,
        "Registration configured"
    );

    let mut pipeline = AlignmentPipeline::new(&registrar);
    if let Some(token) = cancel {
        pipeline = pipeline.with_cancel(token);
    }

    reporter.begin_stage(PipelineStage::Alignment, Some(selected));
    let output = pipeline.run(source.as_ref(), config.range, |k, _total| {
        reporter.advance(k + 1);
        Ok(())
    })?;
    reporter.finish_stage();

    if let Some(ref path) = config.output {
        reporter.begin_stage(PipelineStage::Writing, None);
        write_stack(&output.frames, path)?;
        reporter.finish_stage();
    }

    if let Some(ref report) = config.report {
        reporter.begin_stage(PipelineStage::Reporting, None);
        let mut tables = ShiftTableReporter::new(&report.dir, report.plot);
        tables.report(&output.shifts, &output.cumulative)?;
        reporter.finish_stage();
    }

    Ok(output)
}
