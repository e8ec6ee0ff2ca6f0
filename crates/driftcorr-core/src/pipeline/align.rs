use std::ops::Range;

use tracing::{debug, info};

use crate::drift::DriftAccumulator;
use crate::error::{DriftError, Result};
use crate::frame::Frame;
use crate::register::Registration;
use crate::region::ValidRegion;
use crate::source::FrameSource;

use super::config::FrameRange;
use super::types::{AlignmentOutput, CancelToken, PipelineState};

/// Sequential frame-to-previous-frame alignment.
///
/// A pipeline runs once: after `run` it is either `Done` or `Failed`, and a
/// second run is rejected. Failed runs return no partial output.
pub struct AlignmentPipeline<'a, R: Registration + ?Sized> {
    registration: &'a R,
    cancel: Option<CancelToken>,
    state: PipelineState,
}

impl<'a, R: Registration + ?Sized> AlignmentPipeline<'a, R> {
    pub fn new(registration: &'a R) -> Self {
        Self {
            registration,
            cancel: None,
            state: PipelineState::Idle,
        }
    }

    /// Abort the run with [`DriftError::Cancelled`] once `token` is cancelled.
    pub fn with_cancel(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    /// Align every frame of an in-memory stack.
    pub fn run_frames<P>(&mut self, frames: &[Frame], progress: P) -> Result<AlignmentOutput>
    where
        P: FnMut(usize, usize) -> Result<()>,
    {
        self.run(frames, FrameRange::all(), progress)
    }

    /// Align the frames of `source` selected by `range`.
    ///
    /// `progress` is called with `(k, total)` after frame `k` of the range is
    /// aligned; an error from it aborts the run.
    pub fn run<S, P>(&mut self, source: &S, range: FrameRange, progress: P) -> Result<AlignmentOutput>
    where
        S: FrameSource + ?Sized,
        P: FnMut(usize, usize) -> Result<()>,
    {
        if self.state != PipelineState::Idle {
            return Err(DriftError::Pipeline(format!(
                "pipeline cannot run from state {}",
                self.state
            )));
        }

        let result = self.execute(source, range, progress);
        self.state = match result {
            Ok(_) => PipelineState::Done,
            Err(_) => PipelineState::Failed,
        };
        result
    }

    fn execute<S, P>(&mut self, source: &S, range: FrameRange, mut progress: P) -> Result<AlignmentOutput>
    where
        S: FrameSource + ?Sized,
        P: FnMut(usize, usize) -> Result<()>,
    {
        let indices = range.resolve(source.len())?;
        let total = indices.len();
        let dims = check_shapes(source, indices.clone())?;
        info!(
            frames = total,
            first = indices.start,
            width = dims.1,
            height = dims.0,
            "Aligning frames"
        );

        let mut drift = DriftAccumulator::new(self.registration);
        drift.reset();
        let mut aligned = Vec::with_capacity(total);
        let mut shifts = Vec::with_capacity(total);
        let mut cumulative = Vec::with_capacity(total);

        self.state = PipelineState::Priming;
        for (k, index) in indices.enumerate() {
            if self.cancel.as_ref().is_some_and(CancelToken::is_cancelled) {
                info!(frame = index, "Alignment cancelled");
                return Err(DriftError::Cancelled);
            }

            let frame = source.read_frame(index)?;
            if frame.dims() != dims {
                return Err(shape_mismatch(index, dims, frame.dims()));
            }

            let observation = drift.observe(&frame)?;
            let output = if k == 0 {
                frame
            } else {
                self.registration.resample(&frame, -observation.cumulative)?
            };
            debug!(
                frame = index,
                dx = observation.shift.dx,
                dy = observation.shift.dy,
                cumulative_dx = observation.cumulative.dx,
                cumulative_dy = observation.cumulative.dy,
                "Frame aligned"
            );

            aligned.push(output);
            shifts.push(observation.shift);
            cumulative.push(observation.cumulative);
            if k == 0 {
                self.state = PipelineState::Aligning;
            }
            progress(k, total)?;
        }

        self.state = PipelineState::Cropping;
        let region = ValidRegion::from_cumulative(&cumulative, dims.0, dims.1)?;
        let frames = if region.is_full(dims.0, dims.1) {
            aligned
        } else {
            region.crop_stack(&aligned)
        };

        let total_drift = cumulative.last().copied().unwrap_or_default();
        info!(%region, %total_drift, "Alignment complete");

        Ok(AlignmentOutput {
            frames,
            shifts,
            cumulative,
            region,
            source_dims: dims,
        })
    }
}

/// Dimensions shared by every frame in `indices`, checked before any registration work.
fn check_shapes<S: FrameSource + ?Sized>(
    source: &S,
    mut indices: Range<usize>,
) -> Result<(usize, usize)> {
    let first = indices.next().ok_or(DriftError::EmptySequence)?;
    let dims = source.frame_dims(first)?;
    if dims.0 == 0 || dims.1 == 0 {
        return Err(DriftError::InvalidDimensions {
            width: dims.1 as u32,
            height: dims.0 as u32,
        });
    }
    for index in indices {
        let found = source.frame_dims(index)?;
        if found != dims {
            return Err(shape_mismatch(index, dims, found));
        }
    }
    Ok(dims)
}

fn shape_mismatch(index: usize, expected: (usize, usize), found: (usize, usize)) -> DriftError {
    DriftError::ShapeMismatch {
        index,
        expected_width: expected.1,
        expected_height: expected.0,
        found_width: found.1,
        found_height: found.0,
    }
}
