use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::frame::{Frame, ShiftVector};
use crate::region::ValidRegion;

/// Processing stage, used for progress reporting.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PipelineStage {
    Reading,
    Alignment,
    Writing,
    Reporting,
}

impl std::fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Reading => write!(f, "Reading frames"),
            Self::Alignment => write!(f, "Aligning frames"),
            Self::Writing => write!(f, "Writing output"),
            Self::Reporting => write!(f, "Saving shifts"),
        }
    }
}

/// Lifecycle of one [`AlignmentPipeline`](super::AlignmentPipeline) run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PipelineState {
    Idle,
    /// Frame 0 is being recorded as the initial reference.
    Priming,
    Aligning,
    Cropping,
    Done,
    Failed,
}

impl PipelineState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }
}

impl std::fmt::Display for PipelineState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "Idle"),
            Self::Priming => write!(f, "Priming"),
            Self::Aligning => write!(f, "Aligning"),
            Self::Cropping => write!(f, "Cropping"),
            Self::Done => write!(f, "Done"),
            Self::Failed => write!(f, "Failed"),
        }
    }
}

/// Cooperative cancellation flag, checked between frames.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Aligned, cropped stack and the drift history that produced it.
#[derive(Clone, Debug)]
pub struct AlignmentOutput {
    /// Aligned frames cropped to `region`, in input order.
    pub frames: Vec<Frame>,
    /// Shift of each frame relative to its predecessor; element 0 is zero.
    pub shifts: Vec<ShiftVector>,
    /// Shift of each frame relative to frame 0.
    pub cumulative: Vec<ShiftVector>,
    pub region: ValidRegion,
    /// (height, width) of the input frames.
    pub source_dims: (usize, usize),
}

impl AlignmentOutput {
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Total drift between the first and last frame.
    pub fn total_drift(&self) -> ShiftVector {
        self.cumulative.last().copied().unwrap_or_default()
    }
}

/// Thread-safe progress reporting for the pipeline.
///
/// Implementors can use this to drive progress bars, logging, or any other
/// UI feedback. All methods have default no-op implementations.
pub trait ProgressReporter: Send + Sync {
    /// A new pipeline stage has started. `total_items` is the number of
    /// work items in this stage (e.g., frame count), if known.
    fn begin_stage(&self, _stage: PipelineStage, _total_items: Option<usize>) {}

    /// One work item within the current stage has completed.
    fn advance(&self, _items_done: usize) {}

    /// The current stage is finished.
    fn finish_stage(&self) {}
}

/// Reporter that ignores every update.
pub struct NoOpReporter;
impl ProgressReporter for NoOpReporter {}
