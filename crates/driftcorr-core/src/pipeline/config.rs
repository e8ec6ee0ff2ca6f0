use std::ops::Range;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::consts::{DEFAULT_INDEX_MAX, DEFAULT_INDEX_MIN};
use crate::error::{DriftError, Result};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AlignConfig {
    /// Image directory or SER file.
    pub input: PathBuf,
    /// Aligned stack destination: a `.ser` file or a directory of TIFF frames.
    pub output: Option<PathBuf>,
    #[serde(default)]
    pub range: FrameRange,
    #[serde(default)]
    pub registration: RegistrationConfig,
    pub report: Option<ReportConfig>,
}

impl AlignConfig {
    /// Align every frame of `input` with default registration, writing nothing.
    pub fn new(input: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            output: None,
            range: FrameRange::default(),
            registration: RegistrationConfig::default(),
            report: None,
        }
    }
}

/// Inclusive frame index range, clamped to the frames a source holds.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct FrameRange {
    pub min: usize,
    pub max: usize,
}

impl Default for FrameRange {
    fn default() -> Self {
        Self {
            min: DEFAULT_INDEX_MIN,
            max: DEFAULT_INDEX_MAX,
        }
    }
}

impl FrameRange {
    pub fn new(min: usize, max: usize) -> Self {
        Self { min, max }
    }

    /// Every frame of the source.
    pub fn all() -> Self {
        Self::new(0, usize::MAX)
    }

    /// Half-open source indices selected by this range out of `count` frames.
    pub fn resolve(&self, count: usize) -> Result<Range<usize>> {
        let end = self.max.saturating_add(1).min(count);
        if self.min >= end {
            return Err(DriftError::EmptySequence);
        }
        Ok(self.min..end)
    }

    /// True when an explicitly chosen `max` lies past the last of `count`
    /// frames. The default and open-ended bounds never count as clamped.
    pub fn clamps_explicit_max(&self, count: usize) -> bool {
        self.max != DEFAULT_INDEX_MAX && self.max != usize::MAX && self.max >= count
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct RegistrationConfig {
    #[serde(default)]
    pub method: RegistrationMethod,
    #[serde(default)]
    pub interpolation: Interpolation,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub enum RegistrationMethod {
    /// Whitened cross-power spectrum. Sharp peak on clean data, unreliable
    /// under strong pixel noise.
    PhaseCorrelation,
    #[default]
    CrossCorrelation,
}

impl std::fmt::Display for RegistrationMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PhaseCorrelation => write!(f, "Phase Correlation"),
            Self::CrossCorrelation => write!(f, "Cross Correlation"),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub enum Interpolation {
    #[default]
    Linear,
    Nearest,
}

impl std::fmt::Display for Interpolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Linear => write!(f, "Linear"),
            Self::Nearest => write!(f, "Nearest"),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Directory receiving the shift tables and plots.
    pub dir: PathBuf,
    #[serde(default = "default_plot")]
    pub plot: bool,
}

fn default_plot() -> bool {
    true
}
