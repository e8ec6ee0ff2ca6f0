use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DriftError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid SER file: {0}")]
    InvalidSer(String),

    #[error("Invalid image dimensions: {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("Frame index {index} out of range (total: {total})")]
    FrameIndexOutOfRange { index: usize, total: usize },

    #[error("Image format error: {0}")]
    ImageError(#[from] image::ImageError),

    #[error("TIFF error: {0}")]
    Tiff(#[from] tiff::TiffError),

    #[error("Invalid TIFF stack: {0}")]
    InvalidTiff(String),

    /// The requested frame range selects no frames.
    #[error("Empty frame sequence")]
    EmptySequence,

    /// A frame does not share the dimensions of the first frame in the range.
    #[error(
        "Frame {index} is {found_width}x{found_height}, expected {expected_width}x{expected_height}"
    )]
    ShapeMismatch {
        index: usize,
        expected_width: usize,
        expected_height: usize,
        found_width: usize,
        found_height: usize,
    },

    #[error("Registration failed: {0}")]
    Registration(String),

    #[error("Resampling failed: {0}")]
    Resample(String),

    /// Accumulated drift leaves no pixel shared by every frame.
    #[error(
        "Drift exceeds the frame: valid region rows {row_start}..{row_end}, cols {col_start}..{col_end}"
    )]
    EmptyValidRegion {
        row_start: i64,
        row_end: i64,
        col_start: i64,
        col_end: i64,
    },

    #[error("Alignment cancelled")]
    Cancelled,

    #[error("Pipeline error: {0}")]
    Pipeline(String),

    #[error("Unsupported frame source: {}", .0.display())]
    UnsupportedSource(PathBuf),

    #[error("Report error: {0}")]
    Report(String),
}

impl DriftError {
    /// True for errors caused by the shape of the input stack rather than its content.
    pub fn is_input_shape(&self) -> bool {
        matches!(self, Self::EmptySequence | Self::ShapeMismatch { .. })
    }
}

pub type Result<T> = std::result::Result<T, DriftError>;
