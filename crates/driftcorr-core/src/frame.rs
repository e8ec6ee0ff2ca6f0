use std::ops::{Add, AddAssign, Neg, Sub};
use std::path::PathBuf;

use ndarray::Array2;
use serde::{Deserialize, Serialize};

/// A single grayscale image frame.
/// Pixel values are f32. File loaders scale integer samples to [0.0, 1.0];
/// in-memory stacks keep the values they were given.
#[derive(Clone, Debug)]
pub struct Frame {
    /// Pixel data, row-major, shape = (height, width)
    pub data: Array2<f32>,
    /// Original bit depth before conversion (8, 16 or 32 for float data)
    pub original_bit_depth: u8,
    pub metadata: FrameMetadata,
}

impl Frame {
    pub fn new(data: Array2<f32>, bit_depth: u8) -> Self {
        Self {
            data,
            original_bit_depth: bit_depth,
            metadata: FrameMetadata::default(),
        }
    }

    /// Same frame tagged with its index in the source.
    pub fn with_index(mut self, index: usize) -> Self {
        self.metadata.frame_index = index;
        self
    }

    pub fn width(&self) -> usize {
        self.data.ncols()
    }

    pub fn height(&self) -> usize {
        self.data.nrows()
    }

    /// (height, width)
    pub fn dims(&self) -> (usize, usize) {
        self.data.dim()
    }
}

#[derive(Clone, Debug, Default)]
pub struct FrameMetadata {
    pub frame_index: usize,
    pub timestamp_us: Option<u64>,
}

/// Translation between two frames, in pixels.
///
/// `dx` runs along columns (x), `dy` along rows (y). A target displaced by
/// `(dx, dy)` relative to its reference shows reference content at
/// `(col + dx, row + dy)`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ShiftVector {
    pub dx: f64,
    pub dy: f64,
}

impl ShiftVector {
    pub const ZERO: ShiftVector = ShiftVector { dx: 0.0, dy: 0.0 };

    pub fn new(dx: f64, dy: f64) -> Self {
        Self { dx, dy }
    }

    pub fn is_finite(&self) -> bool {
        self.dx.is_finite() && self.dy.is_finite()
    }

    pub fn magnitude(&self) -> f64 {
        self.dx.hypot(self.dy)
    }
}

impl Add for ShiftVector {
    type Output = ShiftVector;

    fn add(self, rhs: ShiftVector) -> ShiftVector {
        ShiftVector::new(self.dx + rhs.dx, self.dy + rhs.dy)
    }
}

impl AddAssign for ShiftVector {
    fn add_assign(&mut self, rhs: ShiftVector) {
        self.dx += rhs.dx;
        self.dy += rhs.dy;
    }
}

impl Sub for ShiftVector {
    type Output = ShiftVector;

    fn sub(self, rhs: ShiftVector) -> ShiftVector {
        ShiftVector::new(self.dx - rhs.dx, self.dy - rhs.dy)
    }
}

impl Neg for ShiftVector {
    type Output = ShiftVector;

    fn neg(self) -> ShiftVector {
        ShiftVector::new(-self.dx, -self.dy)
    }
}

impl std::fmt::Display for ShiftVector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:+.3}, {:+.3})", self.dx, self.dy)
    }
}

/// Kind of storage a frame source reads from.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SourceKind {
    Memory,
    Directory,
    Ser,
    TiffStack,
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Memory => write!(f, "In-memory stack"),
            Self::Directory => write!(f, "Image directory"),
            Self::Ser => write!(f, "SER video"),
            Self::TiffStack => write!(f, "Multi-page TIFF"),
        }
    }
}

/// Metadata about a frame source.
#[derive(Clone, Debug)]
pub struct SourceInfo {
    pub kind: SourceKind,
    pub path: Option<PathBuf>,
    pub total_frames: usize,
    /// Dimensions of the first frame, if any.
    pub width: usize,
    pub height: usize,
    pub bit_depth: u8,
}
