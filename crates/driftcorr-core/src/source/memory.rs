use ndarray::{Array3, Axis};
use num_traits::ToPrimitive;

use crate::error::Result;
use crate::frame::{Frame, SourceInfo, SourceKind};

use super::{check_index, FrameSource};

/// Frames held in memory.
#[derive(Clone, Debug, Default)]
pub struct MemorySource {
    frames: Vec<Frame>,
}

impl MemorySource {
    pub fn new(frames: Vec<Frame>) -> Self {
        Self { frames }
    }

    /// Split a (frames, rows, cols) array into frames.
    pub fn from_array3(stack: &Array3<f32>) -> Self {
        let frames = stack
            .axis_iter(Axis(0))
            .enumerate()
            .map(|(i, plane)| Frame::new(plane.to_owned(), 32).with_index(i))
            .collect();
        Self { frames }
    }

    /// Split a numeric (frames, rows, cols) array into frames. Values are kept
    /// as-is, not rescaled; values with no f32 representation become NaN.
    /// Normalize to [0, 1] before handing the aligned frames to `write_stack`.
    pub fn from_numeric<T: ToPrimitive>(stack: &Array3<T>) -> Self {
        let bit_depth = (std::mem::size_of::<T>() * 8).min(u8::MAX as usize) as u8;
        let frames = stack
            .axis_iter(Axis(0))
            .enumerate()
            .map(|(i, plane)| {
                let data = plane.map(|v| v.to_f32().unwrap_or(f32::NAN));
                Frame::new(data, bit_depth).with_index(i)
            })
            .collect();
        Self { frames }
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }
}

/// A borrowed slice of frames is a source too.
impl FrameSource for [Frame] {
    fn len(&self) -> usize {
        <[Frame]>::len(self)
    }

    fn frame_dims(&self, index: usize) -> Result<(usize, usize)> {
        check_index(index, <[Frame]>::len(self))?;
        Ok(self[index].dims())
    }

    fn read_frame(&self, index: usize) -> Result<Frame> {
        check_index(index, <[Frame]>::len(self))?;
        Ok(self[index].clone().with_index(index))
    }

    fn info(&self) -> Result<SourceInfo> {
        let (height, width) = self.first().map(Frame::dims).unwrap_or((0, 0));
        Ok(SourceInfo {
            kind: SourceKind::Memory,
            path: None,
            total_frames: <[Frame]>::len(self),
            width,
            height,
            bit_depth: self.first().map_or(0, |f| f.original_bit_depth),
        })
    }
}

impl FrameSource for MemorySource {
    fn len(&self) -> usize {
        self.frames.len()
    }

    fn frame_dims(&self, index: usize) -> Result<(usize, usize)> {
        self.frames.as_slice().frame_dims(index)
    }

    fn read_frame(&self, index: usize) -> Result<Frame> {
        self.frames.as_slice().read_frame(index)
    }

    fn info(&self) -> Result<SourceInfo> {
        self.frames.as_slice().info()
    }
}
