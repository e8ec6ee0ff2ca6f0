#![allow(dead_code)]

use std::cell::{Cell, RefCell};

use ndarray::Array2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use driftcorr_core::error::{DriftError, Result};
use driftcorr_core::frame::{Frame, ShiftVector};
use driftcorr_core::pipeline::config::Interpolation;
use driftcorr_core::register::{shift_frame, Registration};

/// Image of bright dots of `radius` px on a square lattice with `space` px
/// between neighbours. `staggered` adds a second lattice offset by half a
/// period in both directions.
pub fn multi_dots(height: usize, width: usize, radius: f64, space: f64, staggered: bool) -> Array2<f32> {
    let per = 2.0 * radius + space;
    let half = 0.5 * per;
    let inside = |x: f64, y: f64| {
        let dx = x.rem_euclid(per) - half;
        let dy = y.rem_euclid(per) - half;
        dx * dx + dy * dy < radius * radius
    };
    Array2::from_shape_fn((height, width), |(row, col)| {
        let (x, y) = (col as f64, row as f64);
        if inside(x, y) || (staggered && inside(x + half, y + half)) {
            1.0
        } else {
            0.0
        }
    })
}

/// `count` Gaussian blobs of width `sigma` at random positions.
pub fn random_blobs(height: usize, width: usize, count: usize, sigma: f64, seed: u64) -> Array2<f32> {
    let mut rng = StdRng::seed_from_u64(seed);
    let centers: Vec<(f64, f64)> = (0..count)
        .map(|_| {
            (
                rng.random_range(0.0..height as f64),
                rng.random_range(0.0..width as f64),
            )
        })
        .collect();
    let mut img = Array2::from_shape_fn((height, width), |(row, col)| {
        centers
            .iter()
            .map(|&(cy, cx)| {
                let d2 = (row as f64 - cy).powi(2) + (col as f64 - cx).powi(2);
                (-d2 / (2.0 * sigma * sigma)).exp()
            })
            .sum::<f64>() as f32
    });
    let max = img.fold(0.0f32, |m, &v| m.max(v));
    if max > 0.0 {
        img.mapv_inplace(|v| v / max);
    }
    img
}

/// Drifting, noisy copies of `base`: frame k is `base` translated by
/// `k * step` plus a uniform jitter in `[-jitter, jitter]` per axis, with
/// uniform noise of amplitude `noise` added and samples clamped to [0, 1].
///
/// Returns the frames and the true translation of each.
pub fn drifting_stack(
    base: &Array2<f32>,
    count: usize,
    step: ShiftVector,
    jitter: f64,
    noise: f32,
    seed: u64,
) -> (Vec<Frame>, Vec<ShiftVector>) {
    let mut rng = StdRng::seed_from_u64(seed);
    let source = Frame::new(base.clone(), 32);
    let mut frames = Vec::with_capacity(count);
    let mut truth = Vec::with_capacity(count);

    for k in 0..count {
        let shift = ShiftVector::new(
            k as f64 * step.dx + rng.random_range(-jitter..=jitter),
            k as f64 * step.dy + rng.random_range(-jitter..=jitter),
        );
        let mut frame = shift_frame(&source, shift, Interpolation::Linear);
        if noise > 0.0 {
            frame
                .data
                .mapv_inplace(|v| (v + noise * (2.0 * rng.random::<f32>() - 1.0)).clamp(0.0, 1.0));
        }
        frames.push(frame.with_index(k));
        truth.push(shift);
    }
    (frames, truth)
}

/// `count` frames of `height` x `width`, frame k filled with the value `k`.
pub fn constant_frames(count: usize, height: usize, width: usize) -> Vec<Frame> {
    (0..count)
        .map(|k| Frame::new(Array2::from_elem((height, width), k as f32), 32).with_index(k))
        .collect()
}

/// Registration stub returning a fixed shift per target frame index and
/// recording every call it receives.
pub struct ScriptedRegistration {
    /// Shift returned when frame `k` is the target.
    pub shifts: Vec<ShiftVector>,
    /// Fail `find_shift` when this frame index is the target.
    pub fail_on: Option<usize>,
    pub find_calls: Cell<usize>,
    /// (reference index, first sample of the reference) per `find_shift` call.
    pub references: RefCell<Vec<(usize, f32)>>,
    /// Shift passed to each `resample` call.
    pub resampled: RefCell<Vec<ShiftVector>>,
}

impl ScriptedRegistration {
    pub fn new(shifts: Vec<ShiftVector>) -> Self {
        Self {
            shifts,
            fail_on: None,
            find_calls: Cell::new(0),
            references: RefCell::new(Vec::new()),
            resampled: RefCell::new(Vec::new()),
        }
    }

    pub fn zero(count: usize) -> Self {
        Self::new(vec![ShiftVector::ZERO; count])
    }

    pub fn failing_on(mut self, index: usize) -> Self {
        self.fail_on = Some(index);
        self
    }

    pub fn calls(&self) -> usize {
        self.find_calls.get()
    }
}

impl Registration for ScriptedRegistration {
    fn find_shift(&self, reference: &Frame, target: &Frame) -> Result<ShiftVector> {
        self.find_calls.set(self.find_calls.get() + 1);
        self.references
            .borrow_mut()
            .push((reference.metadata.frame_index, reference.data[[0, 0]]));

        let index = target.metadata.frame_index;
        if self.fail_on == Some(index) {
            return Err(DriftError::Registration(format!("no peak for frame {index}")));
        }
        Ok(self.shifts.get(index).copied().unwrap_or_default())
    }

    /// Replaces every sample with -1 so tests can tell resampled frames
    /// from raw ones.
    fn resample(&self, frame: &Frame, shift: ShiftVector) -> Result<Frame> {
        self.resampled.borrow_mut().push(shift);
        let mut out = frame.clone();
        out.data.fill(-1.0);
        Ok(out)
    }
}

pub fn cumsum(shifts: &[ShiftVector]) -> Vec<ShiftVector> {
    shifts
        .iter()
        .scan(ShiftVector::ZERO, |acc, &s| {
            *acc += s;
            Some(*acc)
        })
        .collect()
}

/// 178-byte SER header. `color_id` 0 is mono, 100 is RGB.
pub fn ser_header(width: u32, height: u32, bit_depth: u32, frames: usize, color_id: i32) -> Vec<u8> {
    let mut buf = Vec::with_capacity(driftcorr_core::io::ser::SER_HEADER_SIZE);
    buf.extend_from_slice(b"LUCAM-RECORDER");
    // LuID, ColorID, LittleEndian
    buf.extend_from_slice(&0i32.to_le_bytes());
    buf.extend_from_slice(&color_id.to_le_bytes());
    buf.extend_from_slice(&0i32.to_le_bytes());
    buf.extend_from_slice(&(width as i32).to_le_bytes());
    buf.extend_from_slice(&(height as i32).to_le_bytes());
    buf.extend_from_slice(&(bit_depth as i32).to_le_bytes());
    buf.extend_from_slice(&(frames as i32).to_le_bytes());
    // Observer, Instrument, Telescope
    buf.extend_from_slice(&[0u8; 120]);
    // DateTime, DateTimeUTC
    buf.extend_from_slice(&[0u8; 16]);
    assert_eq!(buf.len(), driftcorr_core::io::ser::SER_HEADER_SIZE);
    buf
}

/// Write header plus pixel payload to a temporary `.ser` file.
pub fn write_ser(header: Vec<u8>, payload: &[u8]) -> tempfile::NamedTempFile {
    use std::io::Write;
    let mut f = tempfile::Builder::new()
        .suffix(".ser")
        .tempfile()
        .expect("create temp file");
    f.write_all(&header).expect("write header");
    f.write_all(payload).expect("write frames");
    f.flush().expect("flush");
    f
}
