use ndarray::{Array2, Zip};

use crate::consts::PARALLEL_PIXEL_THRESHOLD;
use crate::frame::{Frame, ShiftVector};
use crate::pipeline::config::Interpolation;

/// Translate a frame's content by `shift`.
///
/// The output satisfies `out(row, col) = frame(row - shift.dy, col - shift.dx)`;
/// samples falling outside the source are zero.
pub fn shift_frame(frame: &Frame, shift: ShiftVector, interpolation: Interpolation) -> Frame {
    let data = &frame.data;
    let sample = |row: usize, col: usize| -> f32 {
        let src_y = row as f64 - shift.dy;
        let src_x = col as f64 - shift.dx;
        match interpolation {
            Interpolation::Linear => bilinear_sample(data, src_y, src_x),
            Interpolation::Nearest => nearest_sample(data, src_y, src_x),
        }
    };

    let mut result = Array2::<f32>::zeros(data.dim());
    if data.len() >= PARALLEL_PIXEL_THRESHOLD {
        Zip::indexed(&mut result).par_for_each(|(row, col), out| *out = sample(row, col));
    } else {
        Zip::indexed(&mut result).for_each(|(row, col), out| *out = sample(row, col));
    }

    let mut shifted = Frame::new(result, frame.original_bit_depth);
    shifted.metadata = frame.metadata.clone();
    shifted
}

pub fn bilinear_sample(data: &Array2<f32>, y: f64, x: f64) -> f32 {
    let x0 = x.floor() as i64;
    let y0 = y.floor() as i64;
    let x1 = x0 + 1;
    let y1 = y0 + 1;

    let fx = (x - x0 as f64) as f32;
    let fy = (y - y0 as f64) as f32;

    let v00 = sample_or_zero(data, y0, x0);
    let v10 = sample_or_zero(data, y0, x1);
    let v01 = sample_or_zero(data, y1, x0);
    let v11 = sample_or_zero(data, y1, x1);

    v00 * (1.0 - fx) * (1.0 - fy)
        + v10 * fx * (1.0 - fy)
        + v01 * (1.0 - fx) * fy
        + v11 * fx * fy
}

pub fn nearest_sample(data: &Array2<f32>, y: f64, x: f64) -> f32 {
    sample_or_zero(data, y.round() as i64, x.round() as i64)
}

fn sample_or_zero(data: &Array2<f32>, row: i64, col: i64) -> f32 {
    let (h, w) = data.dim();
    if row >= 0 && row < h as i64 && col >= 0 && col < w as i64 {
        data[[row as usize, col as usize]]
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(h: usize, w: usize) -> Frame {
        Frame::new(
            Array2::from_shape_fn((h, w), |(r, c)| (r * w + c) as f32),
            8,
        )
    }

    #[test]
    fn test_bilinear_interpolation() {
        let mut data = Array2::<f32>::zeros((4, 4));
        data[[1, 1]] = 1.0;

        assert!((bilinear_sample(&data, 1.0, 1.0) - 1.0).abs() < 1e-6);
        assert!((bilinear_sample(&data, 1.0, 1.5) - 0.5).abs() < 1e-6);
        assert_eq!(bilinear_sample(&data, -3.0, 1.0), 0.0);
    }

    #[test]
    fn test_zero_shift_is_identity() {
        let frame = ramp(5, 7);
        let out = shift_frame(&frame, ShiftVector::ZERO, Interpolation::Linear);
        assert_eq!(out.data, frame.data);
    }

    #[test]
    fn test_integer_shift_moves_content() {
        let frame = ramp(5, 7);
        let out = shift_frame(&frame, ShiftVector::new(2.0, 1.0), Interpolation::Nearest);
        assert_eq!(out.data[[1, 2]], frame.data[[0, 0]]);
        assert_eq!(out.data[[4, 6]], frame.data[[3, 4]]);
        assert_eq!(out.data[[0, 3]], 0.0);
        assert_eq!(out.data[[2, 1]], 0.0);
    }

    #[test]
    fn test_large_frame_matches_sequential_path() {
        let frame = ramp(300, 300);
        let shift = ShiftVector::new(-1.25, 0.5);
        let out = shift_frame(&frame, shift, Interpolation::Linear);
        let expected = bilinear_sample(&frame.data, 100.0 - 0.5, 100.0 + 1.25);
        assert!((out.data[[100, 100]] - expected).abs() < 1e-3);
    }
}
