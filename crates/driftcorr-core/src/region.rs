use ndarray::s;
use rayon::prelude::*;

use crate::error::{DriftError, Result};
use crate::frame::{Frame, ShiftVector};

/// Rectangle of the original frame that holds real data in every aligned frame.
///
/// Rows `row_start..row_end`, columns `col_start..col_end` (half-open).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ValidRegion {
    pub row_start: usize,
    pub row_end: usize,
    pub col_start: usize,
    pub col_end: usize,
}

impl ValidRegion {
    /// The whole `height` x `width` frame.
    pub fn full(height: usize, width: usize) -> Self {
        Self {
            row_start: 0,
            row_end: height,
            col_start: 0,
            col_end: width,
        }
    }

    /// Intersection of every frame's footprint after correcting by its
    /// cumulative shift, within a `height` x `width` frame.
    ///
    /// Bounds are `max(0, -ceil(d_min))` and `min(n, n - floor(d_max))` per axis.
    pub fn from_cumulative(
        cumulative: &[ShiftVector],
        height: usize,
        width: usize,
    ) -> Result<Self> {
        if cumulative.is_empty() {
            return Err(DriftError::EmptySequence);
        }

        let (mut dx_min, mut dx_max) = (f64::INFINITY, f64::NEG_INFINITY);
        let (mut dy_min, mut dy_max) = (f64::INFINITY, f64::NEG_INFINITY);
        for (index, shift) in cumulative.iter().enumerate() {
            if !shift.is_finite() {
                return Err(DriftError::Registration(format!(
                    "non-finite cumulative shift {shift} at frame {index}"
                )));
            }
            dx_min = dx_min.min(shift.dx);
            dx_max = dx_max.max(shift.dx);
            dy_min = dy_min.min(shift.dy);
            dy_max = dy_max.max(shift.dy);
        }

        // Bounds stay in f64 until clamped to the frame, so huge drifts cannot overflow.
        let h = height as f64;
        let w = width as f64;
        let imin = (-dy_min.ceil()).clamp(0.0, h) as i64;
        let imax = (h - dy_max.floor()).clamp(0.0, h) as i64;
        let jmin = (-dx_min.ceil()).clamp(0.0, w) as i64;
        let jmax = (w - dx_max.floor()).clamp(0.0, w) as i64;

        if imin >= imax || jmin >= jmax {
            return Err(DriftError::EmptyValidRegion {
                row_start: imin,
                row_end: imax,
                col_start: jmin,
                col_end: jmax,
            });
        }

        Ok(Self {
            row_start: imin as usize,
            row_end: imax as usize,
            col_start: jmin as usize,
            col_end: jmax as usize,
        })
    }

    pub fn height(&self) -> usize {
        self.row_end - self.row_start
    }

    pub fn width(&self) -> usize {
        self.col_end - self.col_start
    }

    pub fn is_full(&self, height: usize, width: usize) -> bool {
        *self == Self::full(height, width)
    }

    pub fn contains(&self, row: usize, col: usize) -> bool {
        (self.row_start..self.row_end).contains(&row)
            && (self.col_start..self.col_end).contains(&col)
    }

    /// Copy of `frame` restricted to this region. The frame must be at least
    /// as large as the region's end bounds.
    pub fn crop(&self, frame: &Frame) -> Frame {
        let data = frame
            .data
            .slice(s![self.row_start..self.row_end, self.col_start..self.col_end])
            .to_owned();
        let mut cropped = Frame::new(data, frame.original_bit_depth);
        cropped.metadata = frame.metadata.clone();
        cropped
    }

    /// Crop every frame, keeping order and count.
    pub fn crop_stack(&self, frames: &[Frame]) -> Vec<Frame> {
        frames.par_iter().map(|f| self.crop(f)).collect()
    }
}

impl std::fmt::Display for ValidRegion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "rows {}..{}, cols {}..{} ({}x{})",
            self.row_start,
            self.row_end,
            self.col_start,
            self.col_end,
            self.width(),
            self.height()
        )
    }
}

#[cfg(test)]
mod tests {
    use ndarray::Array2;

    use super::*;

    fn shifts(values: &[(f64, f64)]) -> Vec<ShiftVector> {
        values.iter().map(|&(dx, dy)| ShiftVector::new(dx, dy)).collect()
    }

    #[test]
    fn test_zero_drift_is_full_frame() {
        let region = ValidRegion::from_cumulative(&shifts(&[(0.0, 0.0); 4]), 10, 12).unwrap();
        assert!(region.is_full(10, 12));
    }

    #[test]
    fn test_positive_drift_trims_far_edges() {
        let region =
            ValidRegion::from_cumulative(&shifts(&[(0.0, 0.0), (2.4, 1.6)]), 20, 30).unwrap();
        // dy_max floors to 1, dx_max floors to 2
        assert_eq!(region, ValidRegion { row_start: 0, row_end: 19, col_start: 0, col_end: 28 });
    }

    #[test]
    fn test_negative_drift_trims_near_edges() {
        let region =
            ValidRegion::from_cumulative(&shifts(&[(0.0, 0.0), (-3.2, -0.5)]), 20, 30).unwrap();
        // -ceil(-0.5) = 0 and -ceil(-3.2) = 3
        assert_eq!(region, ValidRegion { row_start: 0, row_end: 20, col_start: 3, col_end: 30 });
    }

    #[test]
    fn test_mixed_drift() {
        let region = ValidRegion::from_cumulative(
            &shifts(&[(0.0, 0.0), (-4.7, 2.0), (1.1, -2.9)]),
            16,
            16,
        )
        .unwrap();
        assert_eq!(region, ValidRegion { row_start: 2, row_end: 14, col_start: 4, col_end: 15 });
        assert_eq!(region.height(), 12);
        assert_eq!(region.width(), 11);
    }

    #[test]
    fn test_drift_larger_than_frame_is_an_error() {
        let err =
            ValidRegion::from_cumulative(&shifts(&[(0.0, 0.0), (0.5, 12.0)]), 10, 10).unwrap_err();
        assert!(matches!(err, DriftError::EmptyValidRegion { .. }));
    }

    #[test]
    fn test_huge_drift_is_empty_not_full() {
        let err = ValidRegion::from_cumulative(&shifts(&[(0.0, 0.0), (0.0, -1e30)]), 10, 10)
            .unwrap_err();
        assert!(matches!(
            err,
            DriftError::EmptyValidRegion { row_start: 10, row_end: 10, .. }
        ));

        let err = ValidRegion::from_cumulative(&shifts(&[(0.0, 0.0), (1e300, 0.0)]), 10, 10)
            .unwrap_err();
        assert!(matches!(err, DriftError::EmptyValidRegion { col_end: 0, .. }));
    }

    #[test]
    fn test_non_finite_drift_is_an_error() {
        for bad in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let result = ValidRegion::from_cumulative(&shifts(&[(0.0, 0.0), (bad, 1.0)]), 10, 10);
            assert!(matches!(result, Err(DriftError::Registration(_))), "{bad}");
        }
    }

    #[test]
    fn test_empty_series_is_an_error() {
        assert!(matches!(
            ValidRegion::from_cumulative(&[], 10, 10),
            Err(DriftError::EmptySequence)
        ));
    }

    #[test]
    fn test_crop_keeps_values() {
        let frame = Frame::new(Array2::from_shape_fn((4, 5), |(r, c)| (r * 10 + c) as f32), 8);
        let region = ValidRegion { row_start: 1, row_end: 3, col_start: 2, col_end: 4 };
        let cropped = region.crop(&frame);
        assert_eq!(cropped.dims(), (2, 2));
        assert_eq!(cropped.data[[0, 0]], 12.0);
        assert_eq!(cropped.data[[1, 1]], 23.0);
    }
}
