use crate::error::Result;
use crate::frame::{Frame, ShiftVector};
use crate::register::Registration;

/// Result of feeding one frame to the [`DriftAccumulator`].
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Observation {
    /// Shift relative to the previously observed frame.
    pub shift: ShiftVector,
    /// Shift relative to the first frame since the last reset.
    pub cumulative: ShiftVector,
}

/// Running drift estimate over a strictly sequential pass.
///
/// Each frame is registered against the raw previous frame, never against a
/// resampled one.
pub struct DriftAccumulator<'a, R: Registration + ?Sized> {
    registration: &'a R,
    cumulative: ShiftVector,
    reference: Option<Frame>,
}

impl<'a, R: Registration + ?Sized> DriftAccumulator<'a, R> {
    pub fn new(registration: &'a R) -> Self {
        Self {
            registration,
            cumulative: ShiftVector::ZERO,
            reference: None,
        }
    }

    pub fn reset(&mut self) {
        self.cumulative = ShiftVector::ZERO;
        self.reference = None;
    }

    pub fn cumulative(&self) -> ShiftVector {
        self.cumulative
    }

    pub fn reference(&self) -> Option<&Frame> {
        self.reference.as_ref()
    }

    /// Register `frame` against the previous one and fold its shift into the
    /// running total. The first frame after a reset only becomes the reference.
    pub fn observe(&mut self, frame: &Frame) -> Result<Observation> {
        let shift = match &self.reference {
            None => ShiftVector::ZERO,
            Some(reference) => self.registration.find_shift(reference, frame)?,
        };
        self.cumulative += shift;
        self.reference = Some(frame.clone());
        Ok(Observation {
            shift,
            cumulative: self.cumulative,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use ndarray::Array2;

    use super::*;
    use crate::error::DriftError;

    /// Returns the difference of the frames' first samples as dx, and records
    /// which reference values it was handed.
    struct ValueDiff {
        seen_references: RefCell<Vec<f32>>,
    }

    impl Registration for ValueDiff {
        fn find_shift(&self, reference: &Frame, target: &Frame) -> Result<ShiftVector> {
            let r = reference.data[[0, 0]];
            self.seen_references.borrow_mut().push(r);
            if target.data[[0, 0]].is_nan() {
                return Err(DriftError::Registration("nan".into()));
            }
            Ok(ShiftVector::new((target.data[[0, 0]] - r) as f64, 1.0))
        }

        fn resample(&self, frame: &Frame, _shift: ShiftVector) -> Result<Frame> {
            Ok(frame.clone())
        }
    }

    fn frame(v: f32) -> Frame {
        Frame::new(Array2::from_elem((2, 2), v), 32)
    }

    #[test]
    fn test_first_observation_is_zero() {
        let reg = ValueDiff { seen_references: RefCell::new(vec![]) };
        let mut acc = DriftAccumulator::new(&reg);
        let obs = acc.observe(&frame(4.0)).unwrap();
        assert_eq!(obs, Observation::default());
        assert!(reg.seen_references.borrow().is_empty());
        assert!(acc.reference().is_some());
    }

    #[test]
    fn test_cumulative_is_prefix_sum_and_reference_is_raw_previous() {
        let reg = ValueDiff { seen_references: RefCell::new(vec![]) };
        let mut acc = DriftAccumulator::new(&reg);
        let values = [1.0, 3.0, 2.0, 7.0];
        let mut total = 0.0;
        for (k, &v) in values.iter().enumerate() {
            let obs = acc.observe(&frame(v)).unwrap();
            if k > 0 {
                total += (v - values[k - 1]) as f64;
            }
            assert_eq!(obs.cumulative.dx, total);
            assert_eq!(obs.cumulative.dy, k as f64);
        }
        assert_eq!(*reg.seen_references.borrow(), vec![1.0, 3.0, 2.0]);
    }

    #[test]
    fn test_reset_clears_state() {
        let reg = ValueDiff { seen_references: RefCell::new(vec![]) };
        let mut acc = DriftAccumulator::new(&reg);
        acc.observe(&frame(1.0)).unwrap();
        acc.observe(&frame(5.0)).unwrap();
        acc.reset();
        assert_eq!(acc.cumulative(), ShiftVector::ZERO);
        assert!(acc.reference().is_none());
        let obs = acc.observe(&frame(9.0)).unwrap();
        assert_eq!(obs.cumulative, ShiftVector::ZERO);
    }

    #[test]
    fn test_registration_failure_propagates() {
        let reg = ValueDiff { seen_references: RefCell::new(vec![]) };
        let mut acc = DriftAccumulator::new(&reg);
        acc.observe(&frame(1.0)).unwrap();
        let err = acc.observe(&frame(f32::NAN)).unwrap_err();
        assert!(matches!(err, DriftError::Registration(_)));
    }
}
