//! Pairwise registration and resampling.
//!
//! The alignment pipeline only sees the [`Registration`] trait; [`Registrar`]
//! is the bundled FFT-correlation implementation.

pub mod correlation;
mod resample;
pub mod subpixel;

use tracing::trace;

use crate::error::{DriftError, Result};
use crate::frame::{Frame, ShiftVector};
use crate::pipeline::config::{Interpolation, RegistrationConfig, RegistrationMethod};

pub use correlation::{compute_shift_array, Spectrum};
pub use resample::{bilinear_sample, nearest_sample, shift_frame};

/// Shift estimation and resampling service used by the alignment pipeline.
pub trait Registration {
    /// Translation of `target` relative to `reference`.
    ///
    /// Fails with [`DriftError::Registration`] when no reliable shift exists.
    fn find_shift(&self, reference: &Frame, target: &Frame) -> Result<ShiftVector>;

    /// `frame` translated by `shift`, same shape as the input.
    fn resample(&self, frame: &Frame, shift: ShiftVector) -> Result<Frame>;
}

/// FFT correlation registration with configurable interpolation.
#[derive(Clone, Debug, Default)]
pub struct Registrar {
    pub method: RegistrationMethod,
    pub interpolation: Interpolation,
}

impl Registrar {
    pub fn new(method: RegistrationMethod, interpolation: Interpolation) -> Self {
        Self {
            method,
            interpolation,
        }
    }

    pub fn from_config(config: &RegistrationConfig) -> Self {
        Self::new(config.method, config.interpolation)
    }
}

impl Registration for Registrar {
    fn find_shift(&self, reference: &Frame, target: &Frame) -> Result<ShiftVector> {
        let spectrum = match self.method {
            RegistrationMethod::PhaseCorrelation => Spectrum::Whitened,
            RegistrationMethod::CrossCorrelation => Spectrum::Raw,
        };
        let shift = compute_shift_array(&reference.data, &target.data, spectrum)?;
        trace!(
            reference = reference.metadata.frame_index,
            target = target.metadata.frame_index,
            dx = shift.dx,
            dy = shift.dy,
            "Pairwise shift"
        );
        Ok(shift)
    }

    fn resample(&self, frame: &Frame, shift: ShiftVector) -> Result<Frame> {
        if !shift.is_finite() {
            return Err(DriftError::Resample(format!(
                "non-finite shift {shift} for frame {}",
                frame.metadata.frame_index
            )));
        }
        Ok(shift_frame(frame, shift, self.interpolation))
    }
}
