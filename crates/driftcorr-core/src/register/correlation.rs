use ndarray::{Array2, Axis};
use num_complex::Complex;
use rustfft::{Fft, FftPlanner};

use crate::consts::{CROSS_POWER_EPSILON, MIN_SIGNAL_VARIANCE};
use crate::error::{DriftError, Result};
use crate::frame::ShiftVector;

use super::subpixel::refine_peak_paraboloid;

/// How the cross-power spectrum is weighted before the inverse transform.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Spectrum {
    /// Unit magnitude per bin (phase correlation). Sharp peak, sensitive to noise.
    Whitened,
    /// Plain product of the spectra (cross-correlation). Broad peak, noise tolerant.
    Raw,
}

/// Translation of `target` relative to `reference`, measured on the FFT
/// correlation surface.
///
/// If `target(x) = reference(x - s)` the result is `s`.
pub fn compute_shift_array(
    reference: &Array2<f32>,
    target: &Array2<f32>,
    spectrum: Spectrum,
) -> Result<ShiftVector> {
    let (h, w) = reference.dim();
    let (th, tw) = target.dim();
    if h != th || w != tw {
        return Err(DriftError::Registration(format!(
            "Array size mismatch: {}x{} vs {}x{}",
            w, h, tw, th
        )));
    }
    if h < 2 || w < 2 {
        return Err(DriftError::Registration(format!(
            "Frames of {}x{} are too small to register",
            w, h
        )));
    }
    check_signal(reference, "reference")?;
    check_signal(target, "target")?;

    let ref_fft = fft2d(&prepare(reference));
    let tgt_fft = fft2d(&prepare(target));

    let cross_power = cross_power(&ref_fft, &tgt_fft, spectrum);
    let correlation = ifft2d(cross_power);

    let (peak_row, peak_col, peak_val) = find_peak(&correlation);
    if !peak_val.is_finite() || peak_val <= 0.0 {
        return Err(DriftError::Registration(
            "Correlation surface has no peak".into(),
        ));
    }

    // Peaks past the midpoint are negative shifts wrapped around the FFT period
    let dy = if peak_row > h / 2 {
        peak_row as f64 - h as f64
    } else {
        peak_row as f64
    };
    let dx = if peak_col > w / 2 {
        peak_col as f64 - w as f64
    } else {
        peak_col as f64
    };

    let (sub_dy, sub_dx) = refine_peak_paraboloid(&correlation, peak_row, peak_col);

    Ok(ShiftVector::new(dx + sub_dx, dy + sub_dy))
}

/// Reject frames that carry no usable signal: non-finite samples or a flat image.
fn check_signal(data: &Array2<f32>, role: &str) -> Result<()> {
    let n = data.len() as f64;
    let mut sum = 0.0f64;
    let mut sum_sq = 0.0f64;
    for &v in data.iter() {
        if !v.is_finite() {
            return Err(DriftError::Registration(format!(
                "{role} frame contains non-finite samples"
            )));
        }
        let v = v as f64;
        sum += v;
        sum_sq += v * v;
    }
    let mean = sum / n;
    let variance = sum_sq / n - mean * mean;
    if variance < MIN_SIGNAL_VARIANCE {
        return Err(DriftError::Registration(format!(
            "{role} frame is flat (variance {variance:.3e})"
        )));
    }
    Ok(())
}

/// Subtract the mean and apply a Hann window to reduce spectral leakage.
fn prepare(data: &Array2<f32>) -> Array2<f64> {
    let (h, w) = data.dim();
    let mean = data.iter().map(|&v| v as f64).sum::<f64>() / data.len() as f64;

    let window_y: Vec<f64> = (0..h).map(|i| hann(i, h)).collect();
    let window_x: Vec<f64> = (0..w).map(|i| hann(i, w)).collect();

    Array2::from_shape_fn((h, w), |(row, col)| {
        (data[[row, col]] as f64 - mean) * window_y[row] * window_x[col]
    })
}

fn hann(i: usize, n: usize) -> f64 {
    0.5 * (1.0 - (std::f64::consts::TAU * i as f64 / n as f64).cos())
}

/// 2D FFT: row-wise FFT, then column-wise FFT.
fn fft2d(data: &Array2<f64>) -> Array2<Complex<f64>> {
    let (h, w) = data.dim();
    let mut planner = FftPlanner::new();
    let fft_row = planner.plan_fft_forward(w);
    let fft_col = planner.plan_fft_forward(h);

    let mut result = data.mapv(|v| Complex::new(v, 0.0));
    transform_lanes(&mut result, Axis(1), fft_row.as_ref());
    transform_lanes(&mut result, Axis(0), fft_col.as_ref());
    result
}

/// Inverse 2D FFT, returning the normalized real part.
fn ifft2d(mut data: Array2<Complex<f64>>) -> Array2<f64> {
    let (h, w) = data.dim();
    let mut planner = FftPlanner::new();
    let ifft_row = planner.plan_fft_inverse(w);
    let ifft_col = planner.plan_fft_inverse(h);

    transform_lanes(&mut data, Axis(0), ifft_col.as_ref());
    transform_lanes(&mut data, Axis(1), ifft_row.as_ref());

    let scale = 1.0 / (h * w) as f64;
    data.mapv(|c| c.re * scale)
}

/// Run `fft` over every 1-D lane of `data` along `axis`.
fn transform_lanes(data: &mut Array2<Complex<f64>>, axis: Axis, fft: &dyn Fft<f64>) {
    let mut buffer = vec![Complex::new(0.0, 0.0); data.len_of(axis)];
    for mut lane in data.lanes_mut(axis) {
        buffer
            .iter_mut()
            .zip(lane.iter())
            .for_each(|(b, v)| *b = *v);
        fft.process(&mut buffer);
        lane.iter_mut().zip(&buffer).for_each(|(v, b)| *v = *b);
    }
}

fn cross_power(
    ref_fft: &Array2<Complex<f64>>,
    tgt_fft: &Array2<Complex<f64>>,
    spectrum: Spectrum,
) -> Array2<Complex<f64>> {
    let mut result = Array2::<Complex<f64>>::zeros(ref_fft.dim());

    ndarray::Zip::from(&mut result)
        .and(ref_fft)
        .and(tgt_fft)
        .for_each(|out, r, t| {
            let cross = r.conj() * *t;
            *out = match spectrum {
                Spectrum::Raw => cross,
                Spectrum::Whitened => {
                    let mag = cross.norm();
                    if mag > CROSS_POWER_EPSILON {
                        cross / mag
                    } else {
                        Complex::new(0.0, 0.0)
                    }
                }
            };
        });

    result
}

fn find_peak(data: &Array2<f64>) -> (usize, usize, f64) {
    let mut best = (0, 0, f64::NEG_INFINITY);
    for ((row, col), &v) in data.indexed_iter() {
        if v > best.2 {
            best = (row, col, v);
        }
    }
    best
}
