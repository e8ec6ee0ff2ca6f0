use ndarray::Array2;

use crate::consts::MAX_SUBPIXEL_CORRECTION;

/// Refine peak location using paraboloid fitting on the 3x3 neighborhood.
///
/// The correlation surface is periodic, so neighbors of a peak on the border
/// wrap around to the opposite side. Returns (delta_row, delta_col) as
/// fractional pixel offsets from the integer peak.
pub fn refine_peak_paraboloid(
    correlation: &Array2<f64>,
    peak_row: usize,
    peak_col: usize,
) -> (f64, f64) {
    let (h, w) = correlation.dim();
    if h < 3 || w < 3 {
        return (0.0, 0.0);
    }

    let prev_row = (peak_row + h - 1) % h;
    let next_row = (peak_row + 1) % h;
    let prev_col = (peak_col + w - 1) % w;
    let next_col = (peak_col + 1) % w;

    let center = correlation[[peak_row, peak_col]];

    let delta_row = parabola_vertex(
        correlation[[prev_row, peak_col]],
        center,
        correlation[[next_row, peak_col]],
    );
    let delta_col = parabola_vertex(
        correlation[[peak_row, prev_col]],
        center,
        correlation[[peak_row, next_col]],
    );

    (
        delta_row.clamp(-MAX_SUBPIXEL_CORRECTION, MAX_SUBPIXEL_CORRECTION),
        delta_col.clamp(-MAX_SUBPIXEL_CORRECTION, MAX_SUBPIXEL_CORRECTION),
    )
}

/// Vertex offset of the parabola through (-1, prev), (0, curr), (1, next).
fn parabola_vertex(prev: f64, curr: f64, next: f64) -> f64 {
    let curvature = prev - 2.0 * curr + next;
    if curvature.abs() > 1e-12 {
        (prev - next) / (2.0 * curvature)
    } else {
        0.0
    }
}
