use std::path::Path;

use image::{Rgb, RgbImage};

use crate::consts::{PLOT_MARGIN, PLOT_SIZE};
use crate::error::{DriftError, Result};
use crate::frame::ShiftVector;

const BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);
const AXIS: Rgb<u8> = Rgb([0, 0, 0]);
const ZERO_LINE: Rgb<u8> = Rgb([200, 200, 200]);
const X_TRACE: Rgb<u8> = Rgb([220, 40, 40]);
const Y_TRACE: Rgb<u8> = Rgb([40, 70, 220]);

/// Render `shifts` as a PNG line plot: `dx` in red, `dy` in blue, frame
/// index on the horizontal axis.
pub fn plot_shifts(shifts: &[ShiftVector], path: &Path) -> Result<()> {
    render_shift_plot(shifts)?.save(path)?;
    Ok(())
}

/// Draw the trajectory plot into an in-memory image.
pub fn render_shift_plot(shifts: &[ShiftVector]) -> Result<RgbImage> {
    if shifts.is_empty() {
        return Err(DriftError::Report("no shifts to plot".into()));
    }
    if shifts.iter().any(|s| !s.is_finite()) {
        return Err(DriftError::Report("cannot plot non-finite shifts".into()));
    }

    let (width, height) = PLOT_SIZE;
    let mut img = RgbImage::from_pixel(width, height, BACKGROUND);
    let axes = PlotAxes::fit(shifts);

    let zero = axes.y_pixel(0.0);
    draw_line(&mut img, (axes.left(), zero), (axes.right(), zero), ZERO_LINE);
    draw_line(
        &mut img,
        (axes.left(), axes.bottom()),
        (axes.right(), axes.bottom()),
        AXIS,
    );
    draw_line(&mut img, (axes.left(), axes.top()), (axes.left(), axes.bottom()), AXIS);

    draw_trace(&mut img, &axes, shifts.iter().map(|s| s.dx), X_TRACE);
    draw_trace(&mut img, &axes, shifts.iter().map(|s| s.dy), Y_TRACE);
    Ok(img)
}

/// Maps (frame index, shift value) into canvas pixels.
struct PlotAxes {
    count: usize,
    lo: f64,
    hi: f64,
}

impl PlotAxes {
    fn fit(shifts: &[ShiftVector]) -> Self {
        let (lo, hi) = shifts
            .iter()
            .flat_map(|s| [s.dx, s.dy])
            .fold((0.0f64, 0.0f64), |(lo, hi), v| (lo.min(v), hi.max(v)));
        // Flat series still get a visible vertical span.
        let (lo, hi) = if hi - lo < 1e-9 { (lo - 1.0, hi + 1.0) } else { (lo, hi) };
        Self {
            count: shifts.len(),
            lo,
            hi,
        }
    }

    fn left(&self) -> i64 {
        PLOT_MARGIN as i64
    }

    fn right(&self) -> i64 {
        (PLOT_SIZE.0 - PLOT_MARGIN) as i64
    }

    fn top(&self) -> i64 {
        PLOT_MARGIN as i64
    }

    fn bottom(&self) -> i64 {
        (PLOT_SIZE.1 - PLOT_MARGIN) as i64
    }

    fn x_pixel(&self, index: usize) -> i64 {
        if self.count < 2 {
            return self.left();
        }
        let t = index as f64 / (self.count - 1) as f64;
        self.left() + (t * (self.right() - self.left()) as f64).round() as i64
    }

    fn y_pixel(&self, value: f64) -> i64 {
        let t = (value - self.lo) / (self.hi - self.lo);
        self.bottom() - (t * (self.bottom() - self.top()) as f64).round() as i64
    }
}

fn draw_trace(img: &mut RgbImage, axes: &PlotAxes, values: impl Iterator<Item = f64>, color: Rgb<u8>) {
    let mut previous: Option<(i64, i64)> = None;
    for (i, v) in values.enumerate() {
        let point = (axes.x_pixel(i), axes.y_pixel(v));
        match previous {
            Some(prev) => draw_line(img, prev, point, color),
            None => put(img, point.0, point.1, color),
        }
        previous = Some(point);
    }
}

/// Bresenham line, clipped to the canvas.
fn draw_line(img: &mut RgbImage, from: (i64, i64), to: (i64, i64), color: Rgb<u8>) {
    let (mut x, mut y) = from;
    let dx = (to.0 - x).abs();
    let dy = -(to.1 - y).abs();
    let sx = if x < to.0 { 1 } else { -1 };
    let sy = if y < to.1 { 1 } else { -1 };
    let mut err = dx + dy;
    loop {
        put(img, x, y, color);
        if x == to.0 && y == to.1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
    }
}

fn put(img: &mut RgbImage, x: i64, y: i64, color: Rgb<u8>) {
    if x >= 0 && y >= 0 && (x as u32) < img.width() && (y as u32) < img.height() {
        img.put_pixel(x as u32, y as u32, color);
    }
}
