/// Minimum pixel count (h*w) to use row-level Rayon parallelism when resampling.
pub const PARALLEL_PIXEL_THRESHOLD: usize = 65_536;

/// Magnitude below which a cross-power spectrum bin is treated as empty.
pub const CROSS_POWER_EPSILON: f64 = 1e-12;

/// Frames whose sample variance falls below this cannot be registered.
pub const MIN_SIGNAL_VARIANCE: f64 = 1e-12;

/// Largest sub-pixel correction applied on top of the integer correlation peak.
pub const MAX_SUBPIXEL_CORRECTION: f64 = 0.5;

/// Default first frame index of an alignment range.
pub const DEFAULT_INDEX_MIN: usize = 0;

/// Default last frame index (inclusive) of an alignment range.
pub const DEFAULT_INDEX_MAX: usize = 9999;

/// File extensions accepted by the directory frame source.
pub const IMAGE_EXTENSIONS: [&str; 6] = ["tif", "tiff", "png", "jpg", "jpeg", "bmp"];

/// Shift-plot canvas size in pixels (width, height).
pub const PLOT_SIZE: (u32, u32) = (640, 480);

/// Margin between the shift-plot canvas border and the axes, in pixels.
pub const PLOT_MARGIN: u32 = 40;
