use std::path::{Path, PathBuf};

use image::{DynamicImage, ImageBuffer, Luma};
use ndarray::Array2;
use tracing::info;

use crate::error::{DriftError, Result};
use crate::frame::Frame;

/// Load a grayscale image file into a Frame with samples in [0, 1].
/// Color images are converted to luminance.
pub fn load_image(path: &Path) -> Result<Frame> {
    let img = image::open(path)?;
    let bit_depth = match &img {
        DynamicImage::ImageLuma8(_)
        | DynamicImage::ImageLumaA8(_)
        | DynamicImage::ImageRgb8(_)
        | DynamicImage::ImageRgba8(_) => 8,
        DynamicImage::ImageRgb32F(_) | DynamicImage::ImageRgba32F(_) => 32,
        _ => 16,
    };

    let gray = img.to_luma32f();
    let (w, h) = gray.dimensions();
    let data = Array2::from_shape_vec((h as usize, w as usize), gray.into_raw())
        .map_err(|e| DriftError::Pipeline(format!("{}: {e}", path.display())))?;

    Ok(Frame::new(data, bit_depth))
}

/// (height, width) of an image file, read from its header only.
pub fn image_dims(path: &Path) -> Result<(usize, usize)> {
    let (w, h) = image::image_dimensions(path)?;
    Ok((h as usize, w as usize))
}

/// Sample in [0, 1] as a 16-bit value; anything outside is clamped.
pub fn quantize_u16(v: f32) -> u16 {
    (v.clamp(0.0, 1.0) * 65535.0).round() as u16
}

/// Save a frame as 16-bit grayscale TIFF, clamping samples to [0, 1].
pub fn save_tiff(frame: &Frame, path: &Path) -> Result<()> {
    let pixels: Vec<u16> = frame.data.iter().map(|&v| quantize_u16(v)).collect();

    let img = ImageBuffer::<Luma<u16>, Vec<u16>>::from_raw(
        frame.width() as u32,
        frame.height() as u32,
        pixels,
    )
    .ok_or(DriftError::InvalidDimensions {
        width: frame.width() as u32,
        height: frame.height() as u32,
    })?;
    img.save(path)?;
    Ok(())
}

/// File name of the `index`-th frame written by [`save_stack_dir`].
pub fn stack_frame_name(index: usize) -> String {
    format!("img_{index:04}.tif")
}

/// Write every frame of a stack as `img_NNNN.tif` inside `dir`, creating it if needed.
pub fn save_stack_dir(frames: &[Frame], dir: &Path) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)?;
    let mut written = Vec::with_capacity(frames.len());
    for (i, frame) in frames.iter().enumerate() {
        let path = dir.join(stack_frame_name(i));
        save_tiff(frame, &path)?;
        written.push(path);
    }
    info!(dir = %dir.display(), frames = frames.len(), "Wrote TIFF stack");
    Ok(written)
}
