pub mod image_io;
pub mod ser;
pub mod ser_writer;
pub mod tiff_stack;

use std::path::Path;

use crate::error::Result;
use crate::frame::Frame;

/// Write an aligned stack: `.ser` paths become a SER video, `.tif`/`.tiff`
/// paths a multi-page BigTIFF, anything else a directory of TIFF frames.
///
/// All outputs are 16-bit. Samples are expected in [0, 1]; values outside are
/// clamped, so stacks built from raw numeric data should be normalized first.
pub fn write_stack(frames: &[Frame], path: &Path) -> Result<()> {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("ser") => ser_writer::write_stack_ser(frames, path),
        Some(ext) if ext.eq_ignore_ascii_case("tif") || ext.eq_ignore_ascii_case("tiff") => {
            tiff_stack::write_stack_tiff(frames, path)
        }
        _ => image_io::save_stack_dir(frames, path).map(|_| ()),
    }
}
