//! Ordered, indexable frame stores feeding the alignment pipeline.

mod directory;
mod memory;
mod ser;
mod tiff;

use std::path::Path;

use tracing::debug;

use crate::error::{DriftError, Result};
use crate::frame::{Frame, SourceInfo};

pub use directory::{natural_cmp, DirectorySource};
pub use memory::MemorySource;
pub use ser::SerSource;
pub use tiff::TiffStackSource;

/// An ordered sequence of 2-D frames addressed by index.
pub trait FrameSource {
    /// Number of frames available.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// (height, width) of frame `index`, without decoding it where the store allows.
    fn frame_dims(&self, index: usize) -> Result<(usize, usize)>;

    /// Decode frame `index`. The returned frame carries `index` in its metadata.
    fn read_frame(&self, index: usize) -> Result<Frame>;

    fn info(&self) -> Result<SourceInfo>;
}

/// Open the frame source matching `path`: a directory of image files, a SER
/// video or a multi-page TIFF.
pub fn open_source(path: &Path) -> Result<Box<dyn FrameSource>> {
    if path.is_dir() {
        debug!(path = %path.display(), "Opening image directory");
        return Ok(Box::new(DirectorySource::open(path)?));
    }
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("ser") => {
            debug!(path = %path.display(), "Opening SER video");
            Ok(Box::new(SerSource::open(path)?))
        }
        Some(ext) if ext.eq_ignore_ascii_case("tif") || ext.eq_ignore_ascii_case("tiff") => {
            debug!(path = %path.display(), "Opening TIFF stack");
            Ok(Box::new(TiffStackSource::open(path)?))
        }
        _ => Err(DriftError::UnsupportedSource(path.to_path_buf())),
    }
}

fn check_index(index: usize, total: usize) -> Result<()> {
    if index >= total {
        return Err(DriftError::FrameIndexOutOfRange { index, total });
    }
    Ok(())
}
