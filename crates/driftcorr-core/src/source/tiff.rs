use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::frame::{Frame, SourceInfo, SourceKind};
use crate::io::tiff_stack::TiffStackReader;

use super::FrameSource;

/// Pages of a multi-page TIFF, one frame per page.
pub struct TiffStackSource {
    path: PathBuf,
    reader: TiffStackReader,
}

impl TiffStackSource {
    pub fn open(path: &Path) -> Result<Self> {
        Ok(Self {
            path: path.to_path_buf(),
            reader: TiffStackReader::open(path)?,
        })
    }
}

impl FrameSource for TiffStackSource {
    fn len(&self) -> usize {
        self.reader.page_count()
    }

    fn frame_dims(&self, index: usize) -> Result<(usize, usize)> {
        let page = self.reader.page(index)?;
        Ok((page.height, page.width))
    }

    fn read_frame(&self, index: usize) -> Result<Frame> {
        self.reader.read_frame(index)
    }

    fn info(&self) -> Result<SourceInfo> {
        let first = self.reader.page(0)?;
        Ok(SourceInfo {
            kind: SourceKind::TiffStack,
            path: Some(self.path.clone()),
            total_frames: self.len(),
            width: first.width,
            height: first.height,
            bit_depth: first.bit_depth,
        })
    }
}
