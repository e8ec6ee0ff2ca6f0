use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::frame::{Frame, SourceInfo, SourceKind};
use crate::io::ser::SerReader;

use super::{check_index, FrameSource};

/// Frames of a memory-mapped SER video.
pub struct SerSource {
    path: PathBuf,
    reader: SerReader,
}

impl SerSource {
    pub fn open(path: &Path) -> Result<Self> {
        Ok(Self {
            path: path.to_path_buf(),
            reader: SerReader::open(path)?,
        })
    }

    pub fn reader(&self) -> &SerReader {
        &self.reader
    }
}

impl FrameSource for SerSource {
    fn len(&self) -> usize {
        self.reader.frame_count()
    }

    fn frame_dims(&self, index: usize) -> Result<(usize, usize)> {
        check_index(index, self.len())?;
        Ok((
            self.reader.header.height as usize,
            self.reader.header.width as usize,
        ))
    }

    fn read_frame(&self, index: usize) -> Result<Frame> {
        self.reader.read_frame(index)
    }

    fn info(&self) -> Result<SourceInfo> {
        let header = &self.reader.header;
        Ok(SourceInfo {
            kind: SourceKind::Ser,
            path: Some(self.path.clone()),
            total_frames: self.len(),
            width: header.width as usize,
            height: header.height as usize,
            bit_depth: header.pixel_depth as u8,
        })
    }
}
