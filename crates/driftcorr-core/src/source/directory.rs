use std::cmp::Ordering;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::consts::IMAGE_EXTENSIONS;
use crate::error::Result;
use crate::frame::{Frame, SourceInfo, SourceKind};
use crate::io::image_io::{image_dims, load_image};

use super::{check_index, FrameSource};

/// Single-frame image files in one directory, in natural file-name order
/// (`img_2.tif` before `img_10.tif`). Frames are decoded on demand.
#[derive(Clone, Debug)]
pub struct DirectorySource {
    dir: PathBuf,
    files: Vec<PathBuf>,
}

impl DirectorySource {
    pub fn open(dir: &Path) -> Result<Self> {
        let mut files = Vec::new();
        for entry in std::fs::read_dir(dir)? {
            let path = entry?.path();
            if path.is_file() && has_image_extension(&path) {
                files.push(path);
            }
        }
        files.sort_by(|a, b| natural_cmp(&file_name(a), &file_name(b)));

        info!(dir = %dir.display(), frames = files.len(), "Indexed image directory");
        Ok(Self {
            dir: dir.to_path_buf(),
            files,
        })
    }

    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }
}

impl FrameSource for DirectorySource {
    fn len(&self) -> usize {
        self.files.len()
    }

    fn frame_dims(&self, index: usize) -> Result<(usize, usize)> {
        check_index(index, self.files.len())?;
        image_dims(&self.files[index])
    }

    fn read_frame(&self, index: usize) -> Result<Frame> {
        check_index(index, self.files.len())?;
        Ok(load_image(&self.files[index])?.with_index(index))
    }

    fn info(&self) -> Result<SourceInfo> {
        let (height, width, bit_depth) = match self.files.first() {
            Some(path) => {
                let frame = load_image(path)?;
                (frame.height(), frame.width(), frame.original_bit_depth)
            }
            None => (0, 0, 0),
        };
        Ok(SourceInfo {
            kind: SourceKind::Directory,
            path: Some(self.dir.clone()),
            total_frames: self.files.len(),
            width,
            height,
            bit_depth,
        })
    }
}

fn has_image_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| IMAGE_EXTENSIONS.iter().any(|known| ext.eq_ignore_ascii_case(known)))
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Compare strings treating runs of ASCII digits as numbers.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let mut a = a.chars().peekable();
    let mut b = b.chars().peekable();
    loop {
        match (a.peek().copied(), b.peek().copied()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(ca), Some(cb)) if ca.is_ascii_digit() && cb.is_ascii_digit() => {
                let na = take_digits(&mut a);
                let nb = take_digits(&mut b);
                let ord = na
                    .trim_start_matches('0')
                    .len()
                    .cmp(&nb.trim_start_matches('0').len())
                    .then_with(|| na.trim_start_matches('0').cmp(nb.trim_start_matches('0')))
                    .then_with(|| na.len().cmp(&nb.len()));
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            (Some(ca), Some(cb)) => {
                if ca != cb {
                    return ca.cmp(&cb);
                }
                a.next();
                b.next();
            }
        }
    }
}

fn take_digits(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> String {
    let mut digits = String::new();
    while let Some(c) = chars.peek().copied().filter(char::is_ascii_digit) {
        digits.push(c);
        chars.next();
    }
    digits
}
