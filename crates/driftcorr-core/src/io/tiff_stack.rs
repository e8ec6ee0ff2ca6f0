use std::fs::File;
use std::io::{BufWriter, Cursor, Read, Seek};
use std::path::Path;

use memmap2::Mmap;
use ndarray::Array2;
use tiff::decoder::{Decoder, DecodingResult};
use tiff::encoder::{colortype, TiffEncoder};
use tiff::ColorType;
use tracing::info;

use crate::error::{DriftError, Result};
use crate::frame::Frame;
use crate::io::image_io::quantize_u16;

/// Geometry and sample layout of one TIFF page.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageLayout {
    pub width: usize,
    pub height: usize,
    pub bit_depth: u8,
    /// Interleaved samples per pixel (1 gray, 2 gray+alpha, 3 RGB, 4 RGBA).
    pub channels: usize,
}

/// Memory-mapped multi-page TIFF, one frame per page.
pub struct TiffStackReader {
    mmap: Mmap,
    pages: Vec<PageLayout>,
}

impl TiffStackReader {
    /// Open a TIFF (or BigTIFF) file and index its pages.
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        // SAFETY: the mapping is read-only and the file is not modified while open.
        let mmap = unsafe { Mmap::map(&file)? };

        let pages = {
            let mut decoder = Decoder::new(Cursor::new(&mmap[..]))?;
            let mut pages = vec![page_layout(&mut decoder)?];
            while decoder.more_images() {
                decoder.next_image()?;
                pages.push(page_layout(&mut decoder)?);
            }
            pages
        };

        Ok(Self { mmap, pages })
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn page(&self, index: usize) -> Result<&PageLayout> {
        self.pages.get(index).ok_or(DriftError::FrameIndexOutOfRange {
            index,
            total: self.pages.len(),
        })
    }

    /// Decode page `index`. Integer samples are scaled to [0, 1] by their bit
    /// depth, float samples are kept. Color pages are reduced to green.
    pub fn read_frame(&self, index: usize) -> Result<Frame> {
        let layout = *self.page(index)?;
        let mut decoder = Decoder::new(Cursor::new(&self.mmap[..]))?;
        decoder.seek_to_image(index)?;

        let int_scale = 1.0 / ((1u64 << layout.bit_depth.min(32)) - 1) as f32;
        let samples: Vec<f32> = match decoder.read_image()? {
            DecodingResult::U8(buf) => buf.iter().map(|&v| v as f32 * int_scale).collect(),
            DecodingResult::U16(buf) => buf.iter().map(|&v| v as f32 * int_scale).collect(),
            DecodingResult::U32(buf) => buf.iter().map(|&v| v as f32 * int_scale).collect(),
            DecodingResult::F32(buf) => buf,
            DecodingResult::F64(buf) => buf.iter().map(|&v| v as f32).collect(),
            _ => {
                return Err(DriftError::InvalidTiff(format!(
                    "page {index} uses an unsupported sample format"
                )))
            }
        };

        let (h, w, channels) = (layout.height, layout.width, layout.channels);
        if samples.len() < h * w * channels {
            return Err(DriftError::InvalidTiff(format!(
                "page {index} holds {} samples, expected {}",
                samples.len(),
                h * w * channels
            )));
        }
        let plane = if channels >= 3 { 1 } else { 0 };
        let data = Array2::from_shape_fn((h, w), |(row, col)| {
            samples[(row * w + col) * channels + plane]
        });

        Ok(Frame::new(data, layout.bit_depth).with_index(index))
    }
}

fn page_layout<R: Read + Seek>(decoder: &mut Decoder<R>) -> Result<PageLayout> {
    let (width, height) = decoder.dimensions()?;
    let (bits, channels) = match decoder.colortype()? {
        ColorType::Gray(b) => (b, 1),
        ColorType::GrayA(b) => (b, 2),
        ColorType::RGB(b) => (b, 3),
        ColorType::RGBA(b) => (b, 4),
        other => {
            return Err(DriftError::InvalidTiff(format!(
                "unsupported color type {other:?}"
            )))
        }
    };
    Ok(PageLayout {
        width: width as usize,
        height: height as usize,
        bit_depth: bits,
        channels,
    })
}

/// Write a stack as one 16-bit grayscale BigTIFF page per frame. Samples are
/// clamped to [0, 1] before quantization.
pub fn write_stack_tiff(frames: &[Frame], path: &Path) -> Result<()> {
    let first = frames.first().ok_or(DriftError::EmptySequence)?;
    let (height, width) = first.dims();

    let mut encoder = TiffEncoder::new_big(BufWriter::new(File::create(path)?))?;
    for (index, frame) in frames.iter().enumerate() {
        if frame.dims() != (height, width) {
            return Err(DriftError::ShapeMismatch {
                index,
                expected_width: width,
                expected_height: height,
                found_width: frame.width(),
                found_height: frame.height(),
            });
        }
        let pixels: Vec<u16> = frame.data.iter().map(|&v| quantize_u16(v)).collect();
        encoder.write_image::<colortype::Gray16>(width as u32, height as u32, &pixels)?;
    }

    info!(path = %path.display(), frames = frames.len(), "Wrote TIFF stack");
    Ok(())
}
