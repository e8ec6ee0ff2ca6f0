use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use byteorder::{LittleEndian, WriteBytesExt};
use tracing::info;

use crate::error::{DriftError, Result};
use crate::frame::Frame;
use crate::io::image_io::quantize_u16;
use crate::io::ser::{SerHeader, SER_MAGIC};

/// Writes a SER file frame by frame.
pub struct SerWriter {
    writer: BufWriter<File>,
    header: SerHeader,
    frames_written: u32,
}

impl SerWriter {
    /// Create a new SER file and write the header.
    pub fn create(path: &Path, header: &SerHeader) -> Result<Self> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        write_header(&mut writer, header)?;
        Ok(Self {
            writer,
            header: header.clone(),
            frames_written: 0,
        })
    }

    /// Append a frame, quantized to 16 bits after clamping to [0, 1].
    pub fn write_frame(&mut self, frame: &Frame) -> Result<()> {
        if self.header.pixel_depth != 16 || self.header.planes_per_pixel() != 1 {
            return Err(DriftError::InvalidSer(
                "Only 16-bit mono frames can be written".into(),
            ));
        }
        if frame.width() != self.header.width as usize
            || frame.height() != self.header.height as usize
        {
            return Err(DriftError::InvalidDimensions {
                width: frame.width() as u32,
                height: frame.height() as u32,
            });
        }
        if self.frames_written >= self.header.frame_count {
            return Err(DriftError::InvalidSer(format!(
                "Header announces {} frames",
                self.header.frame_count
            )));
        }
        for &v in frame.data.iter() {
            self.writer.write_u16::<LittleEndian>(quantize_u16(v))?;
        }
        self.frames_written += 1;
        Ok(())
    }

    /// Write the optional timestamp trailer (one u64 per frame, little-endian).
    pub fn write_timestamps(&mut self, timestamps: &[u64]) -> Result<()> {
        for &ts in timestamps {
            self.writer.write_u64::<LittleEndian>(ts)?;
        }
        Ok(())
    }

    /// Flush and finalize the file.
    pub fn finalize(mut self) -> Result<()> {
        if self.frames_written != self.header.frame_count {
            return Err(DriftError::InvalidSer(format!(
                "Wrote {} of {} frames",
                self.frames_written, self.header.frame_count
            )));
        }
        self.writer.flush()?;
        Ok(())
    }
}

/// Write an aligned stack as a 16-bit mono SER file, keeping frame timestamps
/// when every frame has one.
pub fn write_stack_ser(frames: &[Frame], path: &Path) -> Result<()> {
    let first = frames.first().ok_or(DriftError::EmptySequence)?;
    let header = SerHeader::mono16(
        first.width() as u32,
        first.height() as u32,
        frames.len() as u32,
    );

    let mut writer = SerWriter::create(path, &header)?;
    for frame in frames {
        writer.write_frame(frame)?;
    }

    let timestamps: Option<Vec<u64>> = frames.iter().map(|f| f.metadata.timestamp_us).collect();
    if let Some(ts) = timestamps {
        writer.write_timestamps(&ts)?;
    }
    writer.finalize()?;

    info!(path = %path.display(), frames = frames.len(), "Wrote SER stack");
    Ok(())
}

fn write_header(w: &mut impl Write, header: &SerHeader) -> Result<()> {
    w.write_all(SER_MAGIC)?;
    // LuID
    w.write_i32::<LittleEndian>(0)?;
    w.write_i32::<LittleEndian>(header.color_id)?;
    w.write_i32::<LittleEndian>(if header.little_endian { 0 } else { 1 })?;
    w.write_i32::<LittleEndian>(header.width as i32)?;
    w.write_i32::<LittleEndian>(header.height as i32)?;
    w.write_i32::<LittleEndian>(header.pixel_depth as i32)?;
    w.write_i32::<LittleEndian>(header.frame_count as i32)?;
    write_fixed_string(w, &header.observer, 40)?;
    write_fixed_string(w, &header.instrument, 40)?;
    write_fixed_string(w, &header.telescope, 40)?;
    w.write_u64::<LittleEndian>(header.date_time)?;
    w.write_u64::<LittleEndian>(header.date_time_utc)?;
    Ok(())
}

fn write_fixed_string(w: &mut impl Write, s: &str, len: usize) -> Result<()> {
    let mut buf = vec![0u8; len];
    let bytes = s.as_bytes();
    let n = bytes.len().min(len);
    buf[..n].copy_from_slice(&bytes[..n]);
    w.write_all(&buf)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::ser::SER_HEADER_SIZE;

    #[test]
    fn test_header_layout_size() {
        let mut buf = Vec::new();
        write_header(&mut buf, &SerHeader::mono16(4, 3, 2)).unwrap();
        assert_eq!(buf.len(), SER_HEADER_SIZE);
        assert_eq!(&buf[..14], SER_MAGIC);
    }
}
