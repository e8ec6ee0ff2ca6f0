use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use driftcorr_core::frame::SourceKind;
use driftcorr_core::io::ser::SerReader;
use driftcorr_core::source::open_source;

#[derive(Args)]
pub struct InfoArgs {
    /// Image directory, SER file or multi-page TIFF
    pub input: PathBuf,
}

pub fn run(args: &InfoArgs) -> Result<()> {
    let source = open_source(&args.input)?;
    let info = source.info()?;

    println!("Source:      {}", args.input.display());
    println!("Kind:        {}", info.kind);
    println!("Frames:      {}", info.total_frames);
    println!("Dimensions:  {}x{}", info.width, info.height);
    println!("Bit depth:   {}", info.bit_depth);

    if info.kind == SourceKind::Ser {
        let reader = SerReader::open(&args.input)?;
        let header = &reader.header;
        if !header.observer.is_empty() {
            println!("Observer:    {}", header.observer);
        }
        if !header.telescope.is_empty() {
            println!("Telescope:   {}", header.telescope);
        }
        if !header.instrument.is_empty() {
            println!("Instrument:  {}", header.instrument);
        }
        let total_mb =
            (header.frame_byte_size() * info.total_frames) as f64 / (1024.0 * 1024.0);
        println!("Data size:   {:.1} MB", total_mb);
    }

    Ok(())
}
