//! Print the segment table and depth record header of EDOF files without writing anything.
//!
//! `cargo run -p edof --example inspect -- IMG_0001.jpg`

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use edof::Decoder;

fn main() -> Result<()> {
    let paths: Vec<PathBuf> = std::env::args_os().skip(1).map(PathBuf::from).collect();
    if paths.is_empty() {
        bail!("usage: inspect <file>...");
    }

    let decoder = Decoder::new();
    for path in &paths {
        let extraction = decoder
            .decode_file(path)
            .with_context(|| format!("Failed to decode {}", path.display()))?;

        println!("{}", path.display());
        for segment in extraction.segments() {
            println!(
                "  segment {:>2}  {:>10} .. {:<10} {:>10} bytes",
                segment.index,
                segment.start,
                segment.end,
                segment.len()
            );
        }
        let record = extraction.depth_record();
        let map = extraction.depth_map();
        println!(
            "  depth record at {}: {}x{}, orientation 0x{:02x} ({}), raster {}x{}",
            record.offset,
            record.columns,
            record.rows,
            record.orientation_code,
            record.orientation().as_str(),
            map.width(),
            map.height()
        );
    }
    Ok(())
}
