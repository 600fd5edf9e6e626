//! Info command - inspect an image's embedding capacity.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use pixelveil::codec;
use pixelveil::Raster;

use super::CommandExecutor;

/// Show a carrier's capacity at every usable block size.
///
/// Capacity in payload bits shrinks as blocks grow, but so does the
/// number of changed pixels: one flip per block, regardless of size.
#[derive(Args, Debug)]
pub struct InfoCommand {
    /// Path to the image to inspect
    #[arg(short, long)]
    pub image: PathBuf,

    /// Save the least-significant-bit plane (scaled to black and white)
    /// to this path, to eyeball where a payload would land
    #[arg(long)]
    pub lsb_out: Option<PathBuf>,
}

impl CommandExecutor for InfoCommand {
    fn execute(&self) -> Result<()> {
        let input = image::open(&self.image)
            .with_context(|| format!("Failed to load image from {}", self.image.display()))?;
        let raster = Raster::from_image(&input);

        println!(
            "{}x{} pixels, {} channels{}",
            raster.width(),
            raster.height(),
            raster.channels(),
            if raster.has_alpha() {
                " (alpha excluded from embedding)"
            } else {
                ""
            }
        );
        println!("Usable carrier bits: {}", raster.payload_sample_count());
        println!();
        println!("{:>12} {:>16} {:>14}", "block size", "capacity (bits)", "bits flipped");

        let mut block_size = 2usize;
        loop {
            let capacity = codec::capacity(&raster, block_size);
            if capacity == 0 {
                break;
            }
            println!(
                "{:>12} {:>16} {:>14}",
                block_size,
                capacity,
                raster.payload_sample_count() / block_size
            );
            block_size *= 2;
        }

        if let Some(path) = &self.lsb_out {
            raster
                .lsb_plane()
                .to_image()
                .save(path)
                .with_context(|| format!("Failed to save LSB plane to {}", path.display()))?;
            println!("\nLSB plane written to {}", path.display());
        }
        Ok(())
    }
}
