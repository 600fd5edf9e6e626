//! Decode command - recover a hidden payload from an image.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Args;

use pixelveil::{decode_with_config, DecoderConfig, Payload, Raster};

use super::CommandExecutor;

/// Recover a hidden payload from an image.
///
/// No metadata is needed: the block size is rediscovered by trial and the
/// container header describes the payload's type and shape. Text payloads
/// print to stdout; image payloads need --output.
#[derive(Args, Debug)]
pub struct DecodeCommand {
    /// Path to the image to inspect
    #[arg(short, long)]
    pub image: PathBuf,

    /// Block size used at encode time; searched automatically when omitted
    #[arg(short, long)]
    pub block_size: Option<usize>,

    /// Output path for a recovered image payload (PNG or BMP)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Write the recovered bit plane as raw 0/1 samples instead of
    /// scaling it to black and white for viewing
    #[arg(long)]
    pub raw: bool,

    /// Verbose output (shows the block-size search)
    #[arg(short, long)]
    pub verbose: bool,
}

impl CommandExecutor for DecodeCommand {
    fn execute(&self) -> Result<()> {
        let input = image::open(&self.image)
            .with_context(|| format!("Failed to load image from {}", self.image.display()))?;
        let raster = Raster::from_image(&input);

        let config = DecoderConfig {
            verbose: self.verbose,
        };
        let payload = decode_with_config(&raster, self.block_size, &config)
            .context("Failed to recover a payload")?;

        match payload {
            Payload::Text(text) => {
                println!("{}", text);
            }
            Payload::Image(recovered) => {
                let Some(output) = &self.output else {
                    bail!("The hidden payload is an image; provide --output to save it");
                };
                // The payload travels as a bit plane; scale it up so the
                // saved file is viewable unless raw values were asked for.
                let out = if self.raw {
                    recovered
                } else {
                    recovered.lsb_plane()
                };
                out.to_image()
                    .save(output)
                    .with_context(|| format!("Failed to save image to {}", output.display()))?;
                println!("Recovered image written to {}", output.display());
            }
        }
        Ok(())
    }
}
