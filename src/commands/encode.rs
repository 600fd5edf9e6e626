//! Encode command - hide a message or image inside a carrier image.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Args;

use pixelveil::{encode_with_config, EncoderConfig, Payload, Raster};

use super::CommandExecutor;

/// Hide a message or image inside a carrier image.
///
/// The carrier must be a lossless format (PNG or BMP); a lossy recompression
/// would destroy the least significant bits that carry the payload. At most
/// one bit changes per block, so larger block sizes touch fewer pixels.
#[derive(Args, Debug)]
pub struct EncodeCommand {
    /// Path to the carrier image (PNG or BMP)
    #[arg(short, long)]
    pub carrier: PathBuf,

    /// Text message to hide (mutually exclusive with --file)
    #[arg(short, long, conflicts_with = "file")]
    pub message: Option<String>,

    /// Image to hide (mutually exclusive with --message)
    /// Only its least-significant-bit plane is embedded
    #[arg(short, long, conflicts_with = "message")]
    pub file: Option<PathBuf>,

    /// Output path for the encoded image (PNG or BMP)
    #[arg(short, long)]
    pub output: PathBuf,

    /// Block size (a power of two, at least 2)
    /// Negotiated from the carrier's capacity when omitted
    #[arg(short, long)]
    pub block_size: Option<usize>,

    /// Verbose output (shows serialization and negotiation steps)
    #[arg(short, long)]
    pub verbose: bool,
}

impl CommandExecutor for EncodeCommand {
    fn execute(&self) -> Result<()> {
        ensure_lossless(&self.output)?;

        let carrier_image = image::open(&self.carrier)
            .with_context(|| format!("Failed to load carrier from {}", self.carrier.display()))?;
        let carrier = Raster::from_image(&carrier_image);

        if self.verbose {
            eprintln!(
                "Carrier is {}x{} with {} channels",
                carrier.width(),
                carrier.height(),
                carrier.channels()
            );
        }

        let payload = match (&self.message, &self.file) {
            (Some(text), None) => Payload::Text(text.clone()),
            (None, Some(path)) => {
                let embedded = image::open(path).with_context(|| {
                    format!("Failed to load payload image from {}", path.display())
                })?;
                Payload::Image(Raster::from_image(&embedded))
            }
            _ => bail!("Provide exactly one of --message or --file"),
        };

        let config = EncoderConfig {
            verbose: self.verbose,
        };
        let encoded = encode_with_config(&carrier, &payload, self.block_size, &config)
            .context("Failed to embed the payload")?;

        encoded
            .to_image()
            .save(&self.output)
            .with_context(|| format!("Failed to save encoded image to {}", self.output.display()))?;

        println!("Hidden payload written to {}", self.output.display());
        Ok(())
    }
}

fn ensure_lossless(path: &Path) -> Result<()> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("png") || ext.eq_ignore_ascii_case("bmp") => Ok(()),
        _ => bail!(
            "Output must be a lossless format (.png or .bmp); \
             lossy formats destroy the hidden bits"
        ),
    }
}
