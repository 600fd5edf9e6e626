//! Pixelveil - hide text or images inside the pixels of another image.
//!
//! A CLI for least-significant-bit steganography with a self-describing
//! container format: the decoder needs nothing but the image.

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;

use commands::{CommandExecutor, DecodeCommand, EncodeCommand, InfoCommand};

/// Pixelveil - hide text or images inside the pixels of another image
///
/// Payloads ride in the least significant bits of a lossless carrier.
/// Each block of carrier bits changes by at most one bit, and the decoder
/// recovers everything (payload type, dimensions, block size) from the
/// image alone.
#[derive(Parser)]
#[command(name = "pixelveil")]
#[command(version)]
#[command(about = "Hide text or images inside the least significant bits of a carrier image")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Hide a message or image inside a carrier image
    Encode(EncodeCommand),

    /// Recover a hidden payload from an image
    Decode(DecodeCommand),

    /// Inspect an image's embedding capacity
    Info(InfoCommand),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Encode(cmd) => cmd.execute(),
        Commands::Decode(cmd) => cmd.execute(),
        Commands::Info(cmd) => cmd.execute(),
    }
}
