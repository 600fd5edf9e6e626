//! Encode-side orchestration.
//!
//! This module wires the container format onto a real carrier:
//! 1. Serialize the payload into a tagged bit sequence
//! 2. Pick a block size (caller-supplied, or negotiated from capacity)
//! 3. Embed the bits into the carrier's least significant bits
//!
//! Negotiation prefers the largest block size that still fits the
//! message: every block flips at most one bit regardless of its size, so
//! fewer, larger blocks mean fewer changed pixels. The chosen size is not
//! recorded anywhere; the decoder rediscovers it by trial.

use thiserror::Error;

use crate::codec::{self, EmbedError};
use crate::container::{self, Payload};
use crate::raster::Raster;

/// Errors that can occur during encoding.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum EncoderError {
    #[error(transparent)]
    Embed(#[from] EmbedError),
}

/// Configuration for the encoder.
#[derive(Debug, Clone, Default)]
pub struct EncoderConfig {
    /// Whether to report negotiation and embedding progress on stderr.
    pub verbose: bool,
}

/// Hides a payload in the carrier, negotiating the block size when none
/// is given.
///
/// Returns a new raster; the carrier is never modified, and nothing is
/// written before the capacity check passes.
pub fn encode(
    carrier: &Raster,
    payload: &Payload,
    block_size: Option<usize>,
) -> Result<Raster, EncoderError> {
    encode_with_config(carrier, payload, block_size, &EncoderConfig::default())
}

/// Hides a payload with custom configuration.
pub fn encode_with_config(
    carrier: &Raster,
    payload: &Payload,
    block_size: Option<usize>,
    config: &EncoderConfig,
) -> Result<Raster, EncoderError> {
    let message_bits = container::serialize(payload);
    if config.verbose {
        eprintln!("Serialized message is {} bits", message_bits.len());
    }

    let block_size = match block_size {
        Some(size) => size,
        None => negotiate_block_size(carrier, message_bits.len())?,
    };
    if config.verbose {
        eprintln!(
            "Embedding at block size {} ({} bits per block, capacity {} bits)",
            block_size,
            codec::bits_per_block(block_size),
            codec::capacity(carrier, block_size)
        );
    }

    Ok(codec::encode_message(carrier, &message_bits, block_size)?)
}

/// Finds the largest power-of-two block size whose capacity still covers
/// a message of `message_bits` bits.
///
/// Fails when even block size 2 cannot fit the message.
pub fn negotiate_block_size(carrier: &Raster, message_bits: usize) -> Result<usize, EmbedError> {
    let total_bits = carrier.payload_sample_count();

    let mut power = 1;
    if capacity_at(total_bits, power) < message_bits {
        return Err(EmbedError::PayloadTooLarge {
            needed: message_bits,
            capacity: capacity_at(total_bits, power),
            block_size: 2,
        });
    }
    while capacity_at(total_bits, power + 1) >= message_bits {
        power += 1;
    }
    Ok(1 << power)
}

/// Payload bits representable with `total_bits` carrier bits at block
/// size `2^power`.
fn capacity_at(total_bits: usize, power: u32) -> usize {
    if power >= usize::BITS {
        return 0;
    }
    (total_bits >> power) * power as usize
}
