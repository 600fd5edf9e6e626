//! The minimal-flip block embedding codec.
//!
//! A block of `2^k` least significant bits carries a k-bit value: the XOR
//! of the positions of its set bits (the "reduce value"). Toggling the bit
//! at position `p` XORs the reduce value with `p`, independent of every
//! other bit, so steering a block to any target value costs one flip:
//!
//! ```text
//! diff = reduce_value(block) ^ target
//! flip block[diff]            // new reduce value == target
//! ```
//!
//! When `diff` is 0 the flip lands on position 0, which never contributes
//! to the reduce value, so the decoded value is unchanged. The flip is
//! still performed: exactly one bit changes per block, always, and outputs
//! stay bit-identical across implementations.

use thiserror::Error;

use crate::bits;
use crate::raster::{self, Raster};

/// Errors from embedding a bit sequence into a carrier.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum EmbedError {
    #[error("block size {0} is not a power of two of at least 2")]
    InvalidBlockSize(usize),

    #[error("payload too large: need {needed} bits, carrier holds {capacity} at block size {block_size}")]
    PayloadTooLarge {
        needed: usize,
        capacity: usize,
        block_size: usize,
    },
}

/// Number of payload bits carried per block: `log2(block_size)`.
pub fn bits_per_block(block_size: usize) -> usize {
    block_size.trailing_zeros() as usize
}

/// Payload bits the carrier can hold at the given block size.
pub fn capacity(carrier: &Raster, block_size: usize) -> usize {
    (carrier.payload_sample_count() / block_size) * bits_per_block(block_size)
}

fn check_block_size(block_size: usize) -> Result<(), EmbedError> {
    if block_size < 2 || !block_size.is_power_of_two() {
        return Err(EmbedError::InvalidBlockSize(block_size));
    }
    Ok(())
}

/// The value a block currently encodes: the XOR of the positions of all
/// set bits.
pub fn reduce_value(block: &[u8]) -> usize {
    block
        .iter()
        .enumerate()
        .filter(|(_, &bit)| bit != 0)
        .fold(0, |acc, (pos, _)| acc ^ pos)
}

/// Recovers the value carried by a block.
pub fn decode_block(block: &[u8]) -> usize {
    reduce_value(block)
}

/// Steers `block` to encode `target` by flipping exactly one bit.
///
/// `target` must be in `[0, block.len())`. The position-0 flip for an
/// already-matching block is intentional and must not be skipped.
pub fn encode_block(block: &mut [u8], target: usize) {
    let diff = reduce_value(block) ^ target;
    block[diff] ^= 1;
}

/// Embeds `payload` into the carrier's least significant bits.
///
/// The payload is chunked into `log2(block_size)`-bit values, zero-padded
/// on the right to fill every block, and each block is steered to its
/// value. All non-LSB bits of every sample are preserved exactly; the
/// alpha channel, when present, passes through untouched.
///
/// Fails before any pixel work when the payload does not fit.
pub fn encode_message(
    carrier: &Raster,
    payload: &[u8],
    block_size: usize,
) -> Result<Raster, EmbedError> {
    check_block_size(block_size)?;
    let capacity = capacity(carrier, block_size);
    if payload.len() > capacity {
        return Err(EmbedError::PayloadTooLarge {
            needed: payload.len(),
            capacity,
            block_size,
        });
    }

    let mut blocks = raster::to_blocks(carrier, block_size);
    let k = bits_per_block(block_size);

    let mut padded = payload.to_vec();
    padded.resize(blocks.block_count() * k, 0);
    let targets = bits::chunk_values(&padded, k);

    for (index, &target) in targets.iter().enumerate() {
        encode_block(blocks.block_mut(index), target as usize);
    }

    let lsbs = raster::from_blocks(&blocks, carrier.width(), carrier.height(), carrier.depth());

    // Merge the new LSBs onto a copy of the carrier, skipping alpha.
    let channels = carrier.channels() as usize;
    let depth = carrier.depth() as usize;
    let mut samples = carrier.samples().to_vec();
    let mut bit_index = 0;
    for (i, sample) in samples.iter_mut().enumerate() {
        if i % channels >= depth {
            continue;
        }
        *sample = (*sample & 0xFE) | lsbs[bit_index];
        bit_index += 1;
    }

    Ok(Raster::from_parts(
        carrier.width(),
        carrier.height(),
        carrier.channels(),
        samples,
    ))
}

/// Recovers the embedded bit sequence from an image.
///
/// Every block's reduce value is emitted as `log2(block_size)` bits, most
/// significant first, in block order. Whether those bits hold a message is
/// for the container layer to decide.
pub fn decode_message(image: &Raster, block_size: usize) -> Result<Vec<u8>, EmbedError> {
    check_block_size(block_size)?;
    let blocks = raster::to_blocks(image, block_size);
    let k = bits_per_block(block_size);

    let mut out = Vec::with_capacity(blocks.block_count() * k);
    for index in 0..blocks.block_count() {
        let value = reduce_value(blocks.block(index));
        out.extend(bits::value_to_bits(value as u64, k));
    }
    Ok(out)
}
