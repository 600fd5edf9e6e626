//! Decode-side orchestration.
//!
//! The block size used at encode time is not stored anywhere in the
//! container, so decoding with no prior knowledge is a bounded search:
//! starting from the largest power of two the carrier could have used,
//! extract a candidate bit sequence, try to parse it, and halve the block
//! size on failure. The 128-bit check prefix makes a false accept at the
//! wrong size astronomically unlikely, so the first successful parse is
//! the message.
//!
//! A matching check prefix with an unparseable body is not retried at a
//! smaller size when it cannot be a size artifact (unknown type tag);
//! that is corrupt or foreign data and is reported as such.

use thiserror::Error;

use crate::codec::{self, EmbedError};
use crate::container::{self, ContainerError, Payload};
use crate::raster::Raster;

/// Errors that can occur during decoding.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum DecoderError {
    #[error("no hidden message detected")]
    NoMessageFound,

    #[error(transparent)]
    Container(ContainerError),

    #[error(transparent)]
    Embed(#[from] EmbedError),
}

/// Configuration for the decoder.
#[derive(Debug, Clone, Default)]
pub struct DecoderConfig {
    /// Whether to report the block-size search on stderr.
    pub verbose: bool,
}

/// Recovers a hidden payload from an image.
///
/// With an explicit `block_size` a single extraction is attempted and
/// parse failures surface directly. Without one, the block-size search
/// runs and exhaustion reports [`DecoderError::NoMessageFound`].
pub fn decode(image: &Raster, block_size: Option<usize>) -> Result<Payload, DecoderError> {
    decode_with_config(image, block_size, &DecoderConfig::default())
}

/// Recovers a hidden payload with custom configuration.
pub fn decode_with_config(
    image: &Raster,
    block_size: Option<usize>,
    config: &DecoderConfig,
) -> Result<Payload, DecoderError> {
    match block_size {
        Some(size) => {
            let bit_seq = codec::decode_message(image, size)?;
            container::parse(&bit_seq).map_err(DecoderError::Container)
        }
        None => search_block_sizes(image, config),
    }
}

/// Tries every candidate block size from the largest downward.
fn search_block_sizes(image: &Raster, config: &DecoderConfig) -> Result<Payload, DecoderError> {
    let total_bits = image.payload_sample_count();
    if total_bits < 2 {
        return Err(DecoderError::NoMessageFound);
    }

    let mut power = total_bits.ilog2();
    while power >= 1 {
        let block_size = 1usize << power;
        if config.verbose {
            eprintln!("Trying block size {}", block_size);
        }

        let bit_seq = codec::decode_message(image, block_size)?;
        match container::parse(&bit_seq) {
            Ok(payload) => {
                if config.verbose {
                    eprintln!("Found message at block size {}", block_size);
                }
                return Ok(payload);
            }
            Err(err) if err.is_recoverable() => {
                if config.verbose {
                    eprintln!("Block size {}: {}", block_size, err);
                }
                power -= 1;
            }
            Err(err) => return Err(DecoderError::Container(err)),
        }
    }
    Err(DecoderError::NoMessageFound)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::encode;

    fn carrier(width: u32, height: u32) -> Raster {
        let samples = (0..width as usize * height as usize * 3)
            .map(|i| (i * 59 + 5) as u8)
            .collect();
        Raster::new(width, height, 3, samples).unwrap()
    }

    #[test]
    fn test_decode_finds_negotiated_block_size() {
        let carrier = carrier(32, 32);
        let payload = Payload::Text("Testing 123".to_string());

        let encoded = encode(&carrier, &payload, None).unwrap();
        assert_eq!(decode(&encoded, None).unwrap(), payload);
    }

    #[test]
    fn test_decode_with_explicit_block_size() {
        let carrier = carrier(32, 32);
        let payload = Payload::Text("hidden".to_string());

        let encoded = encode(&carrier, &payload, Some(16)).unwrap();
        assert_eq!(decode(&encoded, Some(16)).unwrap(), payload);
    }

    #[test]
    fn test_decode_wrong_explicit_block_size_fails() {
        let carrier = carrier(32, 32);
        let payload = Payload::Text("hidden".to_string());

        let encoded = encode(&carrier, &payload, Some(16)).unwrap();
        let result = decode(&encoded, Some(4));
        assert!(matches!(result, Err(DecoderError::Container(_))));
    }

    #[test]
    fn test_decode_plain_carrier_reports_no_message() {
        let result = decode(&carrier(16, 16), None);
        assert_eq!(result, Err(DecoderError::NoMessageFound));
    }

    #[test]
    fn test_decode_tiny_raster_reports_no_message() {
        let raster = Raster::new(0, 0, 3, vec![]).unwrap();
        assert_eq!(decode(&raster, None), Err(DecoderError::NoMessageFound));
    }
}
