//! # Pixelveil - hide payloads in the low bits of images
//!
//! Pixelveil hides a payload (text or another raster image) inside the
//! least significant bits of a lossless carrier image, and recovers it
//! with no metadata beyond the image itself.
//!
//! ## How it works
//!
//! - The carrier's non-alpha LSBs are grouped into blocks of `2^k` bits.
//!   A block encodes the k-bit XOR of its set-bit positions, and can be
//!   steered to any k-bit value by flipping **one** bit. Larger blocks
//!   mean fewer changed pixels for the same message.
//! - The payload travels in a self-describing container: a 128-bit check
//!   pattern, a type tag, and variable-length fields describing the
//!   payload's shape. A decoder confirms a message is present, learns its
//!   type and dimensions, and discovers the block size by trial, from the
//!   largest candidate down.
//!
//! The hidden data is not encrypted; this is steganography, not
//! cryptography. Carriers must be lossless (PNG, BMP) since every pixel
//! value matters.
//!
//! ## Example
//!
//! ```rust
//! use pixelveil::{decode, encode, Payload, Raster};
//!
//! // Any RGB(A) raster with enough capacity works as a carrier.
//! let samples = (0..32 * 32 * 3).map(|i| (i % 251) as u8).collect();
//! let carrier = Raster::new(32, 32, 3, samples).unwrap();
//!
//! let hidden = encode(&carrier, &Payload::Text("Testing 123".into()), None).unwrap();
//!
//! // The decoder needs nothing but the image.
//! let recovered = decode(&hidden, None).unwrap();
//! assert_eq!(recovered, Payload::Text("Testing 123".into()));
//! ```
//!
//! ## Modules
//!
//! - [`bits`]: bit sequence conversion primitives
//! - [`raster`]: pixel buffers and the LSB block transform
//! - [`codec`]: the minimal-flip block embedding codec
//! - [`field`]: variable-length integer framing
//! - [`container`]: check bits, type registry, payload converters
//! - [`encoder`] / [`decoder`]: orchestration and block-size negotiation

pub mod bits;
pub mod codec;
pub mod container;
pub mod decoder;
pub mod encoder;
pub mod field;
pub mod raster;

// Re-export commonly used types at the crate root
pub use codec::EmbedError;
pub use container::{ContainerError, Message, Payload};
pub use decoder::{decode, decode_with_config, DecoderConfig, DecoderError};
pub use encoder::{
    encode, encode_with_config, negotiate_block_size, EncoderConfig, EncoderError,
};
pub use raster::{Raster, RasterError};
