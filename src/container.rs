//! The self-describing message container.
//!
//! A container frames a payload so a decoder with no external metadata can
//! recover it from a raw bit stream:
//!
//! ```text
//! [128 check bits][type field][format field sequence][payload bits...]
//! ```
//!
//! The check bits are a fixed constant shared by every encoder and
//! decoder; matching against arbitrary carrier noise has probability
//! around 2^-128, which is accepted rather than guarded against. The
//! format fields alone determine how many payload bits are meaningful;
//! whatever follows is padding from block alignment and is ignored.

use thiserror::Error;

use crate::bits::{self, BitReader};
use crate::field::{self, FieldError};
use crate::raster::Raster;

/// The check pattern, expanded to 128 bits MSB-first on both ends of the
/// pipeline. Chosen once; every peer must share it.
pub const CHECK_BYTES: &[u8; 16] = b"PIXELVEIL-TAG-01";

/// Length of the check prefix in bits.
pub const CHECK_BITS_LEN: usize = CHECK_BYTES.len() * 8;

/// Type tag for text payloads.
pub const TYPE_TEXT: u64 = 0;

/// Type tag for image payloads.
pub const TYPE_IMAGE: u64 = 1;

/// Errors from parsing a container out of a bit sequence.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ContainerError {
    #[error("check bits do not match; no message present")]
    CheckBitsMismatch,

    #[error("unknown payload type tag {0}")]
    UnknownTypeTag(u64),

    #[error("payload truncated: need {needed} bits, have {available}")]
    TruncatedPayload { needed: usize, available: usize },

    #[error("invalid code point {0:#x} in text payload")]
    InvalidCodePoint(u64),

    #[error("invalid format fields: {0}")]
    InvalidFormat(&'static str),

    #[error(transparent)]
    Field(#[from] FieldError),
}

impl ContainerError {
    /// Whether a block-size search may recover from this error by trying
    /// a smaller size. A matching check prefix with an unknown tag means
    /// the size was right and the data is genuinely foreign or corrupt.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, ContainerError::UnknownTypeTag(_))
    }
}

/// A payload that can be hidden in a carrier.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Text(String),
    Image(Raster),
}

/// A container body: type tag, format descriptor, and payload bits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub type_tag: u64,
    pub format_fields: Vec<u64>,
    pub payload_bits: Vec<u8>,
}

/// One registered payload kind: its tag and the converter that rebuilds
/// the payload from format fields and raw bits. Adding a payload kind
/// means adding a [`Payload`] variant and one entry here.
struct TypeEntry {
    tag: u64,
    from_message: fn(&[u64], &[u8]) -> Result<Payload, ContainerError>,
}

static TYPE_REGISTRY: &[TypeEntry] = &[
    TypeEntry {
        tag: TYPE_TEXT,
        from_message: text_from_message,
    },
    TypeEntry {
        tag: TYPE_IMAGE,
        from_message: image_from_message,
    },
];

/// The check prefix as a bit sequence.
pub fn check_bits() -> Vec<u8> {
    let mut out = Vec::with_capacity(CHECK_BITS_LEN);
    for &byte in CHECK_BYTES {
        out.extend(bits::value_to_bits(u64::from(byte), 8));
    }
    out
}

/// True iff the sequence starts with the check prefix.
pub fn validate(bit_seq: &[u8]) -> bool {
    bit_seq.len() >= CHECK_BITS_LEN && bit_seq[..CHECK_BITS_LEN] == check_bits()
}

/// Builds the container body for a payload.
pub fn to_message(payload: &Payload) -> Message {
    match payload {
        Payload::Text(text) => text_to_message(text),
        Payload::Image(raster) => image_to_message(raster),
    }
}

/// Serializes a payload into the full container bit sequence.
pub fn serialize(payload: &Payload) -> Vec<u8> {
    let message = to_message(payload);
    let mut out = check_bits();
    out.extend(field::encode_field(message.type_tag));
    out.extend(field::encode_field_sequence(&message.format_fields));
    out.extend(message.payload_bits);
    out
}

/// Parses a container bit sequence back into a typed payload.
///
/// Trailing bits beyond what the format fields declare are ignored.
pub fn parse(bit_seq: &[u8]) -> Result<Payload, ContainerError> {
    if !validate(bit_seq) {
        return Err(ContainerError::CheckBitsMismatch);
    }

    let mut reader = BitReader::new(&bit_seq[CHECK_BITS_LEN..]);
    let type_tag = field::decode_field(&mut reader)?;
    let format_fields = field::decode_field_sequence(&mut reader)?;
    let payload_bits = reader.remaining();

    let entry = TYPE_REGISTRY
        .iter()
        .find(|entry| entry.tag == type_tag)
        .ok_or(ContainerError::UnknownTypeTag(type_tag))?;
    (entry.from_message)(&format_fields, payload_bits)
}

/// Text payloads: format fields are `[code_unit_width, character_count]`.
///
/// The code unit width is the smallest bit width able to represent the
/// largest scalar value present, so plain ASCII costs 7 bits per character
/// and digits-only text even less.
fn text_to_message(text: &str) -> Message {
    let max_code = text.chars().map(u32::from).max().unwrap_or(0);
    let width = bits::min_width(u64::from(max_code)).max(1);
    let count = text.chars().count();

    Message {
        type_tag: TYPE_TEXT,
        format_fields: vec![width as u64, count as u64],
        payload_bits: bits::str_to_bits(text, width),
    }
}

fn text_from_message(fields: &[u64], payload: &[u8]) -> Result<Payload, ContainerError> {
    let [width, count] = fields else {
        return Err(ContainerError::InvalidFormat(
            "text expects [code_unit_width, character_count]",
        ));
    };
    if *width == 0 || *width > 32 {
        return Err(ContainerError::InvalidFormat("code unit width out of range"));
    }

    let width = *width as usize;
    let count = usize::try_from(*count)
        .map_err(|_| ContainerError::InvalidFormat("character count out of range"))?;
    let needed = width
        .checked_mul(count)
        .ok_or(ContainerError::InvalidFormat("character count out of range"))?;
    if needed > payload.len() {
        return Err(ContainerError::TruncatedPayload {
            needed,
            available: payload.len(),
        });
    }

    let mut text = String::with_capacity(count);
    for code in bits::chunk_values(&payload[..needed], width) {
        let ch = u32::try_from(code)
            .ok()
            .and_then(char::from_u32)
            .ok_or(ContainerError::InvalidCodePoint(code))?;
        text.push(ch);
    }
    Ok(Payload::Text(text))
}

/// Image payloads: format fields are `[width, height, depth, has_alpha]`.
///
/// The payload is the embedded raster's LSB plane, one bit per non-alpha
/// sample in row-major channel-minor order, exactly
/// `width * height * depth` bits.
fn image_to_message(raster: &Raster) -> Message {
    Message {
        type_tag: TYPE_IMAGE,
        format_fields: vec![
            u64::from(raster.width()),
            u64::from(raster.height()),
            u64::from(raster.depth()),
            u64::from(raster.has_alpha()),
        ],
        payload_bits: raster.lsb_bits(),
    }
}

fn image_from_message(fields: &[u64], payload: &[u8]) -> Result<Payload, ContainerError> {
    let [width, height, depth, has_alpha] = fields else {
        return Err(ContainerError::InvalidFormat(
            "image expects [width, height, depth, has_alpha]",
        ));
    };
    let width = u32::try_from(*width)
        .map_err(|_| ContainerError::InvalidFormat("image width out of range"))?;
    let height = u32::try_from(*height)
        .map_err(|_| ContainerError::InvalidFormat("image height out of range"))?;
    let has_alpha = match has_alpha {
        0 => false,
        1 => true,
        _ => return Err(ContainerError::InvalidFormat("alpha flag must be 0 or 1")),
    };
    // With alpha confined to channel 3, only depth-3 rasters exist.
    if *depth != 3 {
        return Err(ContainerError::InvalidFormat(
            "depth and alpha flag describe no supported raster",
        ));
    }
    let channels = *depth + u64::from(has_alpha);

    let depth = *depth as usize;
    let needed = (width as usize)
        .checked_mul(height as usize)
        .and_then(|n| n.checked_mul(depth))
        .ok_or(ContainerError::InvalidFormat("image dimensions out of range"))?;
    if needed > payload.len() {
        return Err(ContainerError::TruncatedPayload {
            needed,
            available: payload.len(),
        });
    }

    // Bits land in the payload channels; alpha comes back fully opaque.
    let bit_plane = &payload[..needed];
    let channels = channels as usize;
    let mut samples = Vec::with_capacity(width as usize * height as usize * channels);
    for pixel in bit_plane.chunks(depth) {
        samples.extend_from_slice(pixel);
        if has_alpha {
            samples.push(255);
        }
    }
    Ok(Payload::Image(Raster::from_parts(
        width,
        height,
        channels as u8,
        samples,
    )))
}
