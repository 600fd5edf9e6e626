//! Variable-length integer framing for container fields.
//!
//! Every structured integer in a container (type tag, lengths, image
//! dimensions) is written as a field: a short first segment with room for
//! small values, then as many 8-bit extension segments as the value needs.
//! Each segment ends with a continuation bit telling the decoder whether
//! another segment follows.
//!
//! Layout, most significant data bits first:
//!
//! ```text
//! [3 data bits][cont]                        value fits in 3 bits
//! [3 data bits][1]([8 data bits][cont])+     larger values
//! ```
//!
//! Encoding is canonical: the value is left-padded with zero bits only as
//! far as the smallest whole number of segments that fits it.

use thiserror::Error;

use crate::bits::{self, BitReader};

/// Data bits in the first segment of a field.
const FIRST_SEGMENT_BITS: usize = 3;

/// Data bits in each extension segment.
const SEGMENT_BITS: usize = 8;

/// Errors from decoding fields out of a bit stream.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum FieldError {
    #[error("bit stream ended in the middle of a field")]
    UnexpectedEnd,

    #[error("field value does not fit in 64 bits")]
    Overflow,
}

/// Encodes a non-negative integer as a field.
pub fn encode_field(value: u64) -> Vec<u8> {
    let width = bits::min_width(value);
    if width <= FIRST_SEGMENT_BITS {
        let mut out = bits::value_to_bits(value, FIRST_SEGMENT_BITS);
        out.push(0);
        return out;
    }

    let sections = (width - FIRST_SEGMENT_BITS).div_ceil(SEGMENT_BITS);
    let data_bits = FIRST_SEGMENT_BITS + sections * SEGMENT_BITS;
    let data = bits::value_to_bits(value, data_bits);

    let mut out = Vec::with_capacity(data_bits + sections + 1);
    out.extend_from_slice(&data[..FIRST_SEGMENT_BITS]);
    out.push(1);
    for section in 0..sections {
        let start = FIRST_SEGMENT_BITS + section * SEGMENT_BITS;
        out.extend_from_slice(&data[start..start + SEGMENT_BITS]);
        out.push(if section + 1 == sections { 0 } else { 1 });
    }
    out
}

/// Decodes a single field from the reader.
pub fn decode_field(reader: &mut BitReader) -> Result<u64, FieldError> {
    let mut value = reader
        .read_value(FIRST_SEGMENT_BITS)
        .ok_or(FieldError::UnexpectedEnd)?;
    let mut more = reader.read_bit().ok_or(FieldError::UnexpectedEnd)? == 1;

    while more {
        // Reject streams whose set bits would be shifted out of range.
        if value >> (u64::BITS as usize - SEGMENT_BITS) != 0 {
            return Err(FieldError::Overflow);
        }
        let segment = reader
            .read_value(SEGMENT_BITS)
            .ok_or(FieldError::UnexpectedEnd)?;
        value = (value << SEGMENT_BITS) | segment;
        more = reader.read_bit().ok_or(FieldError::UnexpectedEnd)? == 1;
    }
    Ok(value)
}

/// Encodes a non-empty list of fields as a sequence.
///
/// Each field is preceded by one continuation bit: 1 when another field
/// follows the one being read, 0 when it is the last of the sequence.
pub fn encode_field_sequence(fields: &[u64]) -> Vec<u8> {
    let mut out = Vec::new();
    for (i, &field) in fields.iter().enumerate() {
        out.push(if i + 1 == fields.len() { 0 } else { 1 });
        out.extend(encode_field(field));
    }
    out
}

/// Decodes a field sequence; always reads at least one field.
pub fn decode_field_sequence(reader: &mut BitReader) -> Result<Vec<u64>, FieldError> {
    let mut fields = Vec::new();
    loop {
        let more = reader.read_bit().ok_or(FieldError::UnexpectedEnd)? == 1;
        fields.push(decode_field(reader)?);
        if !more {
            return Ok(fields);
        }
    }
}
