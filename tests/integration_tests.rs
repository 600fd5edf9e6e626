//! Integration tests for Pixelveil
//!
//! These drive the public API end to end: payload -> container -> block
//! embedding -> raster, and back with no metadata beyond the image.
//!
//! Properties covered:
//! - Text and image payload round trips, with and without a block size
//! - Block-size negotiation (prefers large blocks, monotonic in length)
//! - At most one changed bit per block, LSBs only, alpha untouched
//! - No-message detection on carriers that hold nothing

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;

use pixelveil::{
    decode, encode, negotiate_block_size, DecoderError, EmbedError, EncoderError, Payload, Raster,
};

/// Deterministic RGB carrier with varied pixel values.
fn test_carrier(width: u32, height: u32) -> Raster {
    let mut samples = Vec::with_capacity(width as usize * height as usize * 3);
    for y in 0..height {
        for x in 0..width {
            samples.push(((x * 17 + y * 3) % 256) as u8);
            samples.push(((y * 23 + x * 7) % 256) as u8);
            samples.push((((x + y) * 31 + 5) % 256) as u8);
        }
    }
    Raster::new(width, height, 3, samples).unwrap()
}

/// Seeded random RGBA carrier.
fn random_rgba_carrier(width: u32, height: u32, seed: u64) -> Raster {
    let mut rng = ChaCha20Rng::seed_from_u64(seed);
    let samples = (0..width as usize * height as usize * 4)
        .map(|_| rng.gen())
        .collect();
    Raster::new(width, height, 4, samples).unwrap()
}

/// Test basic text round trip with automatic block size
#[test]
fn test_text_roundtrip_auto_block_size() {
    let carrier = test_carrier(64, 64);
    let payload = Payload::Text("Testing 123".to_string());

    let encoded = encode(&carrier, &payload, None).unwrap();
    let decoded = decode(&encoded, None).unwrap();

    assert_eq!(decoded, payload);
}

/// Test text round trip at an explicit block size
#[test]
fn test_text_roundtrip_explicit_block_size() {
    let carrier = test_carrier(32, 32);
    let payload = Payload::Text("explicit block size".to_string());

    let encoded = encode(&carrier, &payload, Some(32)).unwrap();

    // decodes both with and without the size being known
    assert_eq!(decode(&encoded, Some(32)).unwrap(), payload);
    assert_eq!(decode(&encoded, None).unwrap(), payload);
}

/// Test non-ASCII text survives the variable code unit width
#[test]
fn test_text_roundtrip_wide_characters() {
    let carrier = test_carrier(64, 64);
    let payload = Payload::Text("héllo wörld ✓".to_string());

    let encoded = encode(&carrier, &payload, None).unwrap();
    assert_eq!(decode(&encoded, None).unwrap(), payload);
}

/// Test hiding a small image inside a larger carrier
#[test]
fn test_image_roundtrip() {
    let carrier = test_carrier(64, 64);

    // the payload travels as a bit plane, so use bit-valued samples
    let samples: Vec<u8> = (0..8 * 8 * 3).map(|i| ((i * 7 + 1) % 2) as u8).collect();
    let embedded = Raster::new(8, 8, 3, samples).unwrap();
    let payload = Payload::Image(embedded);

    let encoded = encode(&carrier, &payload, None).unwrap();
    let decoded = decode(&encoded, None).unwrap();

    assert_eq!(decoded, payload);
}

/// Test that an RGBA payload comes back with opaque alpha
#[test]
fn test_image_roundtrip_rgba_payload() {
    let carrier = test_carrier(64, 64);

    let mut samples = Vec::new();
    for i in 0..16 {
        samples.extend([i % 2, (i + 1) % 2, 1, 130 + i]);
    }
    let embedded = Raster::new(4, 4, 4, samples).unwrap();

    let encoded = encode(&carrier, &Payload::Image(embedded.clone()), None).unwrap();
    let Payload::Image(decoded) = decode(&encoded, None).unwrap() else {
        panic!("expected an image payload");
    };

    assert_eq!(decoded.width(), 4);
    assert_eq!(decoded.height(), 4);
    assert_eq!(decoded.channels(), 4);
    // color samples carry the embedded LSB plane, alpha is opaque
    for pixel in 0..16 {
        for channel in 0..3 {
            assert_eq!(
                decoded.samples()[pixel * 4 + channel],
                embedded.samples()[pixel * 4 + channel] & 1
            );
        }
        assert_eq!(decoded.samples()[pixel * 4 + 3], 255);
    }
}

/// Test that encoding changes at most one bit per block, LSBs only
#[test]
fn test_at_most_one_flip_per_block() {
    let carrier = test_carrier(32, 32);
    let payload = Payload::Text("stealth".to_string());
    let block_size = 64usize;

    let encoded = encode(&carrier, &payload, Some(block_size)).unwrap();

    let before = carrier.samples();
    let after = encoded.samples();
    assert_eq!(before.len(), after.len());

    // only LSBs may differ
    for (b, a) in before.iter().zip(after) {
        assert!(b & 0xFE == a & 0xFE, "non-LSB bits changed");
    }

    // 32x32x3 = 3072 samples, an exact multiple of the block size
    let diffs: Vec<usize> = before
        .iter()
        .zip(after)
        .enumerate()
        .filter(|(_, (b, a))| b != a)
        .map(|(i, _)| i)
        .collect();
    let mut per_block = vec![0usize; before.len() / block_size];
    for index in diffs {
        per_block[index / block_size] += 1;
    }
    assert!(per_block.iter().all(|&count| count <= 1));
}

/// Test that alpha samples pass through encoding untouched
#[test]
fn test_alpha_passthrough() {
    let carrier = random_rgba_carrier(32, 32, 7);
    let payload = Payload::Text("alpha stays".to_string());

    let encoded = encode(&carrier, &payload, None).unwrap();

    for pixel in 0..(32 * 32) {
        assert_eq!(
            carrier.samples()[pixel * 4 + 3],
            encoded.samples()[pixel * 4 + 3],
            "alpha changed at pixel {}",
            pixel
        );
    }
    assert_eq!(decode(&encoded, None).unwrap(), payload);
}

/// Test that a longer message never negotiates a larger block size
#[test]
fn test_negotiated_block_size_monotonicity() {
    let carrier = test_carrier(48, 48);

    let short = negotiate_block_size(&carrier, 200).unwrap();
    let medium = negotiate_block_size(&carrier, 500).unwrap();
    let long = negotiate_block_size(&carrier, 2000).unwrap();

    assert!(short >= medium);
    assert!(medium >= long);
}

/// Test that an oversized payload is rejected before any pixel changes
#[test]
fn test_payload_too_large() {
    let carrier = test_carrier(8, 8);
    let payload = Payload::Text("x".repeat(500));

    let result = encode(&carrier, &payload, None);
    assert!(matches!(
        result,
        Err(EncoderError::Embed(EmbedError::PayloadTooLarge { .. }))
    ));
}

/// Test that a carrier with no message decodes to NoMessageFound
#[test]
fn test_no_message_in_random_image() {
    for seed in 0..4 {
        let carrier = random_rgba_carrier(48, 48, 100 + seed);
        assert_eq!(decode(&carrier, None), Err(DecoderError::NoMessageFound));
    }
}

/// Test that decoding a plain deterministic carrier finds nothing either
#[test]
fn test_no_message_in_plain_carrier() {
    let carrier = test_carrier(64, 64);
    assert_eq!(decode(&carrier, None), Err(DecoderError::NoMessageFound));
}

/// Test a payload large enough to force multi-segment fields
#[test]
fn test_long_text_payload() {
    let carrier = test_carrier(128, 128);
    let text: String = (0..400)
        .map(|i| char::from(b'a' + (i % 26) as u8))
        .collect();
    let payload = Payload::Text(text);

    let encoded = encode(&carrier, &payload, None).unwrap();
    assert_eq!(decode(&encoded, None).unwrap(), payload);
}

/// Test that an RGBA carrier round trip also works end to end
#[test]
fn test_roundtrip_in_rgba_carrier() {
    let carrier = random_rgba_carrier(64, 64, 42);
    let payload = Payload::Text("Testing 123".to_string());

    let encoded = encode(&carrier, &payload, None).unwrap();
    assert_eq!(decode(&encoded, None).unwrap(), payload);
}
