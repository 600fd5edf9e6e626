//! Pixel raster representation and the block transform.
//!
//! A [`Raster`] is an in-memory grid of 8-bit channel samples in row-major,
//! channel-minor (interleaved) order. The block transform reshapes a
//! raster's least significant bits into fixed-size blocks for the embedding
//! codec and back:
//!
//! - the alpha channel, when present, never carries payload bits
//! - trailing samples that do not fill a complete block are ignored
//! - reconstruction zero-pads the tail back to the full raster size
//!
//! Conversions to and from [`image::DynamicImage`] live here as well so the
//! rest of the crate never touches the image crate directly.

use image::{DynamicImage, ImageBuffer};
use thiserror::Error;

/// Errors from constructing or converting rasters.
#[derive(Error, Debug)]
pub enum RasterError {
    #[error("unsupported channel count {0} (expected 3 or 4)")]
    UnsupportedChannels(u8),

    #[error("sample buffer holds {actual} bytes, expected {expected}")]
    SampleCountMismatch { expected: usize, actual: usize },
}

/// An owned pixel buffer: `width x height` pixels of `channels` samples.
///
/// `channels` is 3 (RGB) or 4 (RGBA); channel `channels - 1` is alpha
/// when there are 4.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Raster {
    width: u32,
    height: u32,
    channels: u8,
    samples: Vec<u8>,
}

impl Raster {
    /// Creates a raster, validating the channel count and buffer size.
    pub fn new(width: u32, height: u32, channels: u8, samples: Vec<u8>) -> Result<Self, RasterError> {
        if channels != 3 && channels != 4 {
            return Err(RasterError::UnsupportedChannels(channels));
        }
        let expected = width as usize * height as usize * channels as usize;
        if samples.len() != expected {
            return Err(RasterError::SampleCountMismatch {
                expected,
                actual: samples.len(),
            });
        }
        Ok(Self {
            width,
            height,
            channels,
            samples,
        })
    }

    /// Internal constructor for buffers built to size by this crate.
    pub(crate) fn from_parts(width: u32, height: u32, channels: u8, samples: Vec<u8>) -> Self {
        debug_assert!(channels == 3 || channels == 4);
        debug_assert_eq!(
            samples.len(),
            width as usize * height as usize * channels as usize
        );
        Self {
            width,
            height,
            channels,
            samples,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn channels(&self) -> u8 {
        self.channels
    }

    pub fn samples(&self) -> &[u8] {
        &self.samples
    }

    pub fn has_alpha(&self) -> bool {
        self.channels == 4
    }

    /// Number of payload-carrying channels per pixel (alpha excluded).
    pub fn depth(&self) -> u8 {
        if self.has_alpha() {
            self.channels - 1
        } else {
            self.channels
        }
    }

    /// Total number of samples that may carry payload bits.
    pub fn payload_sample_count(&self) -> usize {
        self.width as usize * self.height as usize * self.depth() as usize
    }

    /// Converts a decoded image into a raster.
    ///
    /// Images with an alpha channel become 4-channel rasters, everything
    /// else is flattened to RGB.
    pub fn from_image(image: &DynamicImage) -> Self {
        if image.color().has_alpha() {
            let buffer = image.to_rgba8();
            let (width, height) = buffer.dimensions();
            Self::from_parts(width, height, 4, buffer.into_raw())
        } else {
            let buffer = image.to_rgb8();
            let (width, height) = buffer.dimensions();
            Self::from_parts(width, height, 3, buffer.into_raw())
        }
    }

    /// Converts the raster back into an image for saving or display.
    pub fn to_image(&self) -> DynamicImage {
        if self.has_alpha() {
            let buffer = ImageBuffer::from_raw(self.width, self.height, self.samples.clone())
                .expect("sample buffer matches raster dimensions");
            DynamicImage::ImageRgba8(buffer)
        } else {
            let buffer = ImageBuffer::from_raw(self.width, self.height, self.samples.clone())
                .expect("sample buffer matches raster dimensions");
            DynamicImage::ImageRgb8(buffer)
        }
    }

    /// The least significant bit of every payload sample, flattened in
    /// row-major, channel-minor order. Alpha samples are skipped.
    pub fn lsb_bits(&self) -> Vec<u8> {
        let channels = self.channels as usize;
        let depth = self.depth() as usize;
        let mut bits = Vec::with_capacity(self.payload_sample_count());
        for (i, &sample) in self.samples.iter().enumerate() {
            if i % channels >= depth {
                continue;
            }
            bits.push(sample & 1);
        }
        bits
    }

    /// A copy with every payload sample's LSB scaled to 0 or 255, for
    /// eyeballing an embedding. Alpha is carried over unchanged.
    pub fn lsb_plane(&self) -> Raster {
        let channels = self.channels as usize;
        let depth = self.depth() as usize;
        let samples = self
            .samples
            .iter()
            .enumerate()
            .map(|(i, &sample)| {
                if i % channels >= depth {
                    sample
                } else {
                    (sample & 1) * 255
                }
            })
            .collect();
        Raster::from_parts(self.width, self.height, self.channels, samples)
    }
}

/// A bit sequence grouped into fixed-size blocks.
///
/// `bits.len()` is always an exact multiple of `block_size`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blocks {
    block_size: usize,
    bits: Vec<u8>,
}

impl Blocks {
    pub fn block_size(&self) -> usize {
        self.block_size
    }

    pub fn block_count(&self) -> usize {
        self.bits.len() / self.block_size
    }

    pub fn bits(&self) -> &[u8] {
        &self.bits
    }

    pub fn block(&self, index: usize) -> &[u8] {
        let start = index * self.block_size;
        &self.bits[start..start + self.block_size]
    }

    pub fn block_mut(&mut self, index: usize) -> &mut [u8] {
        let start = index * self.block_size;
        &mut self.bits[start..start + self.block_size]
    }
}

/// Reshapes a raster's payload LSBs into `block_size`-sized blocks.
///
/// Trailing bits that do not fill a complete block are discarded; they
/// never carry payload and are not recoverable from the result.
pub fn to_blocks(raster: &Raster, block_size: usize) -> Blocks {
    let mut bits = raster.lsb_bits();
    bits.truncate((bits.len() / block_size) * block_size);
    Blocks { block_size, bits }
}

/// Flattens blocks back into a raster-sized bit sequence.
///
/// The tail beyond the last block is zero-padded so the result holds
/// exactly `width * height * depth` bits.
pub fn from_blocks(blocks: &Blocks, width: u32, height: u32, depth: u8) -> Vec<u8> {
    let total = width as usize * height as usize * depth as usize;
    let mut bits = blocks.bits().to_vec();
    bits.resize(total, 0);
    bits
}
