// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// RGB to CMYK conversion.
//
// No ICC engine is involved: the default transform is the textbook gray
// component replacement formula
//
//   K = 1 - max(R, G, B)
//   C = (1 - R - K) / (1 - K)   (likewise M from G, Y from B)
//
// with all channels normalised to 0..=1 and C = M = Y = 0 for pure black.
// Transparent pixels are composited over opaque white first.

use cmykpdf_core::error::{ConvertError, Result};
use image::DynamicImage;
use tracing::{debug, instrument};

/// Number of samples per pixel in a print buffer.
pub const CMYK_CHANNELS: u8 = 4;

/// Interleaved 8-bit pixel samples headed for the print encoder.
///
/// Normally holds C, M, Y, K per pixel; the channel count is carried
/// explicitly so the encoder can reject anything else.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrintPixelBuffer {
    width: u32,
    height: u32,
    channels: u8,
    samples: Vec<u8>,
}

impl PrintPixelBuffer {
    /// Wrap raw interleaved samples. No validation happens here.
    pub fn from_raw(width: u32, height: u32, channels: u8, samples: Vec<u8>) -> Self {
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

    /// The four samples of the pixel at (`x`, `y`).
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if self.channels != CMYK_CHANNELS || x >= self.width || y >= self.height {
            return None;
        }
        let offset = (y as usize * self.width as usize + x as usize) * 4;
        let px = self.samples.get(offset..offset + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }
}

/// Maps one opaque RGB pixel to CMYK.
pub trait CmykTransform: Send + Sync {
    fn to_cmyk(&self, rgb: [u8; 3]) -> [u8; 4];
}

/// Full gray component replacement: all shared gray goes to the K channel.
#[derive(Debug, Clone, Copy, Default)]
pub struct GrayComponentReplacement;

impl CmykTransform for GrayComponentReplacement {
    fn to_cmyk(&self, rgb: [u8; 3]) -> [u8; 4] {
        let r = rgb[0] as f32 / 255.0;
        let g = rgb[1] as f32 / 255.0;
        let b = rgb[2] as f32 / 255.0;

        let k = 1.0 - r.max(g).max(b);
        if k >= 1.0 {
            return [0, 0, 0, 255];
        }

        let white = 1.0 - k;
        let c = (1.0 - r - k) / white;
        let m = (1.0 - g - k) / white;
        let y = (1.0 - b - k) / white;

        [to_sample(c), to_sample(m), to_sample(y), to_sample(k)]
    }
}

fn to_sample(value: f32) -> u8 {
    (value * 255.0).round().clamp(0.0, 255.0) as u8
}

/// Composite a straight-alpha channel value over white.
fn over_white(channel: u8, alpha: u8) -> u8 {
    let alpha = alpha as u32;
    ((channel as u32 * alpha + 255 * (255 - alpha) + 127) / 255) as u8
}

/// Converts decoded images into CMYK print buffers.
#[derive(Debug, Clone, Default)]
pub struct ColorConverter<T = GrayComponentReplacement> {
    transform: T,
}

impl ColorConverter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<T: CmykTransform> ColorConverter<T> {
    /// Use a different RGB to CMYK mapping.
    pub fn with_transform(transform: T) -> Self {
        Self { transform }
    }

    /// Convert a decoded image of any supported layout.
    ///
    /// 8-bit gray and RGB layouts (with or without alpha) are read in place;
    /// deeper or float layouts are normalised to 8-bit RGB(A) first.
    #[instrument(skip_all, fields(width = image.width(), height = image.height()))]
    pub fn convert(&self, image: &DynamicImage) -> Result<PrintPixelBuffer> {
        let (width, height) = (image.width(), image.height());
        match image {
            DynamicImage::ImageLuma8(buf) => self.convert_samples(width, height, 1, buf.as_raw()),
            DynamicImage::ImageLumaA8(buf) => self.convert_samples(width, height, 2, buf.as_raw()),
            DynamicImage::ImageRgb8(buf) => self.convert_samples(width, height, 3, buf.as_raw()),
            DynamicImage::ImageRgba8(buf) => self.convert_samples(width, height, 4, buf.as_raw()),
            other if other.color().has_alpha() => {
                let rgba = other.to_rgba8();
                self.convert_samples(width, height, 4, rgba.as_raw())
            }
            other => {
                let rgb = other.to_rgb8();
                self.convert_samples(width, height, 3, rgb.as_raw())
            }
        }
    }

    /// Convert interleaved 8-bit samples.
    ///
    /// `channels` selects the layout: 1 = gray, 2 = gray + alpha, 3 = RGB,
    /// 4 = RGBA. Alpha is flattened against white.
    pub fn convert_samples(
        &self,
        width: u32,
        height: u32,
        channels: u8,
        samples: &[u8],
    ) -> Result<PrintPixelBuffer> {
        if width == 0 || height == 0 {
            return Err(ConvertError::Decode(format!(
                "image has zero size ({}x{})",
                width, height
            )));
        }
        if !(1..=4).contains(&channels) {
            return Err(ConvertError::Convert(format!(
                "unsupported channel layout: {} channels",
                channels
            )));
        }

        let pixel_count = width as usize * height as usize;
        let expected = pixel_count * channels as usize;
        if samples.len() != expected {
            return Err(ConvertError::Convert(format!(
                "pixel data is {} bytes, expected {} for {}x{} with {} channels",
                samples.len(),
                expected,
                width,
                height,
                channels
            )));
        }

        let mut out = Vec::with_capacity(pixel_count * CMYK_CHANNELS as usize);
        for px in samples.chunks_exact(channels as usize) {
            let rgb = match *px {
                [l] => [l, l, l],
                [l, a] => {
                    let l = over_white(l, a);
                    [l, l, l]
                }
                [r, g, b] => [r, g, b],
                [r, g, b, a] => [over_white(r, a), over_white(g, a), over_white(b, a)],
                _ => unreachable!("channel count checked above"),
            };
            out.extend_from_slice(&self.transform.to_cmyk(rgb));
        }

        debug!(width, height, channels, "Converted to CMYK");
        Ok(PrintPixelBuffer::from_raw(width, height, CMYK_CHANNELS, out))
    }
}
