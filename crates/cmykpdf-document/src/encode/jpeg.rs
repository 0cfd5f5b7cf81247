// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// CMYK JPEG encoding using `jpeg-encoder`.
//
// The encoder writes Adobe-style CMYK (samples stored inverted, transform 0).
// After encoding, the JFIF and Adobe segments are normalised so the stream
// header always declares the configured density and the Adobe marker.

use cmykpdf_core::error::{ConvertError, Result};
use cmykpdf_core::{ChromaSubsampling, ConvertConfig};
use jpeg_encoder::{ColorType, Density, Encoder, SamplingFactor};
use tracing::{debug, instrument};

use super::markers::{self, DENSITY_UNIT_DPI, JpegHeader};
use crate::color::cmyk::{CMYK_CHANNELS, PrintPixelBuffer};

/// Color encoding of a JPEG stream, as declared by its frame header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorEncoding {
    Gray,
    Rgb,
    /// Four-channel subtractive print color.
    Cmyk,
}

impl ColorEncoding {
    fn from_component_count(count: usize) -> Option<Self> {
        match count {
            1 => Some(Self::Gray),
            3 => Some(Self::Rgb),
            4 => Some(Self::Cmyk),
            _ => None,
        }
    }

    pub fn channels(&self) -> u8 {
        match self {
            Self::Gray => 1,
            Self::Rgb => 3,
            Self::Cmyk => 4,
        }
    }

    /// Name of the matching PDF device color space.
    pub fn pdf_color_space(&self) -> &'static str {
        match self {
            Self::Gray => "DeviceGray",
            Self::Rgb => "DeviceRGB",
            Self::Cmyk => "DeviceCMYK",
        }
    }
}

/// A compressed image ready to be embedded as a PDF image XObject.
///
/// All metadata is read back from the stream's own header, so it always
/// describes the bytes actually embedded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImageStream {
    data: Vec<u8>,
    width: u32,
    height: u32,
    encoding: ColorEncoding,
    subsampling: ChromaSubsampling,
    density_dpi: Option<u16>,
    adobe: bool,
}

impl EncodedImageStream {
    /// Wrap an existing baseline/progressive JPEG.
    pub fn from_jpeg(data: Vec<u8>) -> Result<Self> {
        let header = JpegHeader::parse(&data)?;
        let encoding = ColorEncoding::from_component_count(header.component_count())
            .ok_or_else(|| {
                ConvertError::Encode(format!(
                    "JPEG with {} components cannot be embedded",
                    header.component_count()
                ))
            })?;
        if header.width == 0 || header.height == 0 {
            return Err(ConvertError::Encode("JPEG frame has zero size".into()));
        }

        let ratio = header.subsampling_ratio();
        let subsampling = [ChromaSubsampling::Yuv420, ChromaSubsampling::Yuv422]
            .into_iter()
            .find(|candidate| Some(candidate.sampling_factors()) == ratio)
            .unwrap_or(ChromaSubsampling::Yuv444);
        let density_dpi = header
            .density
            .filter(|d| d.unit == DENSITY_UNIT_DPI)
            .map(|d| d.x);

        Ok(Self {
            width: header.width as u32,
            height: header.height as u32,
            encoding,
            subsampling,
            density_dpi,
            adobe: header.adobe_transform.is_some(),
            data,
        })
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn channels(&self) -> u8 {
        self.encoding.channels()
    }

    pub fn encoding(&self) -> ColorEncoding {
        self.encoding
    }

    pub fn subsampling(&self) -> ChromaSubsampling {
        self.subsampling
    }

    pub fn density_dpi(&self) -> Option<u16> {
        self.density_dpi
    }

    /// CMYK data written with an Adobe APP14 marker, i.e. stored inverted.
    pub fn is_adobe_cmyk(&self) -> bool {
        self.adobe && self.encoding == ColorEncoding::Cmyk
    }
}

/// Compresses CMYK pixel buffers into tagged JPEG streams.
#[derive(Debug, Clone)]
pub struct PrintImageEncoder {
    quality: u8,
    density_dpi: u16,
    subsampling: ChromaSubsampling,
}

impl Default for PrintImageEncoder {
    fn default() -> Self {
        Self::from_config(&ConvertConfig::default())
    }
}

impl PrintImageEncoder {
    pub fn new(quality: u8, density_dpi: u16, subsampling: ChromaSubsampling) -> Self {
        Self {
            quality: quality.clamp(1, 100),
            density_dpi,
            subsampling,
        }
    }

    pub fn from_config(config: &ConvertConfig) -> Self {
        Self::new(
            config.jpeg_quality,
            config.density_dpi,
            config.chroma_subsampling,
        )
    }

    /// Encode a CMYK buffer. The buffer is consumed.
    #[instrument(skip_all, fields(width = pixels.width(), height = pixels.height()))]
    pub fn encode(&self, pixels: PrintPixelBuffer) -> Result<EncodedImageStream> {
        if pixels.channels() != CMYK_CHANNELS {
            return Err(ConvertError::Encode(format!(
                "expected {} channels, got {}",
                CMYK_CHANNELS,
                pixels.channels()
            )));
        }

        let expected = pixels.width() as usize * pixels.height() as usize * CMYK_CHANNELS as usize;
        if pixels.samples().len() != expected {
            return Err(ConvertError::Encode(format!(
                "buffer holds {} samples, expected {}",
                pixels.samples().len(),
                expected
            )));
        }

        let width = jpeg_dimension(pixels.width(), "width")?;
        let height = jpeg_dimension(pixels.height(), "height")?;

        let mut jpeg = Vec::new();
        let mut encoder = Encoder::new(&mut jpeg, self.quality);
        encoder.set_sampling_factor(sampling_factor(self.subsampling));
        encoder.set_density(Density::Inch {
            x: self.density_dpi,
            y: self.density_dpi,
        });
        encoder
            .encode(pixels.samples(), width, height, ColorType::Cmyk)
            .map_err(|err| ConvertError::Encode(format!("CMYK JPEG encoding failed: {}", err)))?;

        let tagged = markers::tag_cmyk_stream(&jpeg, self.density_dpi)?;
        let stream = EncodedImageStream::from_jpeg(tagged)?;
        if stream.encoding() != ColorEncoding::Cmyk {
            return Err(ConvertError::Encode(format!(
                "encoder produced {:?} instead of CMYK",
                stream.encoding()
            )));
        }

        debug!(
            bytes = stream.data().len(),
            quality = self.quality,
            subsampling = stream.subsampling().ratio(),
            "CMYK JPEG encoded"
        );
        Ok(stream)
    }
}

fn jpeg_dimension(value: u32, what: &str) -> Result<u16> {
    u16::try_from(value)
        .ok()
        .filter(|v| *v > 0)
        .ok_or_else(|| {
            ConvertError::Encode(format!(
                "image {} {} is outside the JPEG range 1..=65535",
                what, value
            ))
        })
}

fn sampling_factor(subsampling: ChromaSubsampling) -> SamplingFactor {
    match subsampling {
        ChromaSubsampling::Yuv444 => SamplingFactor::R_4_4_4,
        ChromaSubsampling::Yuv422 => SamplingFactor::R_4_2_2,
        ChromaSubsampling::Yuv420 => SamplingFactor::R_4_2_0,
    }
}
