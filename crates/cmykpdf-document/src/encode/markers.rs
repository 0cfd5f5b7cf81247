// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// JPEG marker handling — reads the frame header and the JFIF/Adobe application
// segments, and rewrites those segments so every CMYK stream we emit carries
// a 72 dpi density and an Adobe color transform marker.

use cmykpdf_core::error::{ConvertError, Result};

const SOI: u8 = 0xD8;
const SOS: u8 = 0xDA;
const APP0: u8 = 0xE0;
const APP14: u8 = 0xEE;

const JFIF_ID: &[u8] = b"JFIF\0";
const ADOBE_ID: &[u8] = b"Adobe";

/// JFIF density unit code for dots per inch.
pub const DENSITY_UNIT_DPI: u8 = 1;

/// Adobe APP14 transform code: components are stored without color transform.
pub const ADOBE_TRANSFORM_NONE: u8 = 0;

/// Density declared in a JFIF APP0 segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JfifDensity {
    pub unit: u8,
    pub x: u16,
    pub y: u16,
}

/// Per-component sampling factors from the frame header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComponentSampling {
    pub id: u8,
    pub horizontal: u8,
    pub vertical: u8,
}

/// What a renderer can learn from a JPEG stream's own header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JpegHeader {
    pub width: u16,
    pub height: u16,
    pub bits_per_component: u8,
    pub components: Vec<ComponentSampling>,
    pub density: Option<JfifDensity>,
    /// Transform byte of an Adobe APP14 segment, if present.
    pub adobe_transform: Option<u8>,
}

impl JpegHeader {
    /// Parse the segments up to the first scan.
    pub fn parse(data: &[u8]) -> Result<Self> {
        let mut width = None;
        let mut height = 0;
        let mut bits_per_component = 0;
        let mut components = Vec::new();
        let mut density = None;
        let mut adobe_transform = None;

        for segment in Segments::new(data)? {
            let segment = segment?;
            let payload = segment.payload;
            match segment.marker {
                APP0 if payload.starts_with(JFIF_ID) && payload.len() >= 12 => {
                    density = Some(JfifDensity {
                        unit: payload[7],
                        x: u16::from_be_bytes([payload[8], payload[9]]),
                        y: u16::from_be_bytes([payload[10], payload[11]]),
                    });
                }
                APP14 if payload.starts_with(ADOBE_ID) && payload.len() >= 12 => {
                    adobe_transform = Some(payload[11]);
                }
                marker if is_start_of_frame(marker) => {
                    if payload.len() < 6 {
                        return Err(truncated("frame header"));
                    }
                    bits_per_component = payload[0];
                    height = u16::from_be_bytes([payload[1], payload[2]]);
                    width = Some(u16::from_be_bytes([payload[3], payload[4]]));
                    let count = payload[5] as usize;
                    let specs = payload
                        .get(6..6 + count * 3)
                        .ok_or_else(|| truncated("component table"))?;
                    components = specs
                        .chunks_exact(3)
                        .map(|spec| ComponentSampling {
                            id: spec[0],
                            horizontal: spec[1] >> 4,
                            vertical: spec[1] & 0x0F,
                        })
                        .collect();
                }
                SOS => break,
                _ => {}
            }
        }

        let width = width.ok_or_else(|| {
            ConvertError::Encode("JPEG stream has no frame header".into())
        })?;

        Ok(Self {
            width,
            height,
            bits_per_component,
            components,
            density,
            adobe_transform,
        })
    }

    pub fn component_count(&self) -> usize {
        self.components.len()
    }

    /// Horizontal and vertical ratio between the most and least sampled
    /// components, e.g. `(2, 2)` for 4:2:0.
    ///
    /// The full resolution component is not always the first one: CMYK
    /// streams from `jpeg-encoder` sample K at 2x2 and C/M/Y at 1x1.
    pub fn subsampling_ratio(&self) -> Option<(u8, u8)> {
        let h_max = self.components.iter().map(|c| c.horizontal).max()?;
        let h_min = self.components.iter().map(|c| c.horizontal).min()?;
        let v_max = self.components.iter().map(|c| c.vertical).max()?;
        let v_min = self.components.iter().map(|c| c.vertical).min()?;
        if h_min == 0 || v_min == 0 {
            return None;
        }
        Some((h_max / h_min, v_max / v_min))
    }
}

/// Replace any JFIF APP0 and Adobe APP14 segments with our own: a JFIF
/// segment declaring `density_dpi` and an Adobe segment with transform 0.
///
/// All other segments and the entropy-coded data are copied unchanged.
pub fn tag_cmyk_stream(data: &[u8], density_dpi: u16) -> Result<Vec<u8>> {
    let mut kept: Vec<&[u8]> = Vec::new();
    let mut scan_start = None;

    for segment in Segments::new(data)? {
        let segment = segment?;
        if segment.marker == SOS {
            scan_start = Some(segment.offset);
            break;
        }
        let is_jfif = segment.marker == APP0 && segment.payload.starts_with(JFIF_ID);
        let is_adobe = segment.marker == APP14 && segment.payload.starts_with(ADOBE_ID);
        if !is_jfif && !is_adobe {
            kept.push(segment.raw);
        }
    }

    let scan_start =
        scan_start.ok_or_else(|| ConvertError::Encode("JPEG stream has no scan".into()))?;

    let mut out = Vec::with_capacity(data.len() + 32);
    out.extend_from_slice(&[0xFF, SOI]);
    out.extend_from_slice(&jfif_segment(density_dpi));
    out.extend_from_slice(&adobe_segment(ADOBE_TRANSFORM_NONE));
    for raw in kept {
        out.extend_from_slice(raw);
    }
    out.extend_from_slice(&data[scan_start..]);
    Ok(out)
}

fn jfif_segment(density_dpi: u16) -> Vec<u8> {
    let [dx_hi, dx_lo] = density_dpi.to_be_bytes();
    let mut segment = vec![0xFF, APP0, 0x00, 0x10];
    segment.extend_from_slice(JFIF_ID);
    segment.extend_from_slice(&[
        0x01, 0x02, // version 1.02
        DENSITY_UNIT_DPI,
        dx_hi, dx_lo,
        dx_hi, dx_lo,
        0x00, 0x00, // no thumbnail
    ]);
    segment
}

fn adobe_segment(transform: u8) -> Vec<u8> {
    let mut segment = vec![0xFF, APP14, 0x00, 0x0E];
    segment.extend_from_slice(ADOBE_ID);
    segment.extend_from_slice(&[
        0x00, 0x64, // DCTEncode version 100
        0x00, 0x00, // flags0
        0x00, 0x00, // flags1
        transform,
    ]);
    segment
}

fn is_start_of_frame(marker: u8) -> bool {
    (0xC0..=0xCF).contains(&marker) && !matches!(marker, 0xC4 | 0xC8 | 0xCC)
}

fn truncated(what: &str) -> ConvertError {
    ConvertError::Encode(format!("JPEG stream truncated in {}", what))
}

/// One marker segment.
struct Segment<'a> {
    marker: u8,
    /// Offset of the segment's 0xFF byte.
    offset: usize,
    /// Marker, length and payload.
    raw: &'a [u8],
    payload: &'a [u8],
}

/// Walks marker segments after SOI. Stops after yielding SOS.
struct Segments<'a> {
    data: &'a [u8],
    pos: usize,
    done: bool,
}

impl<'a> Segments<'a> {
    fn new(data: &'a [u8]) -> Result<Self> {
        if data.len() < 4 || data[0] != 0xFF || data[1] != SOI {
            return Err(ConvertError::Encode("not a JPEG stream (missing SOI)".into()));
        }
        Ok(Self {
            data,
            pos: 2,
            done: false,
        })
    }
}

impl<'a> Iterator for Segments<'a> {
    type Item = Result<Segment<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        // Skip fill bytes between segments.
        while self.data.get(self.pos) == Some(&0xFF) && self.data.get(self.pos + 1) == Some(&0xFF)
        {
            self.pos += 1;
        }

        let offset = self.pos;
        let (Some(&0xFF), Some(&marker)) = (self.data.get(offset), self.data.get(offset + 1)) else {
            self.done = true;
            return if offset >= self.data.len() {
                None
            } else {
                Some(Err(ConvertError::Encode(format!(
                    "expected JPEG marker at offset {}",
                    offset
                ))))
            };
        };

        let Some(length_bytes) = self.data.get(offset + 2..offset + 4) else {
            self.done = true;
            return Some(Err(truncated("segment length")));
        };
        let length = u16::from_be_bytes([length_bytes[0], length_bytes[1]]) as usize;
        let end = offset + 2 + length;
        if length < 2 || end > self.data.len() {
            self.done = true;
            return Some(Err(truncated("segment payload")));
        }

        self.pos = end;
        if marker == SOS {
            self.done = true;
        }

        Some(Ok(Segment {
            marker,
            offset,
            raw: &self.data[offset..end],
            payload: &self.data[offset + 4..end],
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A minimal marker layout: SOI, APP0 (JFIF, 1:1 aspect), SOF0 for a
    /// 4-component 2x3 frame with K at 2x2 and C/M/Y at 1x1, SOS, two bytes
    /// of "entropy data", EOI.
    fn sample_stream() -> Vec<u8> {
        let mut data = vec![0xFF, SOI];
        data.extend_from_slice(&[0xFF, APP0, 0x00, 0x10]);
        data.extend_from_slice(b"JFIF\0");
        data.extend_from_slice(&[1, 1, 0, 0, 1, 0, 1, 0, 0]);
        data.extend_from_slice(&[0xFF, 0xC0, 0x00, 0x14, 8, 0x00, 0x03, 0x00, 0x02, 4]);
        data.extend_from_slice(&[1, 0x11, 0, 2, 0x11, 1, 3, 0x11, 1, 4, 0x22, 1]);
        data.extend_from_slice(&[0xFF, SOS, 0x00, 0x02]);
        data.extend_from_slice(&[0x12, 0x34, 0xFF, 0xD9]);
        data
    }

    #[test]
    fn parses_frame_and_density() {
        let header = JpegHeader::parse(&sample_stream()).unwrap();
        assert_eq!((header.width, header.height), (2, 3));
        assert_eq!(header.component_count(), 4);
        assert_eq!(header.subsampling_ratio(), Some((2, 2)));
        assert_eq!(header.density.map(|d| d.unit), Some(0));
        assert_eq!(header.adobe_transform, None);
    }

    #[test]
    fn tagging_replaces_density_and_adds_adobe_marker() {
        let original = sample_stream();
        let tagged = tag_cmyk_stream(&original, 72).unwrap();
        let header = JpegHeader::parse(&tagged).unwrap();

        assert_eq!(
            header.density,
            Some(JfifDensity {
                unit: DENSITY_UNIT_DPI,
                x: 72,
                y: 72
            })
        );
        assert_eq!(header.adobe_transform, Some(ADOBE_TRANSFORM_NONE));
        assert_eq!(header.component_count(), 4);
        // Scan data is carried over byte for byte.
        assert!(tagged.ends_with(&[0x12, 0x34, 0xFF, 0xD9]));
    }

    #[test]
    fn tagging_twice_is_stable() {
        let once = tag_cmyk_stream(&sample_stream(), 72).unwrap();
        let twice = tag_cmyk_stream(&once, 72).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn ratio_does_not_depend_on_component_order() {
        let sampling = |id, factors: u8| ComponentSampling {
            id,
            horizontal: factors >> 4,
            vertical: factors & 0x0F,
        };
        let mut header = JpegHeader::parse(&sample_stream()).unwrap();

        header.components = vec![sampling(1, 0x21), sampling(2, 0x11), sampling(3, 0x11)];
        assert_eq!(header.subsampling_ratio(), Some((2, 1)));

        header.components = vec![sampling(1, 0x11); 4];
        assert_eq!(header.subsampling_ratio(), Some((1, 1)));

        header.components.clear();
        assert_eq!(header.subsampling_ratio(), None);
    }

    #[test]
    fn rejects_non_jpeg() {
        assert!(JpegHeader::parse(b"\x89PNG\r\n\x1a\n").is_err());
    }

    #[test]
    fn rejects_truncated_segment() {
        let mut data = sample_stream();
        data.truncate(12);
        assert!(JpegHeader::parse(&data).is_err());
    }
}
