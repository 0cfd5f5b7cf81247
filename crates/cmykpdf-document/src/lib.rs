// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// cmykpdf-document — The image to CMYK PDF pipeline.
//
// Provides source image loading, RGB to CMYK conversion, CMYK JPEG encoding,
// page geometry resolution, document assembly, PDF serialization/inspection,
// and the `Converter` that drives one batch end to end.

pub mod color;
pub mod convert;
pub mod encode;
pub mod geometry;
pub mod output;
pub mod pdf;
pub mod source;

// Re-export the primary structs so callers can use `cmykpdf_document::Converter` etc.
pub use color::{ColorConverter, PrintPixelBuffer};
pub use convert::{Converter, convert};
pub use encode::{EncodedImageStream, PrintImageEncoder};
pub use geometry::PageGeometryResolver;
pub use pdf::{DocumentAssembler, PdfReader, PdfWriter, PrintDocument};
pub use source::{ImageSource, SourceImage};
