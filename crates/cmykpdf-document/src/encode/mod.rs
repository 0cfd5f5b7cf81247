// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Encode module — CMYK JPEG encoding and JPEG header inspection/tagging.

pub mod jpeg;
pub mod markers;

pub use jpeg::{ColorEncoding, EncodedImageStream, PrintImageEncoder};
pub use markers::JpegHeader;
