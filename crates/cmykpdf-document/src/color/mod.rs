// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Color module — alpha flattening and RGB to CMYK conversion.

pub mod cmyk;

pub use cmyk::{CmykTransform, ColorConverter, GrayComponentReplacement, PrintPixelBuffer};
