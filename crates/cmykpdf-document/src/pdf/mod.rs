// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF module — page assembly, serialization, and inspection of produced files.

pub mod assemble;
pub mod reader;
pub mod writer;

pub use assemble::{DocumentAssembler, Page, PrintDocument};
pub use reader::{ImageSummary, PageSummary, PdfReader};
pub use writer::PdfWriter;
