// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Document assembly — one full-bleed page per encoded image, in input order.

use cmykpdf_core::PageGeometry;
use cmykpdf_core::error::{ConvertError, Result};
use tracing::debug;

use crate::encode::EncodedImageStream;

/// Where an image is drawn on its page, in points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// A single page holding exactly one image that covers it completely.
#[derive(Debug, Clone)]
pub struct Page {
    geometry: PageGeometry,
    image: EncodedImageStream,
}

impl Page {
    pub fn geometry(&self) -> PageGeometry {
        self.geometry
    }

    pub fn image(&self) -> &EncodedImageStream {
        &self.image
    }

    /// Pages are never rotated.
    pub fn rotation(&self) -> i64 {
        0
    }

    /// The image is stretched over the whole page from the origin.
    pub fn placement(&self) -> Placement {
        Placement {
            x: 0.0,
            y: 0.0,
            width: self.geometry.width,
            height: self.geometry.height,
        }
    }
}

/// The in-memory document: pages in input order.
#[derive(Debug, Clone)]
pub struct PrintDocument {
    pages: Vec<Page>,
}

impl PrintDocument {
    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }
}

pub struct DocumentAssembler;

impl DocumentAssembler {
    /// Build one page per stream. Every page gets the same geometry.
    pub fn assemble(
        geometry: PageGeometry,
        streams: Vec<EncodedImageStream>,
    ) -> Result<PrintDocument> {
        if streams.is_empty() {
            return Err(ConvertError::Assemble("document would have no pages".into()));
        }
        if !geometry.is_drawable() {
            return Err(ConvertError::Assemble(format!(
                "page size {} is not drawable",
                geometry
            )));
        }

        let pages: Vec<Page> = streams
            .into_iter()
            .map(|image| Page { geometry, image })
            .collect();

        debug!(pages = pages.len(), %geometry, "Document assembled");
        Ok(PrintDocument { pages })
    }
}
