// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Page geometry — one page size for the whole document, either given
// explicitly or taken from the first image (one pixel per point).

use std::path::Path;

use cmykpdf_core::PageGeometry;
use cmykpdf_core::error::{ConvertError, Result};
use tracing::{debug, info, instrument};

use crate::source::SourceImage;

pub struct PageGeometryResolver;

impl PageGeometryResolver {
    /// Resolve the document-wide page size.
    ///
    /// Non-zero explicit values are used as-is. A zero value is replaced by
    /// the first image's pixel size, read from its header only.
    #[instrument(skip(paths), fields(images = paths.len()))]
    pub fn resolve<P: AsRef<Path>>(width: f32, height: f32, paths: &[P]) -> Result<PageGeometry> {
        for (name, value) in [("width", width), ("height", height)] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConvertError::Input(format!(
                    "page {} must be a non-negative number, got {}",
                    name, value
                )));
            }
        }

        if width > 0.0 && height > 0.0 {
            debug!(width, height, "Using explicit page size");
            return Ok(PageGeometry::new(width, height));
        }

        let first = paths.first().ok_or_else(|| {
            ConvertError::Assemble("no image to take the page size from".into())
        })?;

        let (image_width, image_height) = SourceImage::new(first.as_ref())
            .dimensions()
            .map_err(|err| match err {
                ConvertError::Decode(detail) => ConvertError::Assemble(format!(
                    "cannot size pages from first image: {}",
                    detail
                )),
                other => other,
            })?;

        let geometry = PageGeometry::new(
            if width > 0.0 { width } else { image_width as f32 },
            if height > 0.0 { height } else { image_height as f32 },
        );
        info!(%geometry, "Page size taken from first image");
        Ok(geometry)
    }
}
