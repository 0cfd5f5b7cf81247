// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Conversion orchestration — one batch of images in, one CMYK PDF out.
//
// Pipeline: name + directory -> page geometry -> per-image decode/convert/
// encode (rayon, order preserving) -> assembly -> serialization -> atomic
// write. Nothing is written unless every earlier stage succeeded.

use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use cmykpdf_core::error::{ConvertError, Result};
use cmykpdf_core::{ConversionRequest, ConversionResult, ConvertConfig};
use rayon::prelude::*;
use tracing::{debug, error, info, instrument};

use crate::color::{CmykTransform, ColorConverter, GrayComponentReplacement};
use crate::encode::{EncodedImageStream, PrintImageEncoder};
use crate::geometry::PageGeometryResolver;
use crate::output;
use crate::pdf::{DocumentAssembler, PdfWriter};
use crate::source::SourceImage;

/// Drives a conversion run with a fixed configuration.
///
/// Holds no per-run state; one instance can serve concurrent calls.
pub struct Converter<T = GrayComponentReplacement> {
    config: ConvertConfig,
    colors: ColorConverter<T>,
    encoder: PrintImageEncoder,
    writer: PdfWriter,
}

impl Default for Converter {
    fn default() -> Self {
        Self::new(ConvertConfig::default())
    }
}

impl Converter {
    pub fn new(config: ConvertConfig) -> Self {
        Self::with_transform(config, GrayComponentReplacement)
    }
}

impl<T: CmykTransform> Converter<T> {
    /// Use a custom RGB to CMYK mapping.
    pub fn with_transform(config: ConvertConfig, transform: T) -> Self {
        Self {
            encoder: PrintImageEncoder::from_config(&config),
            writer: PdfWriter::from_config(&config),
            colors: ColorConverter::with_transform(transform),
            config,
        }
    }

    pub fn config(&self) -> &ConvertConfig {
        &self.config
    }

    /// Run one request to completion. Never panics; every failure, including
    /// a panic inside worker code, comes back as a failed result.
    pub fn convert(&self, request: &ConversionRequest) -> ConversionResult {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| self.try_convert(request)))
            .unwrap_or_else(|payload| Err(ConvertError::Convert(panic_message(payload))));

        match outcome {
            Ok(path) => ConversionResult::succeeded(path),
            Err(err) => {
                error!(kind = %err.kind(), %err, "Conversion failed");
                ConversionResult::failed(&err)
            }
        }
    }

    /// Run one request and return the written file's path.
    #[instrument(skip_all, fields(images = request.image_paths.len()))]
    pub fn try_convert(&self, request: &ConversionRequest) -> Result<PathBuf> {
        if request.image_paths.is_empty() {
            return Err(ConvertError::Input("no images supplied".into()));
        }

        let base_name = output::resolve_base_name(
            request.base_name.as_deref(),
            &self.config.default_base_name_prefix,
        );
        let dir = request
            .output_dir
            .clone()
            .unwrap_or_else(output::default_output_dir);
        if !dir.is_dir() {
            return Err(ConvertError::Write(format!(
                "output directory {} does not exist",
                dir.display()
            )));
        }
        info!(
            dir = %dir.display(),
            name = %base_name,
            "Converting images to CMYK PDF"
        );

        let bytes = self.build_pdf(&request.image_paths, request.width, request.height, Utc::now())?;
        output::write_atomically(&dir, &base_name, &bytes)
    }

    /// Everything up to, but not including, the file write.
    pub fn build_pdf<P: AsRef<Path> + Sync>(
        &self,
        paths: &[P],
        width: f32,
        height: f32,
        timestamp: DateTime<Utc>,
    ) -> Result<Vec<u8>> {
        let geometry = PageGeometryResolver::resolve(width, height, paths)?;
        let streams = self.encode_all(paths)?;
        let document = DocumentAssembler::assemble(geometry, streams)?;
        self.writer.write(&document, timestamp)
    }

    /// Encode every image. The result is in input order whatever order the
    /// workers finish in. On failure, the error of the lowest failing index
    /// is returned.
    fn encode_all<P: AsRef<Path> + Sync>(&self, paths: &[P]) -> Result<Vec<EncodedImageStream>> {
        if self.config.parallel {
            let results: Vec<Result<EncodedImageStream>> = paths
                .par_iter()
                .map(|path| self.encode_one(path.as_ref()))
                .collect();
            results.into_iter().collect()
        } else {
            paths
                .iter()
                .map(|path| self.encode_one(path.as_ref()))
                .collect()
        }
    }

    /// Decode, convert and encode a single image.
    pub fn encode_one(&self, path: &Path) -> Result<EncodedImageStream> {
        let image = SourceImage::new(path).decode()?;
        let pixels = self.colors.convert(&image)?;
        drop(image);
        let stream = self.encoder.encode(pixels)?;
        debug!(path = %path.display(), bytes = stream.data().len(), "Image encoded");
        Ok(stream)
    }
}

fn panic_message(payload: Box<dyn std::any::Any + Send>) -> String {
    let detail = payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string());
    format!("internal failure: {}", detail)
}

/// Convert `image_paths` into one CMYK PDF with the default configuration.
///
/// `width`/`height` of `0` take the first image's pixel size. The file lands
/// in `output_dir` (downloads folder when `None`) as `{base_name}.pdf`.
pub fn convert<P: AsRef<Path>>(
    image_paths: &[P],
    width: f32,
    height: f32,
    output_dir: Option<&Path>,
    base_name: Option<&str>,
) -> ConversionResult {
    let mut request = ConversionRequest::new(image_paths.iter().map(|p| p.as_ref().to_path_buf()))
        .with_page_size(width, height);
    request.output_dir = output_dir.map(Path::to_path_buf);
    request.base_name = base_name.map(str::to_string);
    Converter::default().convert(&request)
}
