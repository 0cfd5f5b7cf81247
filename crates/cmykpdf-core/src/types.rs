// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the cmykpdf conversion pipeline.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ConvertError, ErrorKind};

/// Page size shared by every page of one document, in PDF points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageGeometry {
    pub width: f32,
    pub height: f32,
}

impl PageGeometry {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Both sides strictly positive and finite.
    pub fn is_drawable(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }
}

impl std::fmt::Display for PageGeometry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}pt", self.width, self.height)
    }
}

/// JPEG chroma subsampling ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ChromaSubsampling {
    #[serde(rename = "4:4:4")]
    Yuv444,
    #[serde(rename = "4:2:2")]
    Yuv422,
    #[default]
    #[serde(rename = "4:2:0")]
    Yuv420,
}

impl ChromaSubsampling {
    /// Conventional `J:a:b` notation.
    pub fn ratio(&self) -> &'static str {
        match self {
            Self::Yuv444 => "4:4:4",
            Self::Yuv422 => "4:2:2",
            Self::Yuv420 => "4:2:0",
        }
    }

    /// Horizontal and vertical sampling factors of the full-resolution component.
    pub fn sampling_factors(&self) -> (u8, u8) {
        match self {
            Self::Yuv444 => (1, 1),
            Self::Yuv422 => (2, 1),
            Self::Yuv420 => (2, 2),
        }
    }
}

/// One conversion job as handed over by a surrounding UI, CLI or service.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionRequest {
    /// Source images in page order.
    pub image_paths: Vec<PathBuf>,
    /// Explicit page width in points; `0` means "take it from the first image".
    #[serde(default)]
    pub width: f32,
    /// Explicit page height in points; `0` means "take it from the first image".
    #[serde(default)]
    pub height: f32,
    /// Target directory; the user's downloads folder when absent.
    #[serde(default)]
    pub output_dir: Option<PathBuf>,
    /// Output file name without extension; synthesized when absent.
    #[serde(default)]
    pub base_name: Option<String>,
}

impl ConversionRequest {
    pub fn new<I, P>(image_paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            image_paths: image_paths.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    pub fn with_page_size(mut self, width: f32, height: f32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(dir.into());
        self
    }

    pub fn with_base_name(mut self, name: impl Into<String>) -> Self {
        self.base_name = Some(name.into());
        self
    }
}

/// Failure detail carried by a `ConversionResult`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionFailure {
    pub kind: ErrorKind,
    pub message: String,
}

/// Outcome of one conversion call. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionResult {
    pub success: bool,
    pub error: Option<ConversionFailure>,
    pub file_path: Option<PathBuf>,
}

impl ConversionResult {
    pub fn succeeded(path: impl Into<PathBuf>) -> Self {
        Self {
            success: true,
            error: None,
            file_path: Some(path.into()),
        }
    }

    pub fn failed(err: &ConvertError) -> Self {
        Self {
            success: false,
            error: Some(ConversionFailure {
                kind: err.kind(),
                message: err.to_string(),
            }),
            file_path: None,
        }
    }

    pub fn file_path(&self) -> Option<&Path> {
        self.file_path.as_deref()
    }

    pub fn error_kind(&self) -> Option<ErrorKind> {
        self.error.as_ref().map(|failure| failure.kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn result_serializes_with_camel_case_fields() {
        let result = ConversionResult::succeeded("/tmp/out.pdf");
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["filePath"], "/tmp/out.pdf");
        assert!(json["error"].is_null());
    }

    #[test]
    fn failed_result_carries_kind_and_message() {
        let err = ConvertError::Input("no images supplied".into());
        let result = ConversionResult::failed(&err);
        assert!(!result.success);
        assert_eq!(result.error_kind(), Some(ErrorKind::Input));
        assert!(result.file_path().is_none());
        assert!(result.error.unwrap().message.contains("no images supplied"));
    }

    #[test]
    fn request_deserializes_with_defaults() {
        let request: ConversionRequest =
            serde_json::from_str(r#"{"imagePaths": ["a.png", "b.jpg"]}"#).unwrap();
        assert_eq!(request.image_paths.len(), 2);
        assert_eq!(request.width, 0.0);
        assert!(request.base_name.is_none());
    }

    #[test]
    fn subsampling_420_is_default() {
        assert_eq!(ChromaSubsampling::default().ratio(), "4:2:0");
        assert_eq!(ChromaSubsampling::Yuv420.sampling_factors(), (2, 2));
    }

    #[test]
    fn zero_geometry_is_not_drawable() {
        assert!(!PageGeometry::new(0.0, 10.0).is_drawable());
        assert!(!PageGeometry::new(f32::NAN, 10.0).is_drawable());
        assert!(PageGeometry::new(595.0, 842.0).is_drawable());
    }
}
