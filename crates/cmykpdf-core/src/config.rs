// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Conversion settings.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ChromaSubsampling;
use crate::error::{ConvertError, Result};

/// Encoder and document settings applied to every conversion run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConvertConfig {
    /// JPEG quality for the embedded CMYK streams (1-100).
    pub jpeg_quality: u8,
    /// Density written into each JPEG header, in dots per inch.
    pub density_dpi: u16,
    /// Chroma subsampling used by the JPEG encoder.
    pub chroma_subsampling: ChromaSubsampling,
    /// Spread per-image work across a rayon worker pool.
    pub parallel: bool,
    /// Optional `/Title` for the PDF info dictionary.
    pub title: Option<String>,
    /// `/Producer` and `/Creator` value.
    pub producer: String,
    /// Prefix for synthesized output names.
    pub default_base_name_prefix: String,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            jpeg_quality: 80,
            density_dpi: 72,
            chroma_subsampling: ChromaSubsampling::Yuv420,
            parallel: true,
            title: None,
            producer: "cmykpdf".to_string(),
            default_base_name_prefix: "img2pdf".to_string(),
        }
    }
}

impl ConvertConfig {
    /// Load settings from a JSON file. Missing keys fall back to defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref()).map_err(|err| {
            ConvertError::Config(format!("cannot read {}: {}", path.as_ref().display(), err))
        })?;
        let config: Self = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !(1..=100).contains(&self.jpeg_quality) {
            return Err(ConvertError::Config(format!(
                "jpeg_quality must be within 1..=100, got {}",
                self.jpeg_quality
            )));
        }
        if self.density_dpi == 0 {
            return Err(ConvertError::Config("density_dpi must be non-zero".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_match_print_profile() {
        let config = ConvertConfig::default();
        assert_eq!(config.density_dpi, 72);
        assert_eq!(config.chroma_subsampling, ChromaSubsampling::Yuv420);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn load_fills_missing_keys() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"jpeg_quality": 95, "parallel": false}}"#).unwrap();

        let config = ConvertConfig::load(file.path()).unwrap();
        assert_eq!(config.jpeg_quality, 95);
        assert!(!config.parallel);
        assert_eq!(config.density_dpi, 72);
    }

    #[test]
    fn load_rejects_out_of_range_quality() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"jpeg_quality": 0}}"#).unwrap();

        let err = ConvertConfig::load(file.path()).unwrap_err();
        assert!(matches!(err, ConvertError::Config(_)));
    }
}
