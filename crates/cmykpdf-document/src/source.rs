// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Source images — header probing, full decoding, and folder listing for the
// files a surrounding UI hands to the converter.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use cmykpdf_core::error::{ConvertError, Result};
use image::{DynamicImage, ImageReader};
use serde::Serialize;
use tracing::{debug, instrument, warn};

/// File extensions accepted when importing a whole folder.
pub const IMAGE_EXTENSIONS: &[&str] = &[
    "jpg", "jpeg", "png", "gif", "bmp", "tiff", "tif", "webp", "ico",
];

/// A source image on disk. Pixels are only decoded on request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceImage {
    path: PathBuf,
}

impl SourceImage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read only as much of the file as is needed to learn its pixel size.
    #[instrument(skip_all, fields(path = %self.path.display()))]
    pub fn dimensions(&self) -> Result<(u32, u32)> {
        let (width, height) = self.reader()?.into_dimensions().map_err(|err| {
            ConvertError::Decode(format!(
                "cannot read image header of {}: {}",
                self.path.display(),
                err
            ))
        })?;
        debug!(width, height, "Image header probed");
        Ok((width, height))
    }

    /// Fully decode the image.
    #[instrument(skip_all, fields(path = %self.path.display()))]
    pub fn decode(&self) -> Result<DynamicImage> {
        let image = self.reader()?.decode().map_err(|err| {
            ConvertError::Decode(format!("failed to decode {}: {}", self.path.display(), err))
        })?;
        if image.width() == 0 || image.height() == 0 {
            return Err(ConvertError::Decode(format!(
                "{} has zero width or height",
                self.path.display()
            )));
        }
        debug!(
            width = image.width(),
            height = image.height(),
            color = ?image.color(),
            "Image decoded"
        );
        Ok(image)
    }

    /// Open the file and sniff its format from the leading bytes, falling back
    /// to the extension.
    fn reader(&self) -> Result<ImageReader<std::io::BufReader<std::fs::File>>> {
        ImageReader::open(&self.path)
            .and_then(|reader| reader.with_guessed_format())
            .map_err(|err| {
                ConvertError::Input(format!("cannot open {}: {}", self.path.display(), err))
            })
    }
}

/// File details a list UI shows for each selected image.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceFileInfo {
    pub name: String,
    pub size: u64,
    pub path: PathBuf,
    pub directory: PathBuf,
    pub modified_at: Option<DateTime<Utc>>,
}

/// Filesystem helpers for picking source images.
pub struct ImageSource;

impl ImageSource {
    /// Whether `path` carries one of the accepted image extensions.
    pub fn has_image_extension(path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| {
                let lower = ext.to_ascii_lowercase();
                IMAGE_EXTENSIONS.contains(&lower.as_str())
            })
            .unwrap_or(false)
    }

    /// List the image files directly inside `dir`, sorted by file name.
    #[instrument(skip_all, fields(dir = %dir.as_ref().display()))]
    pub fn list_folder(dir: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
        let dir = dir.as_ref();
        let entries = std::fs::read_dir(dir).map_err(|err| {
            ConvertError::Input(format!("cannot read folder {}: {}", dir.display(), err))
        })?;

        let mut images = Vec::new();
        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    warn!(%err, "Skipping unreadable directory entry");
                    continue;
                }
            };
            let path = entry.path();
            if path.is_file() && Self::has_image_extension(&path) {
                images.push(path);
            }
        }
        images.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

        debug!(count = images.len(), "Folder listed");
        Ok(images)
    }

    /// Collect name, size and timestamps for one file.
    pub fn describe(path: impl AsRef<Path>) -> Result<SourceFileInfo> {
        let path = path.as_ref();
        let metadata = std::fs::metadata(path).map_err(|err| {
            ConvertError::Input(format!("cannot stat {}: {}", path.display(), err))
        })?;

        Ok(SourceFileInfo {
            name: path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default(),
            size: metadata.len(),
            path: path.to_path_buf(),
            directory: path.parent().map(Path::to_path_buf).unwrap_or_default(),
            modified_at: metadata.modified().ok().map(DateTime::<Utc>::from),
        })
    }
}
