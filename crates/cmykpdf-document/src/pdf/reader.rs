// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF reader — open an existing PDF with `lopdf` and report, page by page,
// the media box, rotation and the image XObjects it paints.

use std::path::Path;

use cmykpdf_core::error::{ConvertError, Result};
use lopdf::{Dictionary, Document, Object, Stream};
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

/// One image XObject referenced from a page's resources.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageSummary {
    /// Resource name, e.g. `Im0`.
    pub name: String,
    pub width: u32,
    pub height: u32,
    pub color_space: String,
    pub filter: String,
    pub bits_per_component: u8,
    /// `/Decode [1 0 1 0 ...]`, i.e. samples are stored inverted.
    pub inverted_decode: bool,
    /// Raw (still encoded) stream bytes.
    #[serde(skip)]
    pub data: Vec<u8>,
}

/// What a page looks like from the outside.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageSummary {
    /// 1-indexed page number.
    pub number: u32,
    pub media_box: [f32; 4],
    pub rotation: i64,
    pub images: Vec<ImageSummary>,
}

/// Reads existing PDF files for inspection.
pub struct PdfReader {
    document: Document,
    /// Source path, if opened from a file.
    source_path: Option<String>,
}

impl PdfReader {
    /// Open a PDF from the filesystem.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path_ref = path.as_ref();
        info!("Opening PDF: {}", path_ref.display());

        let document = Document::load(path_ref).map_err(|err| {
            ConvertError::Input(format!("failed to open {}: {}", path_ref.display(), err))
        })?;

        debug!(pages = document.get_pages().len(), "PDF loaded");

        Ok(Self {
            document,
            source_path: Some(path_ref.display().to_string()),
        })
    }

    /// Create a reader from raw PDF bytes already in memory.
    #[instrument(skip_all, fields(bytes_len = data.len()))]
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let document = Document::load_mem(data).map_err(|err| {
            ConvertError::Serialize(format!("failed to load PDF from memory: {}", err))
        })?;

        debug!(pages = document.get_pages().len(), "PDF loaded from bytes");

        Ok(Self {
            document,
            source_path: None,
        })
    }

    pub fn page_count(&self) -> usize {
        self.document.get_pages().len()
    }

    /// Return the source path if the reader was created via [`PdfReader::open`].
    pub fn source_path(&self) -> Option<&str> {
        self.source_path.as_deref()
    }

    /// PDF header version, e.g. `1.7`.
    pub fn version(&self) -> &str {
        &self.document.version
    }

    /// Summarise every page in order.
    pub fn pages(&self) -> Result<Vec<PageSummary>> {
        self.document
            .get_pages()
            .into_iter()
            .map(|(number, page_id)| {
                let page = self.document.get_dictionary(page_id).map_err(|err| {
                    ConvertError::Serialize(format!("page {} is unreadable: {}", number, err))
                })?;
                self.summarise_page(number, page)
            })
            .collect()
    }

    fn summarise_page(&self, number: u32, page: &Dictionary) -> Result<PageSummary> {
        let media_box = self
            .entry(page, b"MediaBox")
            .and_then(|object| match object {
                Object::Array(values) if values.len() == 4 => {
                    let mut rect = [0.0; 4];
                    for (slot, value) in rect.iter_mut().zip(values) {
                        *slot = value.as_float().ok()?;
                    }
                    Some(rect)
                }
                _ => None,
            })
            .ok_or_else(|| {
                ConvertError::Serialize(format!("page {} has no usable /MediaBox", number))
            })?;

        let rotation = self
            .entry(page, b"Rotate")
            .and_then(|object| object.as_i64().ok())
            .unwrap_or(0);

        let mut images = Vec::new();
        let xobjects = self
            .entry(page, b"Resources")
            .and_then(|resources| resources.as_dict().ok())
            .and_then(|resources| self.entry(resources, b"XObject"))
            .and_then(|xobjects| xobjects.as_dict().ok());
        if let Some(xobjects) = xobjects {
            for (name, value) in xobjects.iter() {
                match self.resolve(value) {
                    Some(Object::Stream(stream)) if is_image(stream) => {
                        images.push(summarise_image(name, stream));
                    }
                    _ => warn!(page = number, "Skipping non-image XObject"),
                }
            }
        }

        Ok(PageSummary {
            number,
            media_box,
            rotation,
            images,
        })
    }

    fn entry<'a>(&'a self, dict: &'a Dictionary, key: &[u8]) -> Option<&'a Object> {
        dict.get(key).ok().and_then(|object| self.resolve(object))
    }

    /// Follow indirect references.
    fn resolve<'a>(&'a self, object: &'a Object) -> Option<&'a Object> {
        match object {
            Object::Reference(id) => self.document.get_object(*id).ok(),
            direct => Some(direct),
        }
    }
}

fn is_image(stream: &Stream) -> bool {
    matches!(stream.dict.get(b"Subtype"), Ok(Object::Name(name)) if name == b"Image")
}

fn summarise_image(name: &[u8], stream: &Stream) -> ImageSummary {
    let dict = &stream.dict;
    let name_of = |key: &[u8]| match dict.get(key) {
        Ok(Object::Name(value)) => String::from_utf8_lossy(value).into_owned(),
        _ => String::new(),
    };
    let int_of = |key: &[u8]| dict.get(key).ok().and_then(|v| v.as_i64().ok());

    let inverted_decode = match dict.get(b"Decode") {
        Ok(Object::Array(values)) => {
            !values.is_empty()
                && values.chunks(2).all(|pair| {
                    matches!(
                        (pair[0].as_float(), pair.get(1).map(|v| v.as_float())),
                        (Ok(lo), Some(Ok(hi))) if lo == 1.0 && hi == 0.0
                    )
                })
        }
        _ => false,
    };

    ImageSummary {
        name: String::from_utf8_lossy(name).into_owned(),
        width: int_of(b"Width").and_then(|v| u32::try_from(v).ok()).unwrap_or(0),
        height: int_of(b"Height").and_then(|v| u32::try_from(v).ok()).unwrap_or(0),
        color_space: name_of(b"ColorSpace"),
        filter: name_of(b"Filter"),
        bits_per_component: int_of(b"BitsPerComponent")
            .and_then(|v| u8::try_from(v).ok())
            .unwrap_or(0),
        inverted_decode,
        data: stream.content.clone(),
    }
}
