// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF writer — serialise an assembled `PrintDocument` with `lopdf`.
//
// Object layout per page: the page dictionary, one content stream that paints
// the image over the full media box, and one DCT-encoded image XObject whose
// bytes are embedded as-is.

use chrono::{DateTime, Utc};
use cmykpdf_core::ConvertConfig;
use cmykpdf_core::error::{ConvertError, Result};
use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream, StringFormat, dictionary};
use tracing::{debug, info, instrument};

use super::assemble::{Page, PrintDocument};

/// Resource name of the single image on every page.
pub const IMAGE_RESOURCE_NAME: &str = "Im0";

/// Serialises assembled documents to PDF bytes.
#[derive(Debug, Clone)]
pub struct PdfWriter {
    /// `/Producer` and `/Creator` in the info dictionary.
    producer: String,
    /// Optional `/Title`.
    title: Option<String>,
}

impl Default for PdfWriter {
    fn default() -> Self {
        Self::from_config(&ConvertConfig::default())
    }
}

impl PdfWriter {
    pub fn new(producer: impl Into<String>) -> Self {
        Self {
            producer: producer.into(),
            title: None,
        }
    }

    pub fn from_config(config: &ConvertConfig) -> Self {
        Self {
            producer: config.producer.clone(),
            title: config.title.clone(),
        }
    }

    /// Set a title for the PDF metadata.
    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = Some(title.into());
    }

    /// Serialise `document`. The same document and `timestamp` always give
    /// the same bytes.
    #[instrument(skip_all, fields(pages = document.page_count()))]
    pub fn write(&self, document: &PrintDocument, timestamp: DateTime<Utc>) -> Result<Vec<u8>> {
        if document.page_count() == 0 {
            return Err(ConvertError::Serialize(
                "refusing to write a PDF without pages".into(),
            ));
        }

        let mut doc = Document::with_version("1.7");
        let pages_id = doc.new_object_id();

        let mut kids: Vec<Object> = Vec::with_capacity(document.page_count());
        for (index, page) in document.pages().iter().enumerate() {
            let page_id = add_page(&mut doc, pages_id, page)?;
            debug!(page = index + 1, ?page_id, "Page object written");
            kids.push(page_id.into());
        }

        let page_count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => page_count,
            }),
        );

        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        let info_id = doc.add_object(self.info_dictionary(timestamp));

        doc.trailer.set("Root", catalog_id);
        doc.trailer.set("Info", info_id);

        let mut output = Vec::new();
        doc.save_to(&mut output).map_err(|err| {
            ConvertError::Serialize(format!("failed to serialise PDF: {}", err))
        })?;

        info!(
            pages = page_count,
            bytes = output.len(),
            "PDF serialised"
        );
        Ok(output)
    }

    fn info_dictionary(&self, timestamp: DateTime<Utc>) -> Dictionary {
        let date = pdf_date(timestamp);
        let mut info = dictionary! {
            "Producer" => text_string(&self.producer),
            "Creator" => text_string(&self.producer),
            "CreationDate" => Object::string_literal(date.as_str()),
            "ModDate" => Object::string_literal(date.as_str()),
        };
        if let Some(title) = &self.title {
            info.set("Title", text_string(title));
        }
        info
    }
}

/// Add the image, content stream and page dictionary for one page.
fn add_page(doc: &mut Document, pages_id: ObjectId, page: &Page) -> Result<ObjectId> {
    let image = page.image();
    let placement = page.placement();
    let geometry = page.geometry();

    let mut image_dict = dictionary! {
        "Type" => "XObject",
        "Subtype" => "Image",
        "Width" => image.width() as i64,
        "Height" => image.height() as i64,
        "ColorSpace" => image.encoding().pdf_color_space(),
        "BitsPerComponent" => 8,
        "Filter" => "DCTDecode",
    };
    if image.is_adobe_cmyk() {
        // Adobe CMYK JPEGs store each sample inverted.
        let decode: Vec<Object> = [1, 0, 1, 0, 1, 0, 1, 0]
            .into_iter()
            .map(Object::Integer)
            .collect();
        image_dict.set("Decode", decode);
    }
    let image_id =
        doc.add_object(Stream::new(image_dict, image.data().to_vec()).with_compression(false));

    let content = Content {
        operations: vec![
            Operation::new("q", vec![]),
            Operation::new(
                "cm",
                vec![
                    placement.width.into(),
                    0.into(),
                    0.into(),
                    placement.height.into(),
                    placement.x.into(),
                    placement.y.into(),
                ],
            ),
            Operation::new("Do", vec![Object::Name(IMAGE_RESOURCE_NAME.as_bytes().to_vec())]),
            Operation::new("Q", vec![]),
        ],
    };
    let content_bytes = content.encode().map_err(|err| {
        ConvertError::Serialize(format!("failed to encode page content: {}", err))
    })?;
    let content_id = doc.add_object(Stream::new(dictionary! {}, content_bytes));

    let mut xobjects = Dictionary::new();
    xobjects.set(IMAGE_RESOURCE_NAME, image_id);

    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "MediaBox" => vec![
            0.into(),
            0.into(),
            geometry.width.into(),
            geometry.height.into(),
        ],
        "Rotate" => page.rotation(),
        "Resources" => dictionary! {
            "XObject" => xobjects,
        },
        "Contents" => content_id,
    });
    Ok(page_id)
}

/// A PDF text string: a literal for ASCII, UTF-16BE with a byte order mark
/// otherwise.
fn text_string(text: &str) -> Object {
    if text.is_ascii() {
        return Object::string_literal(text);
    }
    let mut bytes = vec![0xFE, 0xFF];
    bytes.extend(text.encode_utf16().flat_map(u16::to_be_bytes));
    Object::String(bytes, StringFormat::Hexadecimal)
}

/// PDF date string (`D:YYYYMMDDHHmmSSZ`).
fn pdf_date(timestamp: DateTime<Utc>) -> String {
    timestamp.format("D:%Y%m%d%H%M%SZ").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::PrintPixelBuffer;
    use crate::encode::PrintImageEncoder;
    use crate::pdf::assemble::DocumentAssembler;
    use crate::pdf::reader::PdfReader;
    use chrono::TimeZone;
    use cmykpdf_core::PageGeometry;

    fn document(pages: usize, geometry: PageGeometry) -> PrintDocument {
        let encoder = PrintImageEncoder::default();
        let streams = (0..pages)
            .map(|i| {
                let k = (i * 60) as u8;
                let samples = [0, 0, 0, k].iter().copied().cycle().take(3 * 2 * 4).collect();
                encoder
                    .encode(PrintPixelBuffer::from_raw(3, 2, 4, samples))
                    .unwrap()
            })
            .collect();
        DocumentAssembler::assemble(geometry, streams).unwrap()
    }

    fn fixed_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap()
    }

    #[test]
    fn writes_one_cmyk_image_per_page() {
        let doc = document(3, PageGeometry::new(300.0, 200.0));
        let bytes = PdfWriter::default().write(&doc, fixed_time()).unwrap();

        let reader = PdfReader::from_bytes(&bytes).unwrap();
        assert_eq!(reader.page_count(), 3);
        for summary in reader.pages().unwrap() {
            assert_eq!(summary.media_box, [0.0, 0.0, 300.0, 200.0]);
            assert_eq!(summary.rotation, 0);
            assert_eq!(summary.images.len(), 1);
            let image = &summary.images[0];
            assert_eq!(image.color_space, "DeviceCMYK");
            assert_eq!(image.filter, "DCTDecode");
            assert_eq!((image.width, image.height), (3, 2));
            assert!(image.inverted_decode);
        }
    }

    #[test]
    fn embeds_stream_bytes_unchanged() {
        let doc = document(2, PageGeometry::new(10.0, 10.0));
        let bytes = PdfWriter::default().write(&doc, fixed_time()).unwrap();

        let pages = PdfReader::from_bytes(&bytes).unwrap().pages().unwrap();
        for (page, summary) in doc.pages().iter().zip(&pages) {
            assert_eq!(summary.images[0].data, page.image().data());
        }
    }

    #[test]
    fn output_is_deterministic_for_fixed_timestamp() {
        let doc = document(2, PageGeometry::new(50.0, 60.0));
        let writer = PdfWriter::default();
        let first = writer.write(&doc, fixed_time()).unwrap();
        let second = writer.write(&doc, fixed_time()).unwrap();
        assert_eq!(first, second);
    }

    fn literal(info: &Dictionary, key: &[u8]) -> String {
        match info.get(key).unwrap() {
            Object::String(bytes, _) => String::from_utf8_lossy(bytes).into_owned(),
            other => panic!("expected string for {:?}, got {:?}", key, other),
        }
    }

    #[test]
    fn info_dictionary_carries_title_and_dates() {
        let mut writer = PdfWriter::new("cmykpdf-test");
        writer.set_title("Proofs");
        let info = writer.info_dictionary(fixed_time());

        assert_eq!(literal(&info, b"CreationDate"), "D:20260102030405Z");
        assert_eq!(literal(&info, b"ModDate"), "D:20260102030405Z");
        assert_eq!(literal(&info, b"Title"), "Proofs");
        assert_eq!(literal(&info, b"Producer"), "cmykpdf-test");
    }

    #[test]
    fn non_ascii_title_is_utf16_with_bom() {
        let mut writer = PdfWriter::default();
        writer.set_title("Épreuve 校样");
        let info = writer.info_dictionary(fixed_time());

        let Ok(Object::String(bytes, _)) = info.get(b"Title") else {
            panic!("title is not a string");
        };
        assert_eq!(&bytes[..2], &[0xFE, 0xFF]);
        let units: Vec<u16> = bytes[2..]
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        assert_eq!(String::from_utf16(&units).unwrap(), "Épreuve 校样");

        // ASCII values stay plain literals.
        assert_eq!(literal(&info, b"Producer"), "cmykpdf");
    }

    #[test]
    fn non_ascii_title_survives_a_round_trip() {
        let mut writer = PdfWriter::default();
        writer.set_title("校样");
        let bytes = writer
            .write(&document(1, PageGeometry::new(10.0, 10.0)), fixed_time())
            .unwrap();

        let doc = Document::load_mem(&bytes).unwrap();
        let info_id = doc.trailer.get(b"Info").unwrap().as_reference().unwrap();
        let info = doc.get_dictionary(info_id).unwrap();
        let Ok(Object::String(title, _)) = info.get(b"Title") else {
            panic!("title is not a string");
        };
        assert!(title.starts_with(&[0xFE, 0xFF]));
    }
}
