//! PDF serialization with lopdf.
//!
//! Laid-out pages are written as content streams over the standard Type1
//! fonts. Images are embedded once per media entry and shared between pages.

use std::collections::{BTreeMap, HashMap};
use std::io::Write;

use chrono::{DateTime, Utc};
use flate2::write::ZlibEncoder;
use flate2::Compression;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Object, ObjectId, Stream, StringFormat};

use crate::error::{Error, Result};
use crate::media::MediaIndex;
use crate::model::{Document, Metadata};

use super::fonts::FontFace;
use super::layout::{layout_document, DrawOp, ImageOp, LaidOut, PageContent, TextOp};
use super::options::{BoxMm, PageLayout, RenderOptions};
use super::result::{RenderOutput, RenderStats};
use super::style::PT_PER_MM;

const PDF_VERSION: &str = "1.5";

/// Render a document to PDF bytes with statistics.
///
/// # Errors
///
/// [`Error::Render`] if the PDF cannot be serialized or staged media cannot
/// be read back. Undecodable images are skipped with a warning.
pub fn render_pdf(doc: &Document, media: &MediaIndex, options: &RenderOptions) -> Result<RenderOutput> {
    let laid_out = layout_document(doc, media, options);
    write_pdf(laid_out, &doc.metadata, media, options)
}

/// Render a document to PDF bytes.
pub fn to_pdf(doc: &Document, media: &MediaIndex, options: &RenderOptions) -> Result<Vec<u8>> {
    render_pdf(doc, media, options).map(|output| output.bytes)
}

/// Serialize laid-out pages.
pub fn write_pdf(
    laid_out: LaidOut,
    metadata: &Metadata,
    media: &MediaIndex,
    options: &RenderOptions,
) -> Result<RenderOutput> {
    let mut writer = PdfWriter::new(&options.layout, options.compress, laid_out.stats);

    let mut page_ids = Vec::with_capacity(laid_out.pages.len());
    for page in &laid_out.pages {
        page_ids.push(writer.write_page(page, media)?);
    }

    writer.finish(page_ids, metadata, options)
}

struct PdfWriter<'a> {
    pdf: lopdf::Document,
    pages_id: ObjectId,
    layout: &'a PageLayout,
    compress: bool,
    fonts: BTreeMap<FontFace, ObjectId>,
    /// Embedded images by archive name; `None` marks a failed embed
    images: HashMap<String, Option<(String, ObjectId)>>,
    stats: RenderStats,
}

impl<'a> PdfWriter<'a> {
    fn new(layout: &'a PageLayout, compress: bool, stats: RenderStats) -> Self {
        let mut pdf = lopdf::Document::with_version(PDF_VERSION);
        let pages_id = pdf.new_object_id();
        Self {
            pdf,
            pages_id,
            layout,
            compress,
            fonts: BTreeMap::new(),
            images: HashMap::new(),
            stats,
        }
    }

    fn page_height_pt(&self) -> f32 {
        self.layout.page_height * PT_PER_MM
    }

    fn write_page(&mut self, page: &PageContent, media: &MediaIndex) -> Result<ObjectId> {
        let mut operations = Vec::new();
        let mut fonts = Dictionary::new();
        let mut xobjects = Dictionary::new();
        let mut stroke_set = false;

        for op in &page.ops {
            match op {
                DrawOp::Text(text) => {
                    let font_id = self.font(text.face);
                    fonts.set(text.face.resource_name(), font_id);
                    operations.extend(self.text_ops(text));
                }
                DrawOp::Rect(rect) => {
                    if !stroke_set {
                        operations.push(Operation::new("w", vec![(self.layout.line_width * PT_PER_MM).into()]));
                        operations.push(Operation::new("RG", vec![0.into(), 0.into(), 0.into()]));
                        stroke_set = true;
                    }
                    let (x, y, w, h) = self.to_user_space(&rect.rect);
                    operations.push(Operation::new("re", vec![x.into(), y.into(), w.into(), h.into()]));
                    operations.push(Operation::new("S", vec![]));
                }
                DrawOp::Image(image) => match self.image(image, media)? {
                    Some((resource, id)) => {
                        xobjects.set(resource.clone(), id);
                        operations.extend(self.image_ops(&resource, &image.rect));
                    }
                    None => self.stats.demote_image(),
                },
            }
        }

        let content = Content { operations }.encode()?;
        let content_id = self.pdf.add_object(self.stream(Dictionary::new(), content)?);

        let mut resources = Dictionary::new();
        if !fonts.is_empty() {
            resources.set("Font", fonts);
        }
        if !xobjects.is_empty() {
            resources.set("XObject", xobjects);
        }

        Ok(self.pdf.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => self.pages_id,
            "Contents" => content_id,
            "Resources" => resources,
        }))
    }

    fn text_ops(&self, text: &TextOp) -> Vec<Operation> {
        let [r, g, b] = text.color.to_unit();
        let x = text.x * PT_PER_MM;
        let y = self.page_height_pt() - text.y * PT_PER_MM;
        vec![
            Operation::new("BT", vec![]),
            Operation::new(
                "Tf",
                vec![
                    Object::Name(text.face.resource_name().into_bytes()),
                    text.size.into(),
                ],
            ),
            Operation::new("rg", vec![r.into(), g.into(), b.into()]),
            Operation::new("Td", vec![x.into(), y.into()]),
            Operation::new(
                "Tj",
                vec![Object::String(text.encoded.clone(), StringFormat::Literal)],
            ),
            Operation::new("ET", vec![]),
        ]
    }

    fn image_ops(&self, resource: &str, rect: &BoxMm) -> Vec<Operation> {
        let (x, y, w, h) = self.to_user_space(rect);
        vec![
            Operation::new("q", vec![]),
            Operation::new(
                "cm",
                vec![w.into(), 0.into(), 0.into(), h.into(), x.into(), y.into()],
            ),
            Operation::new("Do", vec![Object::Name(resource.as_bytes().to_vec())]),
            Operation::new("Q", vec![]),
        ]
    }

    /// Convert a top-left box in millimeters into a bottom-left box in points.
    fn to_user_space(&self, rect: &BoxMm) -> (f32, f32, f32, f32) {
        let x = rect.x * PT_PER_MM;
        let y = self.page_height_pt() - (rect.y + rect.height) * PT_PER_MM;
        (x, y, rect.width * PT_PER_MM, rect.height * PT_PER_MM)
    }

    fn font(&mut self, face: FontFace) -> ObjectId {
        if let Some(id) = self.fonts.get(&face) {
            return *id;
        }
        let id = self.pdf.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => face.base_font(),
            "Encoding" => "WinAnsiEncoding",
        });
        self.fonts.insert(face, id);
        id
    }

    /// Embed an image once; later calls reuse the object.
    fn image(&mut self, image: &ImageOp, media: &MediaIndex) -> Result<Option<(String, ObjectId)>> {
        if let Some(cached) = self.images.get(&image.name) {
            return Ok(cached.clone());
        }

        let embedded = match media.read(&image.name)? {
            Some(data) => match self.embed_image(&data) {
                Ok(id) => Some((format!("Im{}", self.images.len() + 1), id)),
                Err(reason) => {
                    log::warn!("Skipping image '{}': {}", image.name, reason);
                    None
                }
            },
            None => None,
        };

        self.images.insert(image.name.clone(), embedded.clone());
        Ok(embedded)
    }

    fn embed_image(&mut self, data: &[u8]) -> std::result::Result<ObjectId, String> {
        if let Some(info) = jpeg_info(data) {
            let color_space = match info.components {
                1 => Some("DeviceGray"),
                3 => Some("DeviceRGB"),
                _ => None,
            };
            if let Some(color_space) = color_space {
                let dict = dictionary! {
                    "Type" => "XObject",
                    "Subtype" => "Image",
                    "Width" => i64::from(info.width),
                    "Height" => i64::from(info.height),
                    "ColorSpace" => color_space,
                    "BitsPerComponent" => 8,
                    "Filter" => "DCTDecode",
                };
                return Ok(self.pdf.add_object(Stream::new(dict, data.to_vec())));
            }
        }

        let decoded = image::load_from_memory(data).map_err(|e| e.to_string())?;
        let (width, height) = (decoded.width(), decoded.height());
        if width == 0 || height == 0 {
            return Err("image has no pixels".to_string());
        }

        let smask = if decoded.color().has_alpha() {
            let alpha: Vec<u8> = decoded.to_rgba8().pixels().map(|p| p.0[3]).collect();
            let dict = dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => i64::from(width),
                "Height" => i64::from(height),
                "ColorSpace" => "DeviceGray",
                "BitsPerComponent" => 8,
                "Filter" => "FlateDecode",
            };
            let compressed = deflate(&alpha).map_err(|e| e.to_string())?;
            Some(self.pdf.add_object(Stream::new(dict, compressed)))
        } else {
            None
        };

        let rgb = decoded.to_rgb8().into_raw();
        let mut dict = dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => i64::from(width),
            "Height" => i64::from(height),
            "ColorSpace" => "DeviceRGB",
            "BitsPerComponent" => 8,
            "Filter" => "FlateDecode",
        };
        if let Some(smask) = smask {
            dict.set("SMask", smask);
        }
        let compressed = deflate(&rgb).map_err(|e| e.to_string())?;
        Ok(self.pdf.add_object(Stream::new(dict, compressed)))
    }

    fn stream(&self, mut dict: Dictionary, content: Vec<u8>) -> Result<Stream> {
        if !self.compress {
            return Ok(Stream::new(dict, content));
        }
        let compressed = deflate(&content)
            .map_err(|e| Error::Render(format!("failed to compress content stream: {}", e)))?;
        dict.set("Filter", "FlateDecode");
        Ok(Stream::new(dict, compressed))
    }

    fn finish(
        mut self,
        page_ids: Vec<ObjectId>,
        metadata: &Metadata,
        options: &RenderOptions,
    ) -> Result<RenderOutput> {
        let count = page_ids.len() as i64;
        let width = self.layout.page_width * PT_PER_MM;
        let height = self.page_height_pt();

        let pages = dictionary! {
            "Type" => "Pages",
            "Kids" => page_ids.into_iter().map(Object::from).collect::<Vec<_>>(),
            "Count" => count,
            "MediaBox" => vec![0.into(), 0.into(), width.into(), height.into()],
        };
        self.pdf.objects.insert(self.pages_id, Object::Dictionary(pages));

        let catalog_id = self.pdf.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => self.pages_id,
        });
        self.pdf.trailer.set("Root", catalog_id);

        let info_id = self.pdf.add_object(info_dictionary(metadata, options));
        self.pdf.trailer.set("Info", info_id);

        let mut bytes = Vec::new();
        self.pdf
            .save_to(&mut bytes)
            .map_err(|e| Error::Render(format!("failed to write PDF: {}", e)))?;

        log::debug!(
            "Wrote {} page(s), {} bytes",
            self.stats.page_count,
            bytes.len()
        );

        Ok(RenderOutput {
            bytes,
            stats: self.stats,
        })
    }
}

fn info_dictionary(metadata: &Metadata, options: &RenderOptions) -> Dictionary {
    let mut info = Dictionary::new();
    info.set("Producer", text_string(&options.producer));

    let created = options
        .creation_date
        .or(if options.include_metadata { metadata.created } else { None });
    if let Some(date) = created {
        info.set("CreationDate", date_string(&date));
    }

    if options.include_metadata {
        let fields = [
            ("Title", &metadata.title),
            ("Author", &metadata.author),
            ("Subject", &metadata.subject),
            ("Keywords", &metadata.keywords),
        ];
        for (key, value) in fields {
            if let Some(value) = value {
                info.set(key, text_string(value));
            }
        }
        if let Some(date) = metadata.modified {
            info.set("ModDate", date_string(&date));
        }
    }

    info
}

/// PDF text string: literal for ASCII, UTF-16BE with BOM otherwise.
fn text_string(value: &str) -> Object {
    if value.is_ascii() {
        return Object::string_literal(value);
    }
    let mut bytes = vec![0xFE, 0xFF];
    for unit in value.encode_utf16() {
        bytes.extend_from_slice(&unit.to_be_bytes());
    }
    Object::String(bytes, StringFormat::Hexadecimal)
}

fn date_string(date: &DateTime<Utc>) -> Object {
    Object::string_literal(date.format("D:%Y%m%d%H%M%SZ").to_string())
}

fn deflate(data: &[u8]) -> std::io::Result<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data)?;
    encoder.finish()
}

struct JpegInfo {
    width: u32,
    height: u32,
    components: u8,
}

/// Read dimensions and component count from a baseline or progressive
/// JPEG frame header.
fn jpeg_info(data: &[u8]) -> Option<JpegInfo> {
    if !data.starts_with(&[0xFF, 0xD8]) {
        return None;
    }

    let mut pos = 2;
    while pos + 4 <= data.len() {
        if data[pos] != 0xFF {
            return None;
        }
        let marker = data[pos + 1];
        match marker {
            0xFF => {
                pos += 1;
                continue;
            }
            0x01 | 0xD0..=0xD8 => {
                pos += 2;
                continue;
            }
            0xD9 | 0xDA => return None,
            _ => {}
        }

        let len = usize::from(u16::from_be_bytes([data[pos + 2], data[pos + 3]]));
        if len < 2 {
            return None;
        }
        if matches!(marker, 0xC0..=0xC2) {
            let segment = data.get(pos + 4..pos + 2 + len)?;
            if segment.len() < 6 {
                return None;
            }
            let height = u32::from(u16::from_be_bytes([segment[1], segment[2]]));
            let width = u32::from(u16::from_be_bytes([segment[3], segment[4]]));
            if width == 0 || height == 0 {
                return None;
            }
            return Some(JpegInfo {
                width,
                height,
                components: segment[5],
            });
        }
        if (0xC3..=0xCF).contains(&marker) && !matches!(marker, 0xC4 | 0xC8 | 0xCC) {
            // lossless or arithmetic-coded frames are re-encoded
            return None;
        }
        pos += 2 + len;
    }
    None
}
