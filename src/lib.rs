//! # docx2pdf
//!
//! Convert Word (`.docx`) documents to PDF.
//!
//! The package is opened as a zip container, `word/document.xml` is parsed
//! into a typed document tree, embedded media is extracted, and the tree is
//! laid out onto A4 pages with the standard PDF fonts.
//!
//! ## Quick Start
//!
//! ```no_run
//! fn main() -> docx2pdf::Result<()> {
//!     let input = std::fs::read("report.docx")?;
//!     let pdf = docx2pdf::convert(&input)?;
//!     std::fs::write("report.pdf", pdf)?;
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Formatting**: bold, italic, font size, color, paragraph alignment
//! - **Tables**: simple grid tables with bordered cells
//! - **Images**: embedded JPEG, PNG, GIF, BMP, and TIFF media
//! - **Document order**: blocks are laid out in source order, or grouped
//! - **Parallel processing**: markup parsing and media extraction run on Rayon
//! - **Scoped temp storage**: staged media is removed on every exit path

pub mod container;
pub mod convert;
pub mod detect;
pub mod error;
pub mod media;
pub mod model;
pub mod parser;
pub mod render;

#[cfg(feature = "ffi")]
pub mod ffi;

// Re-export commonly used types
pub use convert::{
    ConvertOptions, ConvertResult, ConverterRegistry, DocumentConverter, DocxConverter,
    OutputFormat,
};
pub use detect::{detect_format_from_bytes, detect_format_from_path, PackageFormat};
pub use error::{Error, ErrorKind, Result};
pub use media::{MediaHandle, MediaIndex, MediaStorage};
pub use model::{
    Alignment, Block, Document, ImagePlacement, Metadata, Paragraph, Run, RunFormatting, Table,
    TableCell, TableRow,
};
pub use parser::{DocxParser, ParseOptions, ParsedDocx};
pub use render::{
    BlockOrder, FontFamily, JsonFormat, PageLayout, RenderOptions, RenderOutput, RenderStats,
};

use std::io::Read;
use std::path::Path;

/// Convert DOCX bytes to PDF bytes with default options.
///
/// # Errors
///
/// * [`Error::ContainerFormat`] if the input is not a valid zip container
/// * [`Error::MalformedMarkup`] if the document markup is not well-formed
/// * [`Error::MediaWrite`] if embedded media cannot be staged
/// * [`Error::Render`] if the PDF cannot be produced
///
/// # Example
///
/// ```no_run
/// let input = std::fs::read("report.docx").unwrap();
/// let pdf = docx2pdf::convert(&input).unwrap();
/// assert!(pdf.starts_with(b"%PDF-"));
/// ```
pub fn convert(input: &[u8]) -> Result<Vec<u8>> {
    convert_with_options(input, &ConvertOptions::default()).map(|result| result.content)
}

/// Convert DOCX bytes with custom options.
///
/// # Example
///
/// ```no_run
/// use docx2pdf::{convert_with_options, ConvertOptions, RenderOptions};
///
/// let input = std::fs::read("report.docx").unwrap();
/// let options = ConvertOptions::new()
///     .with_render_options(RenderOptions::new().grouped())
///     .with_stats(true);
/// let result = convert_with_options(&input, &options).unwrap();
/// println!("{} pages", result.stats.unwrap().page_count);
/// ```
pub fn convert_with_options(input: &[u8], options: &ConvertOptions) -> Result<ConvertResult> {
    DocxConverter::new().convert_bytes(input, options)
}

/// Convert a DOCX file and write the PDF to `output`.
///
/// Nothing is written if the conversion fails.
///
/// # Example
///
/// ```no_run
/// docx2pdf::convert_file("report.docx", "report.pdf").unwrap();
/// ```
pub fn convert_file<P: AsRef<Path>, Q: AsRef<Path>>(input: P, output: Q) -> Result<RenderStats> {
    let data = parser::read_package(input)?;
    let options = ConvertOptions::new().with_stats(true);
    let result = convert_with_options(&data, &options)?;
    std::fs::write(output, &result.content)?;
    Ok(result.stats.unwrap_or_default())
}

/// Convert a DOCX file asynchronously.
///
/// File I/O goes through `tokio::fs`; the conversion itself runs on the
/// blocking thread pool.
#[cfg(feature = "async")]
pub async fn convert_file_async<P: AsRef<Path>, Q: AsRef<Path>>(
    input: P,
    output: Q,
) -> Result<RenderStats> {
    let data = tokio::fs::read(input).await?;
    let result = tokio::task::spawn_blocking(move || {
        convert_with_options(&data, &ConvertOptions::new().with_stats(true))
    })
    .await
    .map_err(|e| Error::Other(format!("conversion task failed: {}", e)))??;
    tokio::fs::write(output, &result.content).await?;
    Ok(result.stats.unwrap_or_default())
}

/// Parse DOCX bytes into a document tree and extracted media.
///
/// # Example
///
/// ```no_run
/// let data = std::fs::read("report.docx").unwrap();
/// let parsed = docx2pdf::parse_bytes(&data).unwrap();
/// println!("{} blocks", parsed.document.block_count());
/// ```
pub fn parse_bytes(data: &[u8]) -> Result<ParsedDocx> {
    DocxParser::from_bytes(data)?.parse()
}

/// Parse DOCX bytes with custom options.
pub fn parse_bytes_with_options(data: &[u8], options: ParseOptions) -> Result<ParsedDocx> {
    DocxParser::from_bytes_with_options(data, options)?.parse()
}

/// Parse a DOCX file.
///
/// # Example
///
/// ```no_run
/// let parsed = docx2pdf::parse_file("report.docx").unwrap();
/// for table in parsed.document.tables() {
///     println!("{} x {}", table.row_count(), table.column_count());
/// }
/// ```
pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<ParsedDocx> {
    let data = parser::read_package(path)?;
    parse_bytes(&data)
}

/// Parse a DOCX file with custom options.
pub fn parse_file_with_options<P: AsRef<Path>>(path: P, options: ParseOptions) -> Result<ParsedDocx> {
    let data = parser::read_package(path)?;
    parse_bytes_with_options(&data, options)
}

/// Parse a DOCX package from a reader.
pub fn parse_reader<R: Read>(reader: R) -> Result<ParsedDocx> {
    let data = parser::read_package_from(reader)?;
    parse_bytes(&data)
}

/// Extract plain text from a DOCX file.
///
/// # Example
///
/// ```no_run
/// let text = docx2pdf::extract_text("report.docx").unwrap();
/// println!("{}", text);
/// ```
pub fn extract_text<P: AsRef<Path>>(path: P) -> Result<String> {
    let parsed = parse_file_with_options(path, ParseOptions::new().text_only())?;
    Ok(render::to_text(&parsed.document))
}

/// Convert a DOCX file to a JSON document tree.
///
/// # Example
///
/// ```no_run
/// use docx2pdf::{to_json, JsonFormat};
///
/// let json = to_json("report.docx", JsonFormat::Pretty).unwrap();
/// std::fs::write("report.json", json).unwrap();
/// ```
pub fn to_json<P: AsRef<Path>>(path: P, format: JsonFormat) -> Result<String> {
    let parsed = parse_file_with_options(path, ParseOptions::new().text_only())?;
    render::to_json(&parsed.document, format)
}

/// Builder for parsing and converting DOCX documents.
///
/// # Example
///
/// ```no_run
/// use docx2pdf::Docx2Pdf;
///
/// let stats = Docx2Pdf::new()
///     .grouped()
///     .temp_dir_media()
///     .sequential()
///     .parse("report.docx")?
///     .save("report.pdf")?;
/// println!("{} pages", stats.page_count);
/// # Ok::<(), docx2pdf::Error>(())
/// ```
pub struct Docx2Pdf {
    parse_options: ParseOptions,
    render_options: RenderOptions,
}

impl Docx2Pdf {
    /// Create a new builder.
    pub fn new() -> Self {
        Self {
            parse_options: ParseOptions::default(),
            render_options: RenderOptions::default(),
        }
    }

    /// Skip media extraction (images are not drawn).
    pub fn text_only(mut self) -> Self {
        self.parse_options = self.parse_options.text_only();
        self
    }

    /// Disable parallel processing.
    pub fn sequential(mut self) -> Self {
        self.parse_options = self.parse_options.sequential();
        self
    }

    /// Stage media in a temporary directory instead of memory.
    pub fn temp_dir_media(mut self) -> Self {
        self.parse_options = self.parse_options.temp_dir_media();
        self
    }

    /// Set the largest accepted uncompressed entry size.
    pub fn with_max_entry_size(mut self, bytes: u64) -> Self {
        self.parse_options = self.parse_options.with_max_entry_size(bytes);
        self
    }

    /// Set block order.
    pub fn with_block_order(mut self, order: BlockOrder) -> Self {
        self.render_options = self.render_options.with_block_order(order);
        self
    }

    /// Lay out all paragraphs, then all tables, then all images.
    pub fn grouped(mut self) -> Self {
        self.render_options = self.render_options.grouped();
        self
    }

    /// Set the page layout.
    pub fn with_layout(mut self, layout: PageLayout) -> Self {
        self.render_options = self.render_options.with_layout(layout);
        self
    }

    /// Set the font family.
    pub fn with_font_family(mut self, family: FontFamily) -> Self {
        self.render_options = self.render_options.with_font_family(family);
        self
    }

    /// Set the producer string written to the PDF.
    pub fn with_producer(mut self, producer: impl Into<String>) -> Self {
        self.render_options = self.render_options.with_producer(producer);
        self
    }

    /// Write uncompressed content streams.
    pub fn uncompressed(mut self) -> Self {
        self.render_options = self.render_options.with_compression(false);
        self
    }

    /// Parse a DOCX file and return a result wrapper.
    pub fn parse<P: AsRef<Path>>(self, path: P) -> Result<Docx2PdfResult> {
        let data = parser::read_package(path)?;
        self.parse_bytes(&data)
    }

    /// Parse DOCX bytes.
    pub fn parse_bytes(self, data: &[u8]) -> Result<Docx2PdfResult> {
        let parsed = DocxParser::from_bytes_with_options(data, self.parse_options)?.parse()?;
        Ok(Docx2PdfResult {
            parsed,
            render_options: self.render_options,
        })
    }
}

impl Default for Docx2Pdf {
    fn default() -> Self {
        Self::new()
    }
}

/// A parsed document ready to render.
pub struct Docx2PdfResult {
    parsed: ParsedDocx,
    render_options: RenderOptions,
}

impl Docx2PdfResult {
    /// Render to PDF bytes with statistics.
    pub fn render(&self) -> Result<RenderOutput> {
        render::render_pdf(&self.parsed.document, &self.parsed.media, &self.render_options)
    }

    /// Render to PDF bytes.
    pub fn to_pdf(&self) -> Result<Vec<u8>> {
        self.render().map(|output| output.bytes)
    }

    /// Render and write the PDF to a file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<RenderStats> {
        let output = self.render()?;
        std::fs::write(path, &output.bytes)?;
        Ok(output.stats)
    }

    /// Convert to plain text.
    pub fn to_text(&self) -> String {
        render::to_text(&self.parsed.document)
    }

    /// Convert to JSON.
    pub fn to_json(&self, format: JsonFormat) -> Result<String> {
        render::to_json(&self.parsed.document, format)
    }

    /// Get the document.
    pub fn document(&self) -> &Document {
        &self.parsed.document
    }

    /// Get the extracted media.
    pub fn media(&self) -> &MediaIndex {
        &self.parsed.media
    }
}
