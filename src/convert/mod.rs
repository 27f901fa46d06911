//! Converters behind a common trait, dispatched by file extension or by
//! sniffing the package bytes.
//!
//! # Example
//!
//! ```no_run
//! use docx2pdf::convert::{ConverterRegistry, ConvertOptions, DocxConverter};
//! use std::sync::Arc;
//! use std::path::Path;
//!
//! fn main() -> docx2pdf::Result<()> {
//!     let mut registry = ConverterRegistry::new();
//!     registry.register(Arc::new(DocxConverter::new()));
//!
//!     let result = registry.convert(Path::new("report.docx"), &ConvertOptions::default())?;
//!     std::fs::write("report.pdf", &result.content)?;
//!     Ok(())
//! }
//! ```

mod docx;

pub use docx::DocxConverter;

use crate::detect::{detect_format_from_bytes, PackageFormat};
use crate::error::{Error, Result};
use crate::model::Metadata;
use crate::parser::ParseOptions;
use crate::render::{RenderOptions, RenderStats};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

/// Options for document conversion.
#[derive(Debug, Clone, Default)]
pub struct ConvertOptions {
    /// Parsing options
    pub parse: ParseOptions,

    /// Rendering options
    pub render: RenderOptions,

    /// Whether to return layout statistics
    pub collect_stats: bool,

    /// Output format
    pub output_format: OutputFormat,
}

impl ConvertOptions {
    /// Create new conversion options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set parsing options.
    pub fn with_parse_options(mut self, options: ParseOptions) -> Self {
        self.parse = options;
        self
    }

    /// Set rendering options.
    pub fn with_render_options(mut self, options: RenderOptions) -> Self {
        self.render = options;
        self
    }

    /// Enable statistics collection.
    pub fn with_stats(mut self, collect: bool) -> Self {
        self.collect_stats = collect;
        self
    }

    /// Set output format.
    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.output_format = format;
        self
    }
}

/// Output format for conversion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// PDF document
    #[default]
    Pdf,

    /// Plain text
    Text,

    /// JSON document tree
    Json,
}

impl OutputFormat {
    /// MIME type of the output.
    pub fn mime_type(&self) -> &'static str {
        match self {
            OutputFormat::Pdf => "application/pdf",
            OutputFormat::Text => "text/plain",
            OutputFormat::Json => "application/json",
        }
    }

    /// Conventional file extension, without the dot.
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Pdf => "pdf",
            OutputFormat::Text => "txt",
            OutputFormat::Json => "json",
        }
    }
}

/// Result of document conversion.
#[derive(Debug, Clone)]
pub struct ConvertResult {
    /// Converted content
    pub content: Vec<u8>,

    /// Source document metadata
    pub metadata: Metadata,

    /// Layout statistics (PDF output, if collected)
    pub stats: Option<RenderStats>,

    /// MIME type of the output
    pub mime_type: &'static str,
}

impl ConvertResult {
    /// Create a new conversion result.
    pub fn new(content: Vec<u8>, metadata: Metadata) -> Self {
        Self {
            content,
            metadata,
            stats: None,
            mime_type: OutputFormat::Pdf.mime_type(),
        }
    }

    /// Set layout statistics.
    pub fn with_stats(mut self, stats: RenderStats) -> Self {
        self.stats = Some(stats);
        self
    }

    /// Set MIME type.
    pub fn with_mime_type(mut self, mime_type: &'static str) -> Self {
        self.mime_type = mime_type;
        self
    }

    /// Get content length in bytes.
    pub fn content_len(&self) -> usize {
        self.content.len()
    }

    /// Write the converted content to `path`.
    pub fn write_to<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        std::fs::write(path, &self.content)?;
        Ok(())
    }
}

/// Trait for document converters.
///
/// Implement this trait to add support for a new document format.
pub trait DocumentConverter: Send + Sync {
    /// Get the supported file extensions for this converter.
    ///
    /// Extensions should be lowercase without the leading dot (e.g., `["docx"]`).
    fn supported_extensions(&self) -> &[&str];

    /// Get the name of this converter.
    fn name(&self) -> &str;

    /// Convert a file at the given path.
    fn convert(&self, path: &Path, options: &ConvertOptions) -> Result<ConvertResult>;

    /// Convert from bytes.
    fn convert_bytes(&self, bytes: &[u8], options: &ConvertOptions) -> Result<ConvertResult>;

    /// Check if this converter supports the given extension.
    fn supports_extension(&self, ext: &str) -> bool {
        let ext_lower = ext.to_lowercase();
        self.supported_extensions().iter().any(|e| *e == ext_lower)
    }
}

/// Registry for document converters.
pub struct ConverterRegistry {
    converters: HashMap<String, Arc<dyn DocumentConverter>>,
    by_name: HashMap<String, Arc<dyn DocumentConverter>>,
}

impl ConverterRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            converters: HashMap::new(),
            by_name: HashMap::new(),
        }
    }

    /// Create a registry with the DOCX converter registered.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(DocxConverter::new()));
        registry
    }

    /// Register a converter for all its supported extensions.
    pub fn register(&mut self, converter: Arc<dyn DocumentConverter>) {
        for ext in converter.supported_extensions() {
            self.converters.insert(ext.to_lowercase(), converter.clone());
        }
        self.by_name.insert(converter.name().to_lowercase(), converter);
    }

    /// Get a converter by file extension.
    pub fn get_by_extension(&self, ext: &str) -> Option<Arc<dyn DocumentConverter>> {
        self.converters.get(&ext.to_lowercase()).cloned()
    }

    /// Get a converter by name.
    pub fn get_by_name(&self, name: &str) -> Option<Arc<dyn DocumentConverter>> {
        self.by_name.get(&name.to_lowercase()).cloned()
    }

    /// Check if an extension is supported.
    pub fn supports(&self, ext: &str) -> bool {
        self.converters.contains_key(&ext.to_lowercase())
    }

    /// Get all supported extensions, sorted.
    pub fn supported_extensions(&self) -> Vec<&str> {
        let mut exts: Vec<&str> = self.converters.keys().map(|s| s.as_str()).collect();
        exts.sort_unstable();
        exts
    }

    /// Convert a file using the converter registered for its extension.
    pub fn convert(&self, path: &Path, options: &ConvertOptions) -> Result<ConvertResult> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .ok_or_else(|| Error::Other("File has no extension".into()))?;

        let converter = self
            .get_by_extension(ext)
            .ok_or_else(|| Error::UnsupportedExtension(ext.to_string()))?;

        converter.convert(path, options)
    }

    /// Convert a file and write the result next to it, or to `output`.
    ///
    /// Without `output` the input path is reused with the extension of the
    /// requested output format. Nothing is written when conversion fails.
    pub fn convert_to_file(
        &self,
        input: &Path,
        output: Option<&Path>,
        options: &ConvertOptions,
    ) -> Result<std::path::PathBuf> {
        let result = self.convert(input, options)?;
        let target = output
            .map(Path::to_path_buf)
            .unwrap_or_else(|| input.with_extension(options.output_format.extension()));
        result.write_to(&target)?;
        log::debug!(
            "Wrote {} bytes of {} to {}",
            result.content_len(),
            result.mime_type,
            target.display()
        );
        Ok(target)
    }

    /// Convert bytes whose extension is unknown by sniffing the package.
    ///
    /// Any zip container goes to the `docx` converter; a package without
    /// `word/document.xml` converts to a single blank page. Bytes without a
    /// zip signature are rejected with [`Error::UnknownFormat`].
    pub fn convert_sniffed(&self, bytes: &[u8], options: &ConvertOptions) -> Result<ConvertResult> {
        let format = detect_format_from_bytes(bytes)?;
        if format == PackageFormat::Zip {
            log::debug!("Zip package has no main document part; converting as DOCX anyway");
        }
        self.convert_bytes(bytes, "docx", options)
    }

    /// Convert bytes using the specified extension to pick the converter.
    pub fn convert_bytes(
        &self,
        bytes: &[u8],
        ext: &str,
        options: &ConvertOptions,
    ) -> Result<ConvertResult> {
        let converter = self
            .get_by_extension(ext)
            .ok_or_else(|| Error::UnsupportedExtension(ext.to_string()))?;

        converter.convert_bytes(bytes, options)
    }
}

impl Default for ConverterRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}
