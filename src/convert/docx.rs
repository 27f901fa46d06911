//! DOCX converter implementation.

use crate::error::Result;
use crate::parser::{read_package, DocxParser};
use crate::render::{render_pdf, to_json, to_text, JsonFormat};
use std::path::Path;

use super::{ConvertOptions, ConvertResult, DocumentConverter, OutputFormat};

/// DOCX document converter.
///
/// Converts Word packages to PDF, plain text, or JSON.
#[derive(Debug, Clone, Default)]
pub struct DocxConverter {
    _private: (),
}

impl DocxConverter {
    /// Create a new DOCX converter.
    pub fn new() -> Self {
        Self { _private: () }
    }
}

impl DocumentConverter for DocxConverter {
    fn supported_extensions(&self) -> &[&str] {
        &["docx", "docm", "dotx", "dotm"]
    }

    fn name(&self) -> &str {
        "docx"
    }

    fn convert(&self, path: &Path, options: &ConvertOptions) -> Result<ConvertResult> {
        let data = read_package(path)?;
        self.convert_bytes(&data, options)
    }

    fn convert_bytes(&self, bytes: &[u8], options: &ConvertOptions) -> Result<ConvertResult> {
        let mut parse_options = options.parse.clone();
        if options.output_format != OutputFormat::Pdf {
            parse_options = parse_options.text_only();
        }

        let parser = DocxParser::from_bytes_with_options(bytes, parse_options)?;
        let parsed = parser.parse()?;
        let metadata = parsed.document.metadata.clone();
        let format = options.output_format;

        match format {
            OutputFormat::Pdf => {
                let output = render_pdf(&parsed.document, &parsed.media, &options.render)?;
                let result = ConvertResult::new(output.bytes, metadata);
                Ok(if options.collect_stats {
                    result.with_stats(output.stats)
                } else {
                    result
                })
            }
            OutputFormat::Text => {
                let content = to_text(&parsed.document);
                Ok(ConvertResult::new(content.into_bytes(), metadata)
                    .with_mime_type(format.mime_type()))
            }
            OutputFormat::Json => {
                let content = to_json(&parsed.document, JsonFormat::Pretty)?;
                Ok(ConvertResult::new(content.into_bytes(), metadata)
                    .with_mime_type(format.mime_type()))
            }
        }
    }
}
