//! JSON dump of the parsed document tree.
//!
//! The output wraps the tree in an envelope with the producing library
//! version and block counts, so inspection tools can tell at a glance how
//! much the parser recognized.

use serde::Serialize;

use crate::error::{Error, Result};
use crate::model::{Block, Document, Metadata};

/// JSON output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonFormat {
    /// Indented output
    #[default]
    Pretty,
    /// Single line
    Compact,
}

#[derive(Serialize)]
struct Summary {
    paragraphs: usize,
    tables: usize,
    images: usize,
    runs: usize,
}

impl Summary {
    fn of(doc: &Document) -> Self {
        let mut summary = Summary {
            paragraphs: 0,
            tables: 0,
            images: 0,
            runs: 0,
        };
        for block in &doc.blocks {
            match block {
                Block::Paragraph(p) => {
                    summary.paragraphs += 1;
                    summary.runs += p.runs.len();
                }
                Block::Table(_) => summary.tables += 1,
                Block::Image(_) => summary.images += 1,
            }
        }
        summary
    }
}

#[derive(Serialize)]
struct Envelope<'a> {
    generator: &'static str,
    metadata: &'a Metadata,
    summary: Summary,
    blocks: &'a [Block],
}

/// Serialize a document as a JSON envelope.
pub fn to_json(doc: &Document, format: JsonFormat) -> Result<String> {
    let envelope = Envelope {
        generator: concat!("docx2pdf ", env!("CARGO_PKG_VERSION")),
        metadata: &doc.metadata,
        summary: Summary::of(doc),
        blocks: &doc.blocks,
    };

    match format {
        JsonFormat::Pretty => serde_json::to_string_pretty(&envelope),
        JsonFormat::Compact => serde_json::to_string(&envelope),
    }
    .map_err(|e| Error::Render(format!("JSON serialization error: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ImagePlacement, Paragraph, Table};

    #[test]
    fn test_envelope_fields() {
        let mut doc = Document::new();
        doc.metadata.title = Some("Test".to_string());
        doc.add_paragraph(Paragraph::with_text("Hello"));
        doc.add_image(ImagePlacement::new("rId4"));

        let json = to_json(&doc, JsonFormat::Pretty).unwrap();
        assert!(json.contains('\n'));

        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["metadata"]["title"], "Test");
        assert_eq!(value["summary"]["paragraphs"], 1);
        assert_eq!(value["summary"]["images"], 1);
        assert_eq!(value["blocks"][0]["type"], "paragraph");
        assert!(value["generator"].as_str().unwrap().starts_with("docx2pdf "));
    }

    #[test]
    fn test_compact_blocks_deserialize() {
        let mut doc = Document::new();
        doc.add_table(Table::from_rows([["a"]]));

        let json = to_json(&doc, JsonFormat::Compact).unwrap();
        assert!(!json.contains('\n'));

        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        let blocks: Vec<Block> = serde_json::from_value(value["blocks"].clone()).unwrap();
        assert_eq!(blocks, doc.blocks);
        assert_eq!(value["summary"]["tables"], 1);
    }
}
