//! Document-level types.

use super::{ImagePlacement, Paragraph, Table};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A parsed DOCX document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Document metadata (core properties)
    pub metadata: Metadata,

    /// Body blocks in document order
    pub blocks: Vec<Block>,
}

impl Document {
    /// Create a new empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a block.
    pub fn push(&mut self, block: Block) {
        self.blocks.push(block);
    }

    /// Append a paragraph.
    pub fn add_paragraph(&mut self, paragraph: Paragraph) {
        self.blocks.push(Block::Paragraph(paragraph));
    }

    /// Append a table.
    pub fn add_table(&mut self, table: Table) {
        self.blocks.push(Block::Table(table));
    }

    /// Append an image placement.
    pub fn add_image(&mut self, image: ImagePlacement) {
        self.blocks.push(Block::Image(image));
    }

    /// All paragraphs, in document order.
    pub fn paragraphs(&self) -> impl Iterator<Item = &Paragraph> {
        self.blocks.iter().filter_map(|b| match b {
            Block::Paragraph(p) => Some(p),
            _ => None,
        })
    }

    /// All tables, in document order.
    pub fn tables(&self) -> impl Iterator<Item = &Table> {
        self.blocks.iter().filter_map(|b| match b {
            Block::Table(t) => Some(t),
            _ => None,
        })
    }

    /// All image placements, in document order.
    pub fn images(&self) -> impl Iterator<Item = &ImagePlacement> {
        self.blocks.iter().filter_map(|b| match b {
            Block::Image(i) => Some(i),
            _ => None,
        })
    }

    /// Blocks regrouped as all paragraphs, then all tables, then all images.
    pub fn grouped_blocks(&self) -> Vec<&Block> {
        let mut grouped: Vec<&Block> = Vec::with_capacity(self.blocks.len());
        grouped.extend(self.blocks.iter().filter(|b| b.is_paragraph()));
        grouped.extend(self.blocks.iter().filter(|b| b.is_table()));
        grouped.extend(self.blocks.iter().filter(|b| b.is_image()));
        grouped
    }

    /// Check if the document has no blocks.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Get the number of blocks.
    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// Get plain text content of the entire document.
    pub fn plain_text(&self) -> String {
        self.blocks
            .iter()
            .filter_map(|block| match block {
                Block::Paragraph(p) => Some(p.plain_text()),
                Block::Table(t) => Some(t.plain_text()),
                Block::Image(_) => None,
            })
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

/// A block-level element of the document body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    /// A paragraph of text
    Paragraph(Paragraph),

    /// A table
    Table(Table),

    /// An image placement
    Image(ImagePlacement),
}

impl Block {
    /// Check if this block is a paragraph.
    pub fn is_paragraph(&self) -> bool {
        matches!(self, Block::Paragraph(_))
    }

    /// Check if this block is a table.
    pub fn is_table(&self) -> bool {
        matches!(self, Block::Table(_))
    }

    /// Check if this block is an image.
    pub fn is_image(&self) -> bool {
        matches!(self, Block::Image(_))
    }
}

/// Document metadata read from `docProps/core.xml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    /// Document title
    pub title: Option<String>,

    /// Document subject
    pub subject: Option<String>,

    /// Document author (`dc:creator`)
    pub author: Option<String>,

    /// Keywords
    pub keywords: Option<String>,

    /// Description / comments
    pub description: Option<String>,

    /// Last editor
    pub last_modified_by: Option<String>,

    /// Creation date
    pub created: Option<DateTime<Utc>>,

    /// Last modification date
    pub modified: Option<DateTime<Utc>>,
}

impl Metadata {
    /// Check if no property is set.
    pub fn is_empty(&self) -> bool {
        *self == Metadata::default()
    }
}
