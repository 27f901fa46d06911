//! Rendering options and page geometry.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::fonts::FontFamily;

/// Default `Producer` entry of the PDF info dictionary.
pub const DEFAULT_PRODUCER: &str = concat!("docx2pdf ", env!("CARGO_PKG_VERSION"));

/// Options for rendering a document to PDF.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Page geometry and fixed layout metrics
    pub layout: PageLayout,

    /// Order in which body blocks are laid out
    pub block_order: BlockOrder,

    /// Standard font family used for all text
    pub font_family: FontFamily,

    /// Compress page content streams
    pub compress: bool,

    /// Copy document metadata into the PDF info dictionary
    pub include_metadata: bool,

    /// `Producer` entry of the info dictionary
    pub producer: String,

    /// `CreationDate` entry; falls back to the document's creation date
    pub creation_date: Option<DateTime<Utc>>,
}

impl RenderOptions {
    /// Create new render options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the page layout.
    pub fn with_layout(mut self, layout: PageLayout) -> Self {
        self.layout = layout;
        self
    }

    /// Set block order.
    pub fn with_block_order(mut self, order: BlockOrder) -> Self {
        self.block_order = order;
        self
    }

    /// Lay out all paragraphs, then all tables, then all images.
    pub fn grouped(mut self) -> Self {
        self.block_order = BlockOrder::Grouped;
        self
    }

    /// Set the font family.
    pub fn with_font_family(mut self, family: FontFamily) -> Self {
        self.font_family = family;
        self
    }

    /// Enable or disable content stream compression.
    pub fn with_compression(mut self, compress: bool) -> Self {
        self.compress = compress;
        self
    }

    /// Enable or disable the metadata copy.
    pub fn with_metadata(mut self, include: bool) -> Self {
        self.include_metadata = include;
        self
    }

    /// Set the producer string.
    pub fn with_producer(mut self, producer: impl Into<String>) -> Self {
        self.producer = producer.into();
        self
    }

    /// Set a fixed creation date, for reproducible output.
    pub fn with_creation_date(mut self, date: DateTime<Utc>) -> Self {
        self.creation_date = Some(date);
        self
    }
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            layout: PageLayout::default(),
            block_order: BlockOrder::Document,
            font_family: FontFamily::Helvetica,
            compress: true,
            include_metadata: true,
            producer: DEFAULT_PRODUCER.to_string(),
            creation_date: None,
        }
    }
}

/// Order in which body blocks are laid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockOrder {
    /// Source order, with paragraphs, tables, and images interleaved
    #[default]
    Document,
    /// All paragraphs, then all tables, then all images
    Grouped,
}

impl std::str::FromStr for BlockOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "document" | "source" => Ok(BlockOrder::Document),
            "grouped" => Ok(BlockOrder::Grouped),
            other => Err(format!("unknown block order '{}'", other)),
        }
    }
}

/// Rectangle in millimeters, origin at the top-left of the page.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoxMm {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// Fixed page geometry and layout metrics, in millimeters unless noted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageLayout {
    pub page_width: f32,
    pub page_height: f32,
    pub margin_left: f32,
    pub margin_top: f32,
    pub margin_right: f32,
    /// Distance from the bottom edge that triggers a page break
    pub margin_bottom: f32,

    /// Body text size in points
    pub body_font_size: f32,
    /// Height of one text line
    pub line_height: f32,
    /// Vertical advance after each paragraph
    pub paragraph_spacing: f32,

    /// Table text size in points
    pub table_font_size: f32,
    pub cell_width: f32,
    pub cell_height: f32,

    /// Box every image is drawn into
    pub image_box: BoxMm,

    /// Horizontal padding for left/right aligned text
    pub cell_margin: f32,
    /// Stroke width of table borders
    pub line_width: f32,
}

impl PageLayout {
    /// A4 portrait with the fixed metrics used for every document.
    pub fn a4() -> Self {
        Self {
            page_width: 210.0,
            page_height: 297.0,
            margin_left: 10.0,
            margin_top: 10.0,
            margin_right: 10.0,
            margin_bottom: 20.0,
            body_font_size: 12.0,
            line_height: 6.0,
            paragraph_spacing: 4.0,
            table_font_size: 10.0,
            cell_width: 40.0,
            cell_height: 10.0,
            image_box: BoxMm {
                x: 10.0,
                y: 10.0,
                width: 50.0,
                height: 50.0,
            },
            cell_margin: 1.0,
            line_width: 0.2,
        }
    }

    /// US Letter portrait with the same metrics as [`a4`](Self::a4).
    pub fn letter() -> Self {
        Self {
            page_width: 215.9,
            page_height: 279.4,
            ..Self::a4()
        }
    }

    /// Width available for text between the margins.
    pub fn content_width(&self) -> f32 {
        self.page_width - self.margin_left - self.margin_right
    }

    /// Y position past which the next line starts a new page.
    pub fn break_trigger(&self) -> f32 {
        self.page_height - self.margin_bottom
    }
}

impl Default for PageLayout {
    fn default() -> Self {
        Self::a4()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_options_builder() {
        let options = RenderOptions::new()
            .grouped()
            .with_compression(false)
            .with_producer("test")
            .with_font_family(FontFamily::Courier);

        assert_eq!(options.block_order, BlockOrder::Grouped);
        assert!(!options.compress);
        assert_eq!(options.producer, "test");
        assert_eq!(options.font_family, FontFamily::Courier);
    }

    #[test]
    fn test_default_layout() {
        let layout = PageLayout::default();
        assert_eq!(layout.page_width, 210.0);
        assert_eq!(layout.content_width(), 190.0);
        assert_eq!(layout.break_trigger(), 277.0);
        assert_eq!(layout.image_box.width, 50.0);
    }

    #[test]
    fn test_block_order_from_str() {
        assert_eq!("grouped".parse::<BlockOrder>().unwrap(), BlockOrder::Grouped);
        assert_eq!("Document".parse::<BlockOrder>().unwrap(), BlockOrder::Document);
        assert!("random".parse::<BlockOrder>().is_err());
    }
}
