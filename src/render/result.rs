//! Rendering result with statistics.

use serde::{Deserialize, Serialize};

/// Rendered PDF bytes with layout statistics.
#[derive(Debug, Clone)]
pub struct RenderOutput {
    /// The complete PDF file
    pub bytes: Vec<u8>,

    /// Layout statistics
    pub stats: RenderStats,
}

impl RenderOutput {
    /// Get the output length in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Check if the output is empty.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Statistics collected while laying out a document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderStats {
    /// Pages emitted
    pub page_count: u32,

    /// Paragraphs laid out
    pub paragraph_count: u32,

    /// Text lines advanced, including empty fragments
    pub line_count: u32,

    /// Tables laid out
    pub table_count: u32,

    /// Table cells drawn
    pub cell_count: u32,

    /// Images drawn
    pub images_drawn: u32,

    /// Image placements skipped (unresolved or undecodable)
    pub images_skipped: u32,
}

impl RenderStats {
    /// Create new empty statistics.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an image that was laid out but could not be embedded.
    pub fn demote_image(&mut self) {
        self.images_drawn = self.images_drawn.saturating_sub(1);
        self.images_skipped += 1;
    }

    /// Merge another stats instance into this one.
    pub fn merge(&mut self, other: &RenderStats) {
        self.page_count += other.page_count;
        self.paragraph_count += other.paragraph_count;
        self.line_count += other.line_count;
        self.table_count += other.table_count;
        self.cell_count += other.cell_count;
        self.images_drawn += other.images_drawn;
        self.images_skipped += other.images_skipped;
    }
}
