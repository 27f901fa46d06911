//! Image placement types.

use serde::{Deserialize, Serialize};

/// A reference from the document body to an embedded media entry.
///
/// The embed ID is the raw `r:embed` attribute of the drawing's blip. It is
/// normally a relationship ID (`rId7`) that resolves through the document
/// relationships to a `word/media/` entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImagePlacement {
    /// Embed identifier
    pub embed_id: String,
}

impl ImagePlacement {
    /// Create a placement for the given embed ID.
    pub fn new(embed_id: impl Into<String>) -> Self {
        Self {
            embed_id: embed_id.into(),
        }
    }
}
