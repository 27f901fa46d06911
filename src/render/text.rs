//! Plain text rendering.

use crate::model::Document;

/// Convert a document to plain text.
///
/// Blocks are separated by blank lines; table cells by tabs.
pub fn to_text(doc: &Document) -> String {
    doc.plain_text().trim().to_string()
}
