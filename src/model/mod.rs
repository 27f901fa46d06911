//! Document model types for DOCX content representation.
//!
//! This module defines the intermediate representation (IR) that bridges
//! markup parsing and PDF rendering. The body is one ordered sequence of
//! blocks; grouped views (all paragraphs, all tables, all images) are
//! derived from it.

mod document;
mod image;
mod paragraph;
mod table;

pub use document::{Block, Document, Metadata};
pub use self::image::ImagePlacement;
pub use paragraph::{Alignment, Paragraph, Run, RunFormatting};
pub use table::{Table, TableCell, TableRow};
