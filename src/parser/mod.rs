//! DOCX parsing module.

mod document_xml;
mod docx_parser;
mod options;
mod properties;
mod relationships;

pub use document_xml::parse_document_xml;
pub use docx_parser::{DocxParser, ParsedDocx};
pub(crate) use docx_parser::{read_package, read_package_from};
pub use options::ParseOptions;
pub use properties::{parse_core_properties, parse_date};
pub use relationships::{resolve_target, Relationship, Relationships};
