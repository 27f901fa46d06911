//! Container format detection and output validation.

use crate::container::DOCUMENT_PART;
use crate::error::{Error, Result};
use std::fs;
use std::path::Path;

/// Zip local file header signature: PK\x03\x04
const ZIP_LOCAL_MAGIC: &[u8] = b"PK\x03\x04";
/// Zip end-of-central-directory signature (empty archive): PK\x05\x06
const ZIP_EMPTY_MAGIC: &[u8] = b"PK\x05\x06";
/// Zip spanned archive marker: PK\x07\x08
const ZIP_SPANNED_MAGIC: &[u8] = b"PK\x07\x08";

/// PDF magic bytes: %PDF-
const PDF_MAGIC: &[u8] = b"%PDF-";

/// Kind of package recognized from raw bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageFormat {
    /// A zip archive that names the main document part
    Docx,
    /// A zip archive without a visible main document part
    Zip,
}

impl std::fmt::Display for PackageFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PackageFormat::Docx => write!(f, "DOCX"),
            PackageFormat::Zip => write!(f, "ZIP"),
        }
    }
}

/// Detect the package format from a file path.
///
/// # Example
/// ```no_run
/// use docx2pdf::detect::detect_format_from_path;
///
/// let format = detect_format_from_path("report.docx").unwrap();
/// println!("Format: {}", format);
/// ```
pub fn detect_format_from_path<P: AsRef<Path>>(path: P) -> Result<PackageFormat> {
    let data = fs::read(path)?;
    detect_format_from_bytes(&data)
}

/// Detect the package format from bytes.
///
/// Only signatures are inspected; the archive directory is not validated.
/// The main document part name is looked up in the raw bytes, which works
/// because zip stores entry names uncompressed.
///
/// # Returns
/// * `Ok(PackageFormat)` if the data starts with a zip signature
/// * `Err(Error::UnknownFormat)` otherwise
pub fn detect_format_from_bytes(data: &[u8]) -> Result<PackageFormat> {
    if !is_zip_bytes(data) {
        return Err(Error::UnknownFormat);
    }

    let needle = DOCUMENT_PART.as_bytes();
    if data.windows(needle.len()).any(|w| w == needle) {
        Ok(PackageFormat::Docx)
    } else {
        Ok(PackageFormat::Zip)
    }
}

/// Check if bytes start with a zip signature.
pub fn is_zip_bytes(data: &[u8]) -> bool {
    data.starts_with(ZIP_LOCAL_MAGIC)
        || data.starts_with(ZIP_EMPTY_MAGIC)
        || data.starts_with(ZIP_SPANNED_MAGIC)
}

/// Check if bytes start with the PDF signature.
pub fn is_pdf_bytes(data: &[u8]) -> bool {
    data.starts_with(PDF_MAGIC)
}
