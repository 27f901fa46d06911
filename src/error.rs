//! Error types for docx2pdf library.

use std::io;
use thiserror::Error;

/// Result type alias for docx2pdf operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur during DOCX to PDF conversion.
///
/// Every variant is fatal: a conversion that returns an error produces no
/// output. Recoverable anomalies (unknown markup, dangling image references,
/// malformed colors) never surface here.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The input is not a valid zip container.
    #[error("Invalid document container: {0}")]
    ContainerFormat(String),

    /// The document markup is not well-formed XML.
    #[error("Malformed document markup: {0}")]
    MalformedMarkup(String),

    /// An embedded media entry could not be copied to storage.
    #[error("Failed to store media entry '{name}': {source}")]
    MediaWrite {
        /// Archive name of the media entry
        name: String,
        /// Underlying storage error
        #[source]
        source: io::Error,
    },

    /// The PDF could not be produced.
    #[error("Rendering error: {0}")]
    Render(String),

    /// The file format is not recognized as a zip container.
    #[error("Unknown file format: not a DOCX container")]
    UnknownFormat,

    /// No converter is registered for the extension.
    #[error("Unsupported file extension: {0}")]
    UnsupportedExtension(String),

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}

/// Coarse classification of [`Error`] values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Input is not a readable archive
    Container,
    /// Document markup is not parseable
    Markup,
    /// Media could not be persisted
    MediaWrite,
    /// Output serialization failed
    Render,
    /// Everything else (I/O on paths, detection, registry lookups)
    Other,
}

impl Error {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::ContainerFormat(_) | Error::UnknownFormat => ErrorKind::Container,
            Error::MalformedMarkup(_) => ErrorKind::Markup,
            Error::MediaWrite { .. } => ErrorKind::MediaWrite,
            Error::Render(_) => ErrorKind::Render,
            Error::Io(_) | Error::UnsupportedExtension(_) | Error::Other(_) => ErrorKind::Other,
        }
    }
}

impl From<zip::result::ZipError> for Error {
    fn from(err: zip::result::ZipError) -> Self {
        Error::ContainerFormat(err.to_string())
    }
}

impl From<quick_xml::Error> for Error {
    fn from(err: quick_xml::Error) -> Self {
        Error::MalformedMarkup(err.to_string())
    }
}

impl From<lopdf::Error> for Error {
    fn from(err: lopdf::Error) -> Self {
        Error::Render(err.to_string())
    }
}
