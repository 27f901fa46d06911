//! Read access to the DOCX zip container.
//!
//! A [`Container`] is a read-only view over the caller's input bytes. It is
//! cheap to clone, so the markup parser and the media extractor can each
//! hold their own cursor over the same archive.

use std::io::{Cursor, Read};

use zip::result::ZipError;
use zip::ZipArchive;

use crate::detect::is_zip_bytes;
use crate::error::{Error, Result};

/// Main document markup part.
pub const DOCUMENT_PART: &str = "word/document.xml";

/// Prefix shared by all embedded media entries.
pub const MEDIA_PREFIX: &str = "word/media/";

/// Relationships of the main document part.
pub const DOCUMENT_RELS_PART: &str = "word/_rels/document.xml.rels";

/// Core properties part (title, author, dates).
pub const CORE_PROPERTIES_PART: &str = "docProps/core.xml";

/// Safety limits applied while reading entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContainerLimits {
    /// Largest uncompressed entry accepted, in bytes
    pub max_entry_size: u64,
}

impl Default for ContainerLimits {
    fn default() -> Self {
        Self {
            max_entry_size: 256 * 1024 * 1024,
        }
    }
}

/// An opened DOCX container.
#[derive(Debug, Clone)]
pub struct Container<'a> {
    archive: ZipArchive<Cursor<&'a [u8]>>,
    limits: ContainerLimits,
}

impl<'a> Container<'a> {
    /// Open a container over the given bytes.
    pub fn open(data: &'a [u8]) -> Result<Self> {
        Self::open_with_limits(data, ContainerLimits::default())
    }

    /// Open a container with custom read limits.
    pub fn open_with_limits(data: &'a [u8], limits: ContainerLimits) -> Result<Self> {
        if !is_zip_bytes(data) {
            return Err(Error::ContainerFormat(
                "missing zip signature".to_string(),
            ));
        }

        let archive = ZipArchive::new(Cursor::new(data))?;
        log::debug!("Opened container with {} entries", archive.len());

        Ok(Self { archive, limits })
    }

    /// Number of entries in the archive.
    pub fn len(&self) -> usize {
        self.archive.len()
    }

    /// Check if the archive has no entries.
    pub fn is_empty(&self) -> bool {
        self.archive.len() == 0
    }

    /// Names of all entries, in central directory order.
    pub fn entry_names(&self) -> Vec<String> {
        self.archive.file_names().map(String::from).collect()
    }

    /// Check if an entry exists.
    pub fn contains(&self, name: &str) -> bool {
        self.archive.index_for_name(name).is_some()
    }

    /// Names of all media entries, sorted.
    pub fn media_entry_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .archive
            .file_names()
            .filter(|name| is_media_entry(name))
            .map(String::from)
            .collect();
        names.sort();
        names
    }

    /// Read an entry fully.
    ///
    /// Returns `Ok(None)` if the entry does not exist. Corrupt or oversized
    /// entry data is reported as [`Error::ContainerFormat`].
    pub fn read_entry(&mut self, name: &str) -> Result<Option<Vec<u8>>> {
        let limit = self.limits.max_entry_size;

        let mut file = match self.archive.by_name(name) {
            Ok(file) => file,
            Err(ZipError::FileNotFound) => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        if file.size() > limit {
            return Err(Error::ContainerFormat(format!(
                "entry '{}' is {} bytes, limit is {}",
                name,
                file.size(),
                limit
            )));
        }

        let mut data = Vec::with_capacity(file.size() as usize);
        (&mut file)
            .take(limit + 1)
            .read_to_end(&mut data)
            .map_err(|e| Error::ContainerFormat(format!("failed to read '{}': {}", name, e)))?;

        if data.len() as u64 > limit {
            return Err(Error::ContainerFormat(format!(
                "entry '{}' exceeds the {} byte limit",
                name, limit
            )));
        }

        Ok(Some(data))
    }
}

/// Check if an archive name is a media file (not a directory) under the media prefix.
pub fn is_media_entry(name: &str) -> bool {
    name.len() > MEDIA_PREFIX.len() && name.starts_with(MEDIA_PREFIX) && !name.ends_with('/')
}
