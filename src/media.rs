//! Embedded media extraction.
//!
//! Media entries under `word/media/` are copied out of the container once,
//! before rendering, so the renderer never touches the archive. Copies live
//! either in memory or in a scoped temporary directory; the directory is
//! removed when the [`MediaIndex`] is dropped, on success and failure alike.

use std::borrow::Cow;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::container::{Container, MEDIA_PREFIX};
use crate::error::{Error, Result};
use crate::parser::Relationships;

/// Directory of the main document part, used to resolve relationship targets.
const DOCUMENT_DIR: &str = "word";

/// Name prefix of staging directories.
pub const TEMP_PREFIX: &str = "docx2pdf-media-";

/// Where extracted media is kept.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MediaStorage {
    /// Keep copies in memory
    #[default]
    Memory,
    /// Write copies to a temporary directory removed after the conversion
    TempDir,
}

/// Extracted copy of one media entry.
#[derive(Debug, Clone)]
pub enum MediaHandle {
    /// In-memory bytes
    Memory(Vec<u8>),
    /// File inside the index's temporary directory
    File(PathBuf),
}

impl MediaHandle {
    /// Read the media bytes.
    pub fn read(&self) -> std::io::Result<Cow<'_, [u8]>> {
        match self {
            MediaHandle::Memory(data) => Ok(Cow::Borrowed(data)),
            MediaHandle::File(path) => fs::read(path).map(Cow::Owned),
        }
    }

    /// Path of the staged copy, for file-backed handles.
    pub fn path(&self) -> Option<&Path> {
        match self {
            MediaHandle::Memory(_) => None,
            MediaHandle::File(path) => Some(path),
        }
    }
}

/// Extracted media keyed by full archive name (`word/media/image1.png`).
#[derive(Debug, Default)]
pub struct MediaIndex {
    entries: BTreeMap<String, MediaHandle>,
    aliases: HashMap<String, String>,
    temp_dir: Option<TempDir>,
}

impl MediaIndex {
    /// Create an empty in-memory index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an in-memory entry.
    pub fn insert_bytes(&mut self, name: impl Into<String>, data: Vec<u8>) {
        self.entries.insert(name.into(), MediaHandle::Memory(data));
    }

    /// Look up an entry by archive name.
    pub fn get(&self, name: &str) -> Option<&MediaHandle> {
        self.entries.get(name)
    }

    /// Read an entry's bytes by archive name.
    pub fn read(&self, name: &str) -> Result<Option<Cow<'_, [u8]>>> {
        match self.entries.get(name) {
            Some(handle) => handle
                .read()
                .map(Some)
                .map_err(|e| Error::Render(format!("failed to read staged media '{}': {}", name, e))),
            None => Ok(None),
        }
    }

    /// Resolve a drawing embed ID to an archive name.
    ///
    /// `word/media/<embed_id>` is tried first, then the relationship targets
    /// registered with [`register_relationships`](Self::register_relationships).
    pub fn resolve(&self, embed_id: &str) -> Option<&str> {
        let direct = format!("{}{}", MEDIA_PREFIX, embed_id);
        if let Some((name, _)) = self.entries.get_key_value(&direct) {
            return Some(name.as_str());
        }
        let target = self.aliases.get(embed_id)?;
        self.entries.get_key_value(target).map(|(name, _)| name.as_str())
    }

    /// Record relationship IDs that point at extracted entries.
    pub fn register_relationships(&mut self, relationships: &Relationships) {
        for rel in relationships.iter() {
            if let Some(part) = relationships.target_part(&rel.id, DOCUMENT_DIR) {
                if self.entries.contains_key(&part) {
                    self.aliases.insert(rel.id.clone(), part);
                }
            }
        }
    }

    /// Archive names of all entries, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if no media was extracted.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Temporary directory holding staged copies, if any.
    pub fn storage_dir(&self) -> Option<&Path> {
        self.temp_dir.as_ref().map(|dir| dir.path())
    }
}

/// Copy every media entry out of the container.
///
/// Either all entries are copied or none are: on failure the partially
/// filled temporary directory is removed before the error is returned.
///
/// # Errors
///
/// [`Error::MediaWrite`] if a copy cannot be written, and
/// [`Error::ContainerFormat`] if an entry cannot be read.
pub fn extract_media(container: &mut Container<'_>, storage: MediaStorage) -> Result<MediaIndex> {
    extract_media_in(container, storage, None)
}

/// Like [`extract_media`], creating the temporary directory under `root`
/// instead of the system temp location. `root` is ignored for
/// [`MediaStorage::Memory`].
pub fn extract_media_in(
    container: &mut Container<'_>,
    storage: MediaStorage,
    root: Option<&Path>,
) -> Result<MediaIndex> {
    let names = container.media_entry_names();
    let mut index = MediaIndex::new();

    if storage == MediaStorage::TempDir {
        let mut builder = tempfile::Builder::new();
        builder.prefix(TEMP_PREFIX);
        let dir = match root {
            Some(root) => builder.tempdir_in(root),
            None => builder.tempdir(),
        }
        .map_err(|source| Error::MediaWrite {
                name: MEDIA_PREFIX.to_string(),
                source,
            })?;
        index.temp_dir = Some(dir);
    }

    for (i, name) in names.into_iter().enumerate() {
        let Some(data) = container.read_entry(&name)? else {
            continue;
        };

        let handle = match index.temp_dir.as_ref() {
            None => MediaHandle::Memory(data),
            Some(dir) => {
                let file_name = Path::new(&name)
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default();
                let path = dir.path().join(format!("{:04}-{}", i, file_name));
                fs::write(&path, &data).map_err(|source| Error::MediaWrite {
                    name: name.clone(),
                    source,
                })?;
                MediaHandle::File(path)
            }
        };

        index.entries.insert(name, handle);
    }

    log::debug!("Extracted {} media entries ({:?})", index.len(), storage);
    Ok(index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::tests::build_zip;
    use crate::container::DOCUMENT_PART;
    use crate::error::ErrorKind;
    use crate::parser::Relationship;

    fn sample() -> Vec<u8> {
        build_zip(&[
            (DOCUMENT_PART, b"<w:document/>"),
            ("word/media/image1.png", b"first"),
            ("word/media/image2.jpeg", b"second"),
        ])
    }

    #[test]
    fn test_extract_in_memory() {
        let data = sample();
        let mut container = Container::open(&data).unwrap();
        let index = extract_media(&mut container, MediaStorage::Memory).unwrap();

        assert_eq!(index.len(), 2);
        assert!(index.storage_dir().is_none());
        assert_eq!(
            index.read("word/media/image1.png").unwrap().as_deref(),
            Some(&b"first"[..])
        );
        assert!(index.read("word/media/missing.png").unwrap().is_none());
    }

    #[test]
    fn test_temp_dir_is_removed_on_drop() {
        let data = sample();
        let mut container = Container::open(&data).unwrap();
        let index = extract_media(&mut container, MediaStorage::TempDir).unwrap();

        let dir = index.storage_dir().unwrap().to_path_buf();
        assert!(dir.is_dir());
        let staged = index.get("word/media/image2.jpeg").unwrap().path().unwrap().to_path_buf();
        assert_eq!(fs::read(&staged).unwrap(), b"second");
        assert_eq!(
            index.read("word/media/image2.jpeg").unwrap().as_deref(),
            Some(&b"second"[..])
        );

        drop(index);
        assert!(!dir.exists());
    }

    #[test]
    fn test_unusable_root_is_media_write() {
        let data = sample();
        let root = tempfile::tempdir().unwrap();
        let missing = root.path().join("not-created");
        let mut container = Container::open(&data).unwrap();

        let err = extract_media_in(&mut container, MediaStorage::TempDir, Some(&missing)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MediaWrite);
        assert!(!missing.exists());
    }

    #[test]
    fn test_failed_copy_leaves_nothing_behind() {
        // the second name exceeds the file-name limit, so its copy fails
        // after the first entry has already been staged
        let long_name = format!("word/media/{}.png", "x".repeat(300));
        let data = build_zip(&[
            (DOCUMENT_PART, b"<w:document/>"),
            ("word/media/a.png", b"first"),
            (long_name.as_str(), b"second"),
        ]);
        let root = tempfile::tempdir().unwrap();
        let mut container = Container::open(&data).unwrap();

        let result = extract_media_in(&mut container, MediaStorage::TempDir, Some(root.path()));
        match result {
            Err(Error::MediaWrite { name, .. }) => assert_eq!(name, long_name),
            other => panic!("expected MediaWrite, got {:?}", other.map(|i| i.len())),
        }
        assert_eq!(fs::read_dir(root.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_memory_storage_ignores_root() {
        let data = sample();
        let mut container = Container::open(&data).unwrap();
        let index = extract_media_in(
            &mut container,
            MediaStorage::Memory,
            Some(Path::new("/definitely/not/here")),
        )
        .unwrap();
        assert_eq!(index.len(), 2);
        assert!(index.storage_dir().is_none());
    }

    #[test]
    fn test_resolve_direct_and_by_relationship() {
        let mut index = MediaIndex::new();
        index.insert_bytes("word/media/image1.png", b"png".to_vec());

        let mut rels = Relationships::new();
        rels.insert(Relationship {
            id: "rId7".into(),
            rel_type: "http://schemas.openxmlformats.org/officeDocument/2006/relationships/image".into(),
            target: "media/image1.png".into(),
            external: false,
        });
        rels.insert(Relationship {
            id: "rId8".into(),
            rel_type: "http://schemas.openxmlformats.org/officeDocument/2006/relationships/image".into(),
            target: "media/gone.png".into(),
            external: false,
        });
        index.register_relationships(&rels);

        assert_eq!(index.resolve("image1.png"), Some("word/media/image1.png"));
        assert_eq!(index.resolve("rId7"), Some("word/media/image1.png"));
        assert_eq!(index.resolve("rId8"), None);
        assert_eq!(index.resolve("rId9"), None);
    }
}
