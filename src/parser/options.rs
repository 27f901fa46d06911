//! Parsing options and configuration.

use std::path::PathBuf;

use crate::container::ContainerLimits;
use crate::media::MediaStorage;

/// Options for parsing DOCX packages.
#[derive(Debug, Clone)]
pub struct ParseOptions {
    /// Whether to extract embedded media (images)
    pub extract_media: bool,

    /// Where extracted media is kept
    pub media_storage: MediaStorage,

    /// Parent directory for temporary media storage (system temp if unset)
    pub temp_root: Option<PathBuf>,

    /// Whether markup parsing and media extraction run concurrently
    pub parallel: bool,

    /// Container read limits
    pub limits: ContainerLimits,
}

impl ParseOptions {
    /// Create new parse options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable media extraction.
    pub fn with_media(mut self, extract: bool) -> Self {
        self.extract_media = extract;
        self
    }

    /// Skip media extraction; image placements will not be drawn.
    pub fn text_only(mut self) -> Self {
        self.extract_media = false;
        self
    }

    /// Set media storage.
    pub fn with_media_storage(mut self, storage: MediaStorage) -> Self {
        self.media_storage = storage;
        self
    }

    /// Stage extracted media in a scoped temporary directory.
    pub fn temp_dir_media(mut self) -> Self {
        self.media_storage = MediaStorage::TempDir;
        self
    }

    /// Create temporary media directories under `root`.
    pub fn with_temp_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.temp_root = Some(root.into());
        self
    }

    /// Enable or disable parallel processing.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Disable parallel processing.
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }

    /// Set the largest accepted uncompressed entry size, in bytes.
    pub fn with_max_entry_size(mut self, bytes: u64) -> Self {
        self.limits.max_entry_size = bytes;
        self
    }
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            extract_media: true,
            media_storage: MediaStorage::Memory,
            temp_root: None,
            parallel: true,
            limits: ContainerLimits::default(),
        }
    }
}
