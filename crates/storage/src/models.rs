//! Storage models.

use std::path::PathBuf;

/// Contents of a single storage folder, split by entry type.
///
/// Paths are relative to the backend root and keep the listed folder as a
/// prefix, so every entry can be fed straight back into other
/// [`StorageBackend`](crate::StorageBackend) operations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Listing {
    /// Files directly inside the listed folder.
    pub files: Vec<PathBuf>,
    /// Immediate subfolders of the listed folder.
    pub folders: Vec<PathBuf>,
}

impl Listing {
    /// Returns `true` if the folder holds no files and no subfolders.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty() && self.folders.is_empty()
    }
}
