//! In-memory storage backend for testing.

use crate::error::{ErrorKind, Result};
use crate::models::Listing;
use crate::path::validate as validate_path;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;

use crate::StorageBackend;

/// In-memory storage backend for testing.
///
/// Files live in a `HashMap` and folders in a `HashSet`, both behind a
/// [`RwLock`], so all trait methods can operate on `&self` without external
/// synchronisation. Ideal for unit tests that need a [`StorageBackend`]
/// without filesystem dependencies.
///
/// Writing a file registers its ancestor folders, mirroring how
/// [`LocalBackend`](crate::backend::LocalBackend) creates parent directories
/// on write.
///
/// # Examples
///
/// ```
/// use magpie_storage::backend::{MockBackend, StorageBackend};
/// use std::path::Path;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let backend = MockBackend::with_files([
///     ("cache/0a1b2c.json", br#"{"cached":"text"}"#),
/// ]);
/// assert!(backend.exists(Path::new("cache/0a1b2c.json")).await?);
///
/// backend.write(Path::new("cache/3d4e5f.json"), b"data...").await?;
/// assert!(backend.exists(Path::new("cache/3d4e5f.json")).await?);
/// # Ok(())
/// # }
/// ```
pub struct MockBackend {
    name: String,
    state: RwLock<State>,
}

#[derive(Default)]
struct State {
    files: HashMap<PathBuf, Vec<u8>>,
    folders: HashSet<PathBuf>,
}

impl State {
    fn register_ancestors(&mut self, path: &Path) {
        let mut current = path.parent();
        while let Some(folder) = current {
            if !folder.as_os_str().is_empty() {
                self.folders.insert(folder.to_path_buf());
            }
            current = folder.parent();
        }
    }

    fn insert(&mut self, path: PathBuf, data: Vec<u8>) {
        self.register_ancestors(&path);
        self.files.insert(path, data);
    }
}

impl MockBackend {
    /// Create a mock backend pre-populated with files.
    ///
    /// Panics if any path fails validation (e.g. path traversal). If test
    /// setup is wrong, then test should not pass.
    ///
    /// # Example
    ///
    /// ```
    /// use magpie_storage::backend::MockBackend;
    ///
    /// let backend = MockBackend::with_files([
    ///     ("one.json", b"data file 1"),
    ///     ("dir/two.json", b"data file 2"),
    /// ]);
    /// ```
    pub fn with_files(files: impl IntoIterator<Item = (impl Into<PathBuf>, impl Into<Vec<u8>>)>) -> Self {
        let mut state = State::default();
        for (path, data) in files {
            let path = path.into();
            let Ok(validated) = validate_path(&path) else {
                // The panic here is DELIBERATE. MockBackend is intended to be
                // used in tests; panics are expected. There is no error result.
                panic!("MockBackend::with_files: invalid path {}", path.display());
            };
            state.insert(validated, data.into());
        }
        Self {
            name: "mock".to_string(),
            state: RwLock::new(state),
        }
    }

    /// Change the name of the mock backend.
    ///
    /// # Example
    ///
    /// ```
    /// use magpie_storage::backend::MockBackend;
    ///
    /// let backend = MockBackend::default().with_name("test");
    /// ```
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}
impl Default for MockBackend {
    fn default() -> Self {
        let files: [(&str, &str); 0] = [];
        Self::with_files(files)
    }
}

#[async_trait]
impl StorageBackend for MockBackend {
    fn name(&self) -> &str {
        &self.name
    }

    async fn exists(&self, path: &Path) -> Result<bool> {
        let path = validate_path(path)?;
        let state = self.state.read().await;
        Ok(state.files.contains_key(&path) || state.folders.contains(&path))
    }

    async fn read(&self, path: &Path) -> Result<Vec<u8>> {
        let path = validate_path(path)?;
        self.state.read().await.files.get(&path).cloned().ok_or_else(|| exn::Exn::from(ErrorKind::NotFound(path)))
    }

    async fn write(&self, path: &Path, data: &[u8]) -> Result<()> {
        let path = validate_path(path)?;
        self.state.write().await.insert(path, data.to_vec());
        Ok(())
    }

    async fn mkdir(&self, path: &Path) -> Result<()> {
        let path = validate_path(path)?;
        let mut state = self.state.write().await;
        state.register_ancestors(&path);
        state.folders.insert(path);
        Ok(())
    }

    async fn list(&self, path: &Path) -> Result<Listing> {
        let path = validate_path(path)?;
        let state = self.state.read().await;
        if !state.folders.contains(&path) {
            exn::bail!(ErrorKind::NotFound(path));
        }
        let mut listing = Listing::default();
        for file in state.files.keys() {
            if file.parent() == Some(path.as_path()) {
                listing.files.push(file.clone());
            }
        }
        for folder in &state.folders {
            if folder.parent() == Some(path.as_path()) {
                listing.folders.push(folder.clone());
            }
        }
        Ok(listing)
    }

    async fn rename(&self, from: &Path, to: &Path) -> Result<()> {
        let from = validate_path(from)?;
        let to = validate_path(to)?;
        let mut state = self.state.write().await;
        let data = state.files.remove(&from).ok_or_else(|| exn::Exn::from(ErrorKind::NotFound(from)))?;
        state.insert(to, data);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_write_and_read() {
        let backend = MockBackend::default();
        backend.write(Path::new("test.txt"), b"hello").await.unwrap();
        let data = backend.read(Path::new("test.txt")).await.unwrap();
        assert_eq!(data, b"hello");
    }

    #[tokio::test]
    async fn test_with_files() {
        let backend = MockBackend::with_files([
            ("a/file.json", Vec::from(*b"one")),
            ("b/file.json", Vec::from(*b"two")),
        ]);
        assert!(backend.exists(Path::new("a/file.json")).await.unwrap());
        assert!(backend.exists(Path::new("b/file.json")).await.unwrap());
        assert!(!backend.exists(Path::new("c/nope")).await.unwrap());
    }

    #[tokio::test]
    async fn test_write_registers_parent_folders() {
        let backend = MockBackend::default();
        backend.write(Path::new("cache/sub/file.json"), b"data").await.unwrap();
        assert!(backend.exists(Path::new("cache")).await.unwrap());
        assert!(backend.exists(Path::new("cache/sub")).await.unwrap());
    }

    #[tokio::test]
    async fn test_read_not_found() {
        let backend = MockBackend::default();
        let err = backend.read(Path::new("missing.txt")).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::NotFound(_)));
    }

    #[tokio::test]
    async fn test_mkdir() {
        let backend = MockBackend::default();
        backend.mkdir(Path::new("cache")).await.unwrap();
        assert!(backend.exists(Path::new("cache")).await.unwrap());
        // Creating an existing folder is fine
        backend.mkdir(Path::new("cache")).await.unwrap();
        // Missing parents are registered too
        backend.mkdir(Path::new("a/b/c")).await.unwrap();
        assert!(backend.exists(Path::new("a/b")).await.unwrap());
        let listing = backend.list(Path::new("a/b/c")).await.unwrap();
        assert!(listing.is_empty());
    }

    #[tokio::test]
    async fn test_list_missing_folder_is_an_error() {
        let backend = MockBackend::default();
        let err = backend.list(Path::new("nonexistent")).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::NotFound(_)));
    }

    #[tokio::test]
    async fn test_list_splits_files_and_folders() {
        let backend = MockBackend::with_files([
            ("cache/a.json", Vec::from(*b"1")),
            ("cache/b.json", Vec::from(*b"2")),
            ("cache/sub/nested.json", Vec::from(*b"3")),
        ]);
        let mut listing = backend.list(Path::new("cache")).await.unwrap();
        listing.files.sort();
        assert_eq!(listing.files, vec![PathBuf::from("cache/a.json"), PathBuf::from("cache/b.json")]);
        // One level only; the nested file shows up as its parent folder
        assert_eq!(listing.folders, vec![PathBuf::from("cache/sub")]);
    }

    #[tokio::test]
    async fn test_rename() {
        let backend = MockBackend::default();
        backend.write(Path::new("old.txt"), b"data").await.unwrap();
        backend.rename(Path::new("old.txt"), Path::new("new.txt")).await.unwrap();
        assert!(!backend.exists(Path::new("old.txt")).await.unwrap());
        assert_eq!(backend.read(Path::new("new.txt")).await.unwrap(), b"data");
    }

    #[tokio::test]
    async fn test_rename_overwrites_destination() {
        let backend = MockBackend::with_files([
            ("source.txt", Vec::from(*b"winner")),
            ("target.txt", Vec::from(*b"loser")),
        ]);
        backend.rename(Path::new("source.txt"), Path::new("target.txt")).await.unwrap();
        assert_eq!(backend.read(Path::new("target.txt")).await.unwrap(), b"winner");
    }

    #[tokio::test]
    async fn test_rename_not_found() {
        let backend = MockBackend::default();
        let err = backend.rename(Path::new("missing.txt"), Path::new("new.txt")).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::NotFound(_)));
    }

    #[tokio::test]
    async fn test_path_traversal_rejected() {
        let backend = MockBackend::default();
        assert!(backend.read(Path::new("../etc/passwd")).await.is_err());
        assert!(backend.write(Path::new("../escape"), b"bad").await.is_err());
    }

    #[test]
    #[should_panic(expected = "invalid path")]
    fn test_with_files_panics_on_bad_path() {
        MockBackend::with_files([("../escape", Vec::from(*b"bad"))]);
    }
}
