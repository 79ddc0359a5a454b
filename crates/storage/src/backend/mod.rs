//! Storage backend trait and implementations.
//!
//! This module defines the `StorageBackend` trait, which provides a unified
//! interface over whatever filesystem the host keeps its documents on (a
//! local directory in production, an in-memory map in tests).
//!

mod local;
#[cfg(feature = "mock")]
mod mock;

pub use self::local::LocalBackend;
#[cfg(feature = "mock")]
pub use self::mock::MockBackend;
use crate::error::Result;
use crate::models::Listing;
use async_trait::async_trait;
use std::path::Path;

/// Unified interface for storage backends.
///
/// All storage operations are asynchronous to efficiently handle concurrent
/// access. It's a glorified CRUD interface, but in ✨Rust✨
///
/// # Path Handling
/// All paths are relative to the storage root and must be validated using
/// [`validate_path`](crate::validate_path) before use. Implementations should
/// enforce this validation.
///
/// # Examples
///
/// ```
/// use std::path::PathBuf;
/// use magpie_storage::{backend::StorageBackend, error::Result};
///
/// async fn size_of_cached_record(backend: &dyn StorageBackend) -> Result<u64> {
///     let path = PathBuf::from("cache/0a1b2c.json");
///     if backend.exists(&path).await? {
///         let data = backend.read(&path).await?;
///         Ok(data.len() as u64)
///     } else {
///         Ok(0)
///     }
/// }
/// ```
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Name of the configured backend (name taken from the configuration
    /// object key). Each backend's name is **supposed** to be unique, but it
    /// doesn't affect the functionality of this crate if they aren't (used
    /// for logging only).
    fn name(&self) -> &str;

    /// Check if a file or folder exists.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use std::path::Path;
    /// # use magpie_storage::{backend::StorageBackend, error::Result};
    /// # async fn example(backend: &dyn StorageBackend) -> Result<()> {
    /// if backend.exists(Path::new("cache/0a1b2c.json")).await? {
    ///     println!("File exists!");
    /// }
    /// # Ok(())
    /// # }
    /// ```
    async fn exists(&self, path: &Path) -> Result<bool>;

    /// Read file contents.
    ///
    /// Returns the complete file contents as a [`Vec<u8>`].
    /// Returns [`NotFound`](crate::error::ErrorKind::NotFound) if the file
    /// does not exist.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use std::path::Path;
    /// # use magpie_storage::{backend::StorageBackend, error::Result};
    /// # async fn example(backend: &dyn StorageBackend) -> Result<()> {
    /// let data = backend.read(Path::new("cache/0a1b2c.json")).await?;
    /// println!("Read {} bytes", data.len());
    /// # Ok(())
    /// # }
    /// ```
    async fn read(&self, path: &Path) -> Result<Vec<u8>>;

    /// Write file contents.
    ///
    /// Creates a new file or overwrites an existing file with the provided data.
    ///
    /// # Notes
    /// - Implementations should create parent directories as needed.
    /// - Concurrent readers must never observe a partially written file: an
    ///   implementation either stages out-of-band and renames into place, or
    ///   relies on an underlying whole-file write.
    ///
    /// ```no_run
    /// use std::path::Path;
    /// # use magpie_storage::{backend::StorageBackend, error::Result};
    /// # async fn example(backend: &dyn StorageBackend) -> Result<()> {
    /// let data = br#"{"cached":"text"}"#;
    /// backend.write(Path::new("cache/0a1b2c.json"), data).await?;
    /// # Ok(())
    /// # }
    /// ```
    async fn write(&self, path: &Path, data: &[u8]) -> Result<()>;

    /// Create a folder, along with any missing parents.
    ///
    /// Succeeds without complaint if the folder already exists.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use std::path::Path;
    /// # use magpie_storage::{backend::StorageBackend, error::Result};
    /// # async fn example(backend: &dyn StorageBackend) -> Result<()> {
    /// backend.mkdir(Path::new("cache")).await?;
    /// # Ok(())
    /// # }
    /// ```
    async fn mkdir(&self, path: &Path) -> Result<()>;

    /// List the immediate children of a folder, split into files and
    /// subfolders.
    ///
    /// Returns [`NotFound`](crate::error::ErrorKind::NotFound) if the folder
    /// does not exist. Callers rely on that to tell "never created" apart
    /// from "empty".
    ///
    /// # Notes
    /// - A single level only; nothing inside subfolders is visited.
    /// - Entry order is unspecified.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use std::path::Path;
    /// # use magpie_storage::{backend::StorageBackend, error::Result};
    /// # async fn example(backend: &dyn StorageBackend) -> Result<()> {
    /// let listing = backend.list(Path::new("cache")).await?;
    /// for file in &listing.files {
    ///     println!("record: {}", file.display());
    /// }
    /// for folder in &listing.folders {
    ///     println!("legacy subfolder: {}", folder.display());
    /// }
    /// # Ok(())
    /// # }
    /// ```
    async fn list(&self, path: &Path) -> Result<Listing>;

    /// Rename/move a file within the same backend.
    ///
    /// Returns [`NotFound`](crate::error::ErrorKind::NotFound) if the source
    /// file does not exist.
    ///
    /// # Notes
    /// - Implementations should create parent directories as needed
    /// - If the destination already exists, it will be overwritten
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use std::path::Path;
    /// # use magpie_storage::{backend::StorageBackend, error::Result};
    /// # async fn example(backend: &dyn StorageBackend) -> Result<()> {
    /// backend.rename(
    ///     Path::new("cache/Old Note/text-0a1b2c.json"),
    ///     Path::new("cache/0a1b2c.json")
    /// ).await?;
    /// # Ok(())
    /// # }
    /// ```
    async fn rename(&self, from: &Path, to: &Path) -> Result<()>;
}
