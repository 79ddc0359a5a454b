//! Path validation and security utilities.
//!
//! Every path handed to a [`StorageBackend`](crate::StorageBackend) is
//! relative to the backend root. Validation normalizes the path and rejects
//! anything that could land outside that root.

use std::path::{Component, Path, PathBuf};

use crate::error::{ErrorKind, Result};

/// Validates a storage path for security and correctness.
///
/// Cache paths are always plain `folder/file` shapes, so there is no
/// legitimate use for `..` here. Any parent reference is rejected outright
/// rather than resolved. A leading separator is the opposite case: every
/// path is root-relative anyway, so the root component is dropped and the
/// rest kept.
///
/// > **Note:** This does **not** normalize backslashes, non-UTF8 bytes, or
/// >           platform-specific weirdness. Null bytes are explicitly rejected.
///
/// # Returns
/// Returns the normalized path if valid, or [`InvalidPath`](crate::error::ErrorKind::InvalidPath)
/// if invalid.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use magpie_storage::validate_path;
/// // Valid paths
/// assert!(validate_path("cache/0a1b2c.json").is_ok());
/// assert!(validate_path("cache/Old Note/text-0a1b2c.json").is_ok());
/// // Invalid paths
/// assert!(validate_path("../etc/passwd").is_err());
/// assert!(validate_path("cache/../other").is_err()); // (no `..`, even harmless ones)
/// assert!(validate_path("a\0b").is_err());
/// // Paths get normalized
/// assert_eq!(
///     validate_path("cache//.//0a1b2c.json/").unwrap(),
///     Path::new("cache/0a1b2c.json")
/// );
/// // Leading separators are dropped, not rejected
/// assert_eq!(
///     validate_path("/cache/0a1b2c.json").unwrap(),
///     Path::new("cache/0a1b2c.json")
/// );
/// ```
pub fn validate(path: impl AsRef<Path>) -> Result<PathBuf> {
    // Use Rust's built-in path component parser for robust handling. Means we
    // don't have to deal with non-UTF8, or the maniacs on Unix that use
    // backslashes in their filenames.
    let mut components = Vec::new();
    for component in path.as_ref().components() {
        match component {
            Component::Normal(s) => {
                // Null bytes pass through Path::components() on Unix but cause
                // truncation in C-based syscalls — reject them explicitly.
                if s.as_encoded_bytes().contains(&0) {
                    exn::bail!(ErrorKind::InvalidPath(path.as_ref().to_path_buf()));
                }
                components.push(s)
            },
            Component::CurDir | Component::RootDir => {},
            Component::Prefix(_) | Component::ParentDir => {
                exn::bail!(ErrorKind::InvalidPath(path.as_ref().to_path_buf()))
            },
        }
    }
    match components.is_empty() {
        true => exn::bail!(ErrorKind::InvalidPath(path.as_ref().to_path_buf())),
        false => Ok(components.into_iter().collect()),
    }
}
