//! Cache Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction. Storage failures are raised into
//! cache errors with their own `Exn` frames preserved as children.

use derive_more::{Display, Error};

/// A cache error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for cache operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The storage backend failed beneath a cache operation.
    #[display("storage error")]
    Storage,
    /// A record could not be serialized for writing.
    #[display("unwritable cache record")]
    Encode,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Storage)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        assert_eq!(ErrorKind::Storage.to_string(), "storage error");
        assert_eq!(ErrorKind::Encode.to_string(), "unwritable cache record");
    }

    #[test]
    fn test_retryable() {
        assert!(ErrorKind::Storage.is_retryable());
        assert!(!ErrorKind::Encode.is_retryable());
    }
}
