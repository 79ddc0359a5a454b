pub mod backend;
pub mod error;
mod models;
mod path;

pub use crate::backend::StorageBackend;
pub use crate::models::Listing;
pub use crate::path::validate as validate_path;
use std::sync::Arc;

/// Shared handle to a storage backend, cloneable across components.
pub type BackendHandle = Arc<dyn StorageBackend + Send + Sync>;
