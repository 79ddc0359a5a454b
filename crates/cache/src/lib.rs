//! Disk-backed cache for extracted document text.
//!
//! Pulling text out of PDFs, scans, and images is expensive; doing it twice
//! for an unchanged document is waste. This crate stores extraction results
//! as flat JSON records addressed by a fingerprint of the source document's
//! (path, mtime) state. The cache is not the source of truth - the documents
//! themselves are. If the cache folder is deleted, everything gets lazily
//! re-extracted on demand.
//!
//! # Architecture
//! Content addressing replaces an index:
//! - [`fingerprint`]: a pure digest of a document state. Computing an
//!   address never touches storage.
//! - [`TextCache`]: hit-or-miss reads and last-writer-wins writes of
//!   [`CacheRecord`]s over a storage backend. A hit additionally requires
//!   the stored options signature to match the current one.
//! - [`TextCache::migrate_legacy_layout`]: one-time best-effort rescue of
//!   records written under the old nested naming scheme.

pub mod error;
mod fingerprint;
mod migrate;
mod record;
mod store;

pub use crate::fingerprint::fingerprint;
pub use crate::migrate::MigrationReport;
pub use crate::record::CacheRecord;
pub use crate::store::{CacheAddress, CacheConfig, DocumentRef, TextCache};
