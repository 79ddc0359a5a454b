//! Cache addressing, reads, and writes.

use crate::error::{ErrorKind, Result};
use crate::fingerprint::fingerprint;
use crate::record::CacheRecord;
use exn::ResultExt;
use magpie_storage::BackendHandle;
use std::path::PathBuf;

/// File extension of cache records (the serialization format).
pub(crate) const RECORD_EXTENSION: &str = "json";

/// A source document in the state the caller currently sees it: logical
/// path plus last-modification time in epoch milliseconds.
///
/// Supplied fresh by the host on every request; the cache never stats
/// documents itself. A touched document carries a new mtime, therefore a
/// new fingerprint, therefore a new address. Stale text is never found,
/// only orphaned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentRef {
    /// Logical path of the document within the host's storage.
    pub path: String,
    /// Last-modification timestamp, epoch milliseconds.
    pub mtime: i64,
}

impl DocumentRef {
    pub fn new(path: impl Into<String>, mtime: i64) -> Self {
        Self { path: path.into(), mtime }
    }

    /// Fingerprint of this document state.
    pub fn fingerprint(&self) -> String {
        fingerprint(&self.path, self.mtime)
    }
}

/// Where a document's cache record lives.
///
/// Split into folder and filename so callers can look at either half;
/// [`full_path`](CacheAddress::full_path) joins them back together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheAddress {
    /// The cache root. Every record sits directly inside it.
    pub folder: PathBuf,
    /// `<fingerprint>.json`
    pub filename: String,
}

impl CacheAddress {
    /// Full backend-relative path of the record file.
    pub fn full_path(&self) -> PathBuf {
        self.folder.join(&self.filename)
    }
}

/// Configuration handed to [`TextCache`] at construction.
///
/// Everything the store needs arrives here explicitly; there are no
/// ambient lookups at operation time.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Backend-relative folder all records live under.
    pub cache_root: PathBuf,
    /// Version tag of the extraction engine, stamped into every written
    /// record's `libVersion` field.
    pub producer_version: String,
}

impl CacheConfig {
    pub fn new(cache_root: impl Into<PathBuf>, producer_version: impl Into<String>) -> Self {
        Self {
            cache_root: cache_root.into(),
            producer_version: producer_version.into(),
        }
    }
}

/// The cache store: maps document states to record files on a storage
/// backend and answers hit-or-miss.
///
/// Holds no mutable state; every operation is an independent, short-lived
/// sequence of backend calls. Concurrent writers to the same address
/// resolve as last-writer-wins, which is fine: a record is a pure function
/// of (document state, options signature), so whoever wins wrote the same
/// truth.
pub struct TextCache {
    pub(crate) backend: BackendHandle,
    pub(crate) config: CacheConfig,
}

impl TextCache {
    pub fn new(backend: BackendHandle, config: CacheConfig) -> Self {
        Self { backend, config }
    }

    /// Compute the address a document's record lives at.
    ///
    /// Pure computation, no I/O: the address exists whether or not any
    /// record has ever been written there.
    pub fn resolve_address(&self, doc: &DocumentRef) -> CacheAddress {
        CacheAddress {
            folder: self.config.cache_root.clone(),
            filename: format!("{}.{RECORD_EXTENSION}", doc.fingerprint()),
        }
    }

    /// Look up the cached record for a document, if one exists and was
    /// produced under the same options signature.
    ///
    /// Absence is a miss, not an error. A record that exists but fails to
    /// parse is also a miss (with a warning): corruption must never block
    /// the extraction pipeline, and the caller's follow-up write replaces
    /// the bad file. Storage failures do propagate.
    pub async fn read(&self, doc: &DocumentRef, langs: &str) -> Result<Option<CacheRecord>> {
        let path = self.resolve_address(doc).full_path();
        if !self.backend.exists(&path).await.or_raise(|| ErrorKind::Storage)? {
            return Ok(None);
        }
        let raw = self.backend.read(&path).await.or_raise(|| ErrorKind::Storage)?;
        let record: CacheRecord = match serde_json::from_slice(&raw) {
            Ok(record) => record,
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "Discarding malformed cache record");
                return Ok(None);
            },
        };
        if record.langs != langs {
            tracing::debug!(
                path = %path.display(),
                stored = %record.langs,
                current = %langs,
                "Cache record was produced under a different options signature"
            );
            return Ok(None);
        }
        Ok(Some(record))
    }

    /// Persist an extraction result at a previously resolved address.
    ///
    /// Unconditionally replaces whatever record is already there. The
    /// cache folder is created first if missing.
    pub async fn write(&self, address: &CacheAddress, text: &str, original_path: &str, langs: &str) -> Result<()> {
        let record = CacheRecord {
            path: original_path.to_string(),
            text: text.to_string(),
            lib_version: self.config.producer_version.clone(),
            langs: langs.to_string(),
        };
        let data = serde_json::to_vec(&record).or_raise(|| ErrorKind::Encode)?;
        self.backend.mkdir(&address.folder).await.or_raise(|| ErrorKind::Storage)?;
        self.backend.write(&address.full_path(), &data).await.or_raise(|| ErrorKind::Storage)?;
        tracing::debug!(path = %address.full_path().display(), bytes = data.len(), "Wrote cache record");
        Ok(())
    }
}
