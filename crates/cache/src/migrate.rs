//! One-time migration of the legacy cache layout.
//!
//! Early releases nested records one subfolder per document, with the
//! fingerprint embedded in the filename as `<prefix>-<fingerprint>.<ext>`.
//! The current layout is flat: `<cache_root>/<fingerprint>.json`. This
//! pass renames whatever it can recover and leaves everything else alone.

use crate::store::{RECORD_EXTENSION, TextCache};
use std::path::Path;
use tracing::instrument;

/// Outcome counters for a legacy migration pass.
///
/// The pass as a whole never fails, so these counters are the only way to
/// observe what it did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MigrationReport {
    /// Files renamed into the flat layout.
    pub migrated: u64,
    /// Files left in place because no fingerprint could be recovered from
    /// their name.
    pub skipped: u64,
    /// Files (or whole subfolder listings) that failed with a storage
    /// error.
    pub failed: u64,
}

impl TextCache {
    /// Convert any legacy per-subfolder cache entries to the flat layout.
    ///
    /// Best-effort and idempotent. A cache root that does not exist means
    /// there is nothing to migrate and the pass is a silent no-op; every
    /// fresh installation takes that path. Per-file failures are logged
    /// and counted but never abort the batch. Emptied legacy subfolders
    /// are left behind, so a re-run finds them, finds no files inside,
    /// and does nothing.
    ///
    /// Record contents are moved verbatim, never parsed or validated.
    #[instrument(name = "converting legacy cache layout", skip(self))]
    pub async fn migrate_legacy_layout(&self) -> MigrationReport {
        let root = &self.config.cache_root;
        let mut report = MigrationReport::default();
        let Ok(listing) = self.backend.list(root).await else {
            // No root, no legacy data.
            return report;
        };
        for folder in &listing.folders {
            let files = match self.backend.list(folder).await {
                Ok(listing) => listing.files,
                Err(err) => {
                    tracing::warn!(folder = %folder.display(), error = %err, "Skipping unlistable legacy subfolder");
                    report.failed += 1;
                    continue;
                },
            };
            for file in files {
                let Some(hash) = legacy_fingerprint(&file) else {
                    report.skipped += 1;
                    continue;
                };
                let target = root.join(format!("{hash}.{RECORD_EXTENSION}"));
                match self.backend.rename(&file, &target).await {
                    Ok(()) => report.migrated += 1,
                    Err(err) => {
                        tracing::warn!(file = %file.display(), error = %err, "Failed to migrate legacy cache file");
                        report.failed += 1;
                    },
                }
            }
        }
        tracing::info!(
            migrated = report.migrated,
            skipped = report.skipped,
            failed = report.failed,
            "Converted legacy cache layout"
        );
        report
    }
}

/// Recover the fingerprint embedded in a legacy filename: the segment
/// after the last `-`, truncated at the first `.` after that.
///
/// Only the filename is consulted. Folder names may contain `-` freely
/// without confusing the split.
fn legacy_fingerprint(path: &Path) -> Option<&str> {
    let name = path.file_name()?.to_str()?;
    let (_, tail) = name.rsplit_once('-')?;
    let hash = match tail.split_once('.') {
        Some((hash, _)) => hash,
        None => tail,
    };
    (!hash.is_empty()).then_some(hash)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{CacheConfig, DocumentRef, TextCache};
    use async_trait::async_trait;
    use magpie_storage::backend::MockBackend;
    use magpie_storage::error::{ErrorKind, Result};
    use magpie_storage::{BackendHandle, Listing, StorageBackend};
    use rstest::rstest;
    use std::path::PathBuf;
    use std::sync::Arc;

    const LEGACY_RECORD: &[u8] = br#"{"path":"Old.pdf","text":"T","libVersion":"0.9.0","langs":""}"#;

    fn cache_over(backend: BackendHandle) -> TextCache {
        TextCache::new(backend, CacheConfig::new("cache", "9.9.9"))
    }

    /// Wraps a [`MockBackend`] and fails selected operations, for driving
    /// the migrator down its keep-going error paths.
    struct FlakyBackend {
        inner: MockBackend,
        fail_list_of: Option<PathBuf>,
        fail_rename_from: Option<PathBuf>,
    }

    #[async_trait]
    impl StorageBackend for FlakyBackend {
        fn name(&self) -> &str {
            self.inner.name()
        }

        async fn exists(&self, path: &Path) -> Result<bool> {
            self.inner.exists(path).await
        }

        async fn read(&self, path: &Path) -> Result<Vec<u8>> {
            self.inner.read(path).await
        }

        async fn write(&self, path: &Path, data: &[u8]) -> Result<()> {
            self.inner.write(path, data).await
        }

        async fn mkdir(&self, path: &Path) -> Result<()> {
            self.inner.mkdir(path).await
        }

        async fn list(&self, path: &Path) -> Result<Listing> {
            if self.fail_list_of.as_deref() == Some(path) {
                exn::bail!(ErrorKind::PermissionDenied(path.to_path_buf()));
            }
            self.inner.list(path).await
        }

        async fn rename(&self, from: &Path, to: &Path) -> Result<()> {
            if self.fail_rename_from.as_deref() == Some(from) {
                exn::bail!(ErrorKind::PermissionDenied(from.to_path_buf()));
            }
            self.inner.rename(from, to).await
        }
    }

    #[rstest]
    #[case::simple("note-abc123.json", Some("abc123"))]
    #[case::many_dashes("some-longer-name-abc123.json", Some("abc123"))]
    #[case::no_extension("note-abc123", Some("abc123"))]
    #[case::extra_dots("note-abc.123.json", Some("abc"))]
    #[case::leading_dash("-abc123.json", Some("abc123"))]
    #[case::no_dash("plainname.json", None)]
    #[case::empty_hash("note-.json", None)]
    fn test_legacy_fingerprint(#[case] name: &str, #[case] expected: Option<&str>) {
        assert_eq!(legacy_fingerprint(Path::new(name)), expected);
    }

    #[test]
    fn test_legacy_fingerprint_ignores_folder_names() {
        // A dash in the folder must not be mistaken for the filename split
        assert_eq!(legacy_fingerprint(Path::new("cache/Some-Folder/plain.json")), None);
        assert_eq!(legacy_fingerprint(Path::new("cache/Some-Folder/note-abc.json")), Some("abc"));
    }

    #[tokio::test]
    async fn test_migrates_legacy_entries_into_flat_layout() {
        let backend = Arc::new(MockBackend::with_files([
            ("cache/Old Note/extracted-0a1b2c.json", LEGACY_RECORD),
        ]));
        let cache = cache_over(backend.clone());
        let report = cache.migrate_legacy_layout().await;
        assert_eq!(report, MigrationReport { migrated: 1, skipped: 0, failed: 0 });
        assert!(backend.exists(Path::new("cache/0a1b2c.json")).await.unwrap());
        assert!(!backend.exists(Path::new("cache/Old Note/extracted-0a1b2c.json")).await.unwrap());
        // Contents are moved verbatim
        assert_eq!(backend.read(Path::new("cache/0a1b2c.json")).await.unwrap(), LEGACY_RECORD);
    }

    #[tokio::test]
    async fn test_unrecognized_files_are_left_in_place() {
        let backend = Arc::new(MockBackend::with_files([
            ("cache/Old Note/extracted-0a1b2c.json", LEGACY_RECORD),
            ("cache/Old Note/orphan.json", LEGACY_RECORD),
        ]));
        let cache = cache_over(backend.clone());
        let report = cache.migrate_legacy_layout().await;
        assert_eq!(report, MigrationReport { migrated: 1, skipped: 1, failed: 0 });
        assert!(backend.exists(Path::new("cache/Old Note/orphan.json")).await.unwrap());
    }

    #[tokio::test]
    async fn test_failed_renames_are_counted_but_do_not_abort() {
        let backend = Arc::new(FlakyBackend {
            inner: MockBackend::with_files([
                ("cache/Old Note/text-aaa111.json", LEGACY_RECORD),
                ("cache/Old Note/text-bbb222.json", LEGACY_RECORD),
            ]),
            fail_list_of: None,
            fail_rename_from: Some(PathBuf::from("cache/Old Note/text-aaa111.json")),
        });
        let cache = cache_over(backend.clone());
        let report = cache.migrate_legacy_layout().await;
        assert_eq!(report, MigrationReport { migrated: 1, skipped: 0, failed: 1 });
        // The stuck file stays put; its sibling still made it out
        assert!(backend.exists(Path::new("cache/Old Note/text-aaa111.json")).await.unwrap());
        assert!(!backend.exists(Path::new("cache/aaa111.json")).await.unwrap());
        assert!(backend.exists(Path::new("cache/bbb222.json")).await.unwrap());
    }

    #[tokio::test]
    async fn test_unlistable_subfolders_are_counted_and_skipped() {
        let backend = Arc::new(FlakyBackend {
            inner: MockBackend::with_files([
                ("cache/Locked/text-aaa111.json", LEGACY_RECORD),
                ("cache/Open/text-bbb222.json", LEGACY_RECORD),
            ]),
            fail_list_of: Some(PathBuf::from("cache/Locked")),
            fail_rename_from: None,
        });
        let cache = cache_over(backend.clone());
        let report = cache.migrate_legacy_layout().await;
        assert_eq!(report, MigrationReport { migrated: 1, skipped: 0, failed: 1 });
        // Files behind the unlistable folder are untouched
        assert!(backend.exists(Path::new("cache/Locked/text-aaa111.json")).await.unwrap());
        assert!(backend.exists(Path::new("cache/bbb222.json")).await.unwrap());
    }

    #[tokio::test]
    async fn test_missing_cache_root_is_a_silent_noop() {
        let cache = cache_over(Arc::new(MockBackend::default()));
        let report = cache.migrate_legacy_layout().await;
        assert_eq!(report, MigrationReport::default());
    }

    #[tokio::test]
    async fn test_migration_is_idempotent() {
        let backend = Arc::new(MockBackend::with_files([
            ("cache/Old Note/extracted-0a1b2c.json", LEGACY_RECORD),
        ]));
        let cache = cache_over(backend.clone());
        let first = cache.migrate_legacy_layout().await;
        assert_eq!(first.migrated, 1);
        let second = cache.migrate_legacy_layout().await;
        assert_eq!(second, MigrationReport::default());
        // The emptied subfolder stays behind
        let listing = backend.list(Path::new("cache")).await.unwrap();
        assert_eq!(listing.folders, vec![PathBuf::from("cache/Old Note")]);
        assert_eq!(listing.files, vec![PathBuf::from("cache/0a1b2c.json")]);
    }

    #[tokio::test]
    async fn test_fingerprint_collision_overwrites_flat_record() {
        let backend = Arc::new(MockBackend::with_files([
            ("cache/0a1b2c.json", Vec::from(*b"already flat")),
            ("cache/Old Note/extracted-0a1b2c.json", Vec::from(*b"from legacy")),
        ]));
        let cache = cache_over(backend.clone());
        let report = cache.migrate_legacy_layout().await;
        assert_eq!(report.migrated, 1);
        assert_eq!(backend.read(Path::new("cache/0a1b2c.json")).await.unwrap(), b"from legacy");
    }

    #[tokio::test]
    async fn test_only_one_subfolder_level_is_visited() {
        let backend = Arc::new(MockBackend::with_files([
            ("cache/a/b/deep-0a1b2c.json", LEGACY_RECORD),
        ]));
        let cache = cache_over(backend.clone());
        let report = cache.migrate_legacy_layout().await;
        assert_eq!(report, MigrationReport::default());
        assert!(backend.exists(Path::new("cache/a/b/deep-0a1b2c.json")).await.unwrap());
    }

    #[tokio::test]
    async fn test_flat_files_in_root_are_untouched() {
        let backend = Arc::new(MockBackend::with_files([
            ("cache/0a1b2c.json", LEGACY_RECORD),
        ]));
        let cache = cache_over(backend.clone());
        let report = cache.migrate_legacy_layout().await;
        assert_eq!(report, MigrationReport::default());
        assert!(backend.exists(Path::new("cache/0a1b2c.json")).await.unwrap());
    }

    #[tokio::test]
    async fn test_migrated_record_is_readable_at_its_current_address() {
        // A legacy file whose embedded fingerprint matches the document's
        // current state becomes a regular cache hit after migration.
        let doc = DocumentRef::new("Notes/old.pdf", 42);
        let hash = doc.fingerprint();
        let record = serde_json::json!({
            "path": "Notes/old.pdf",
            "text": "Recovered text",
            "libVersion": "0.9.0",
            "langs": "eng",
        });
        let backend = Arc::new(MockBackend::with_files([
            (format!("cache/Notes old/text-{hash}.json"), record.to_string()),
        ]));
        let cache = cache_over(backend.clone());
        let report = cache.migrate_legacy_layout().await;
        assert_eq!(report.migrated, 1);
        let hit = cache.read(&doc, "eng").await.unwrap().expect("expected a cache hit");
        assert_eq!(hit.text, "Recovered text");
    }
}
