//! Configuration loading and component wiring.
//!
//! Settings are layered the usual way: compiled defaults first, then a
//! `magpie.toml` in the working directory, then `MAGPIE_*` environment
//! variables, with later layers winning. The loaded [`Settings`] double as
//! the composition root - they know how to build the storage backend and
//! the text cache on top of it.

pub mod error;

use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use magpie_cache::{CacheConfig, TextCache};
use magpie_storage::BackendHandle;
use magpie_storage::backend::LocalBackend;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;

/// Configuration file picked up from the working directory.
const CONFIG_FILE: &str = "magpie.toml";
/// Environment variable prefix: `MAGPIE_DATA_DIR`, `MAGPIE_CACHE_DIR`, etc.
const ENV_PREFIX: &str = "MAGPIE_";
/// Default cache folder, relative to the data directory.
const DEFAULT_CACHE_DIR: &str = "cache";

/// Validated magpie settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Absolute directory magpie keeps its data in; doubles as the storage
    /// backend root.
    pub data_dir: PathBuf,
    /// Cache folder, relative to `data_dir`.
    pub cache_dir: PathBuf,
    /// Version tag stamped into written cache records.
    pub producer_version: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            cache_dir: PathBuf::from(DEFAULT_CACHE_DIR),
            producer_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

impl Settings {
    /// Load settings from all layers: defaults, then [`CONFIG_FILE`], then
    /// environment variables.
    pub fn load() -> Result<Self> {
        Self::from_figment(Self::figment())
    }

    /// The untouched provider stack, for callers that want to merge layers
    /// of their own before extraction.
    pub fn figment() -> Figment {
        Figment::from(Serialized::defaults(Settings::default()))
            .merge(Toml::file(CONFIG_FILE))
            .merge(Env::prefixed(ENV_PREFIX))
    }

    /// Extract settings out of a prepared figment.
    pub fn from_figment(figment: Figment) -> Result<Self> {
        let settings: Settings = figment.extract().or_raise(|| ErrorKind::Config)?;
        tracing::debug!(
            data_dir = %settings.data_dir.display(),
            cache_dir = %settings.cache_dir.display(),
            "Loaded settings"
        );
        Ok(settings)
    }

    /// Storage backend rooted at the data directory.
    ///
    /// Creates the directory if it does not exist yet.
    pub fn backend(&self) -> Result<BackendHandle> {
        let backend = LocalBackend::new("local", &self.data_dir).or_raise(|| ErrorKind::Storage)?;
        Ok(Arc::new(backend))
    }

    /// The explicit cache configuration these settings describe.
    pub fn cache_config(&self) -> CacheConfig {
        CacheConfig::new(self.cache_dir.clone(), self.producer_version.clone())
    }

    /// Wire up the full text cache: local backend plus configured store.
    pub fn open_cache(&self) -> Result<TextCache> {
        Ok(TextCache::new(self.backend()?, self.cache_config()))
    }
}

/// Platform data directory for magpie, with a temp-dir fallback for
/// environments without a resolvable home directory (bare containers).
fn default_data_dir() -> PathBuf {
    directories::ProjectDirs::from("", "", "magpie")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| std::env::temp_dir().join("magpie"))
}
