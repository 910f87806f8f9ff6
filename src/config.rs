//! Configuration for cfkv
//!
//! Centralized configuration with sensible defaults.

use std::path::PathBuf;

use crate::error::{KvError, Result};

/// Main configuration for a cfkv instance
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Storage Configuration
    // -------------------------------------------------------------------------
    /// Root directory for all data files
    /// Internal structure:
    ///   {data_dir}/
    ///     └── standalone/
    ///         └── kv.redb      (embedded engine file)
    pub data_dir: PathBuf,

    /// Page cache size for the embedded engine (bytes), engine default if unset
    pub cache_size: Option<usize>,

    /// fsync on every commit (true) or let the OS flush lazily (false)
    pub sync_writes: bool,

    // -------------------------------------------------------------------------
    // Read Path Configuration
    // -------------------------------------------------------------------------
    /// Number of keys an iterator pulls from the snapshot per batch
    pub scan_batch_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./cfkv_data"),
            cache_size: None,
            sync_writes: true,
            scan_batch_size: 256,
        }
    }
}

impl Config {
    const DB_DIR: &'static str = "standalone";
    const DB_FILENAME: &'static str = "kv.redb";

    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Directory holding the engine's files
    pub fn db_dir(&self) -> PathBuf {
        self.data_dir.join(Self::DB_DIR)
    }

    /// Path of the engine's database file
    pub fn db_path(&self) -> PathBuf {
        self.db_dir().join(Self::DB_FILENAME)
    }

    /// Reject settings the engine cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.data_dir.as_os_str().is_empty() {
            return Err(KvError::Config("data_dir must not be empty".to_string()));
        }
        if self.scan_batch_size == 0 {
            return Err(KvError::Config(
                "scan_batch_size must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the data directory (root for all storage)
    pub fn data_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.data_dir = path.into();
        self
    }

    /// Set the engine page cache size (in bytes)
    pub fn cache_size(mut self, bytes: usize) -> Self {
        self.config.cache_size = Some(bytes);
        self
    }

    /// Set the engine page cache size in megabytes, saturating at `usize::MAX`
    pub fn cache_size_mb(self, mb: usize) -> Self {
        self.cache_size(mb.saturating_mul(1024 * 1024))
    }

    /// Enable or disable fsync on commit
    pub fn sync_writes(mut self, sync: bool) -> Self {
        self.config.sync_writes = sync;
        self
    }

    /// Set how many keys an iterator loads per batch
    pub fn scan_batch_size(mut self, size: usize) -> Self {
        self.config.scan_batch_size = size;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
