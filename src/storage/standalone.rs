//! Standalone Storage
//!
//! A single-node `Storage` backed by redb. All column families live in one
//! physical table; the codec keeps their key ranges apart.
//!
//! ## Concurrency
//! - Readers: redb read transactions, any number at once, each pinned to the
//!   snapshot that was current when it began
//! - Writers: redb serializes write transactions, so batches are linearized
//! - `db`: `RwLock<Option<Database>>`, read-locked only while a transaction
//!   is being started, write-locked by `stop()` to release the handle

use std::fs;
use std::path::PathBuf;

use parking_lot::RwLock;
use redb::backends::InMemoryBackend;
use redb::{Database, Durability, TableDefinition, WriteTransaction};

use crate::codec::encode_key;
use crate::config::Config;
use crate::error::{KvError, Result};

use super::reader::StandaloneReader;
use super::{Context, Modify, Storage};

/// The physical table holding every column family
pub(crate) const DATA_TABLE: TableDefinition<'static, &[u8], &[u8]> =
    TableDefinition::new("cf_data");

/// Single-node storage engine
pub struct StandaloneStorage {
    /// Engine configuration
    config: Config,

    /// Database handle, `None` once stopped
    db: RwLock<Option<Database>>,
}

impl StandaloneStorage {
    /// Open or create the store under `config.data_dir`
    ///
    /// On startup:
    /// 1. Validate config
    /// 2. Create `{data_dir}/standalone/` if it doesn't exist
    /// 3. Open or create the database file
    /// 4. Make sure the data table exists
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;

        fs::create_dir_all(config.db_dir())?;

        let mut builder = Database::builder();
        if let Some(cache_size) = config.cache_size {
            builder.set_cache_size(cache_size);
        }
        let db = builder.create(config.db_path())?;

        tracing::info!("Opened standalone storage at {}", config.db_path().display());

        Self::with_database(config, db)
    }

    /// Open a store that lives only in memory (for tests)
    pub fn in_memory(config: Config) -> Result<Self> {
        config.validate()?;

        let db = Database::builder().create_with_backend(InMemoryBackend::new())?;

        tracing::debug!("Opened in-memory standalone storage");

        Self::with_database(config, db)
    }

    fn with_database(config: Config, db: Database) -> Result<Self> {
        // Readers open the table by name; create it before the first reader
        let txn = db.begin_write()?;
        txn.open_table(DATA_TABLE)?;
        txn.commit()?;

        Ok(Self {
            config,
            db: RwLock::new(Some(db)),
        })
    }

    /// Apply a batch inside an open write transaction
    fn apply_batch(txn: &WriteTransaction, batch: &[Modify]) -> Result<()> {
        let mut table = txn.open_table(DATA_TABLE)?;

        for modify in batch {
            let physical = encode_key(modify.cf(), modify.key())?;
            match modify {
                Modify::Put { value, .. } => {
                    table.insert(physical.as_slice(), value.as_slice())?;
                }
                Modify::Delete { .. } => {
                    table.remove(physical.as_slice())?;
                }
            }
        }

        Ok(())
    }

    fn durability(&self) -> Durability {
        if self.config.sync_writes {
            Durability::Immediate
        } else {
            Durability::Eventual
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Path of the database file
    pub fn db_path(&self) -> PathBuf {
        self.config.db_path()
    }

    /// Whether `stop()` has released the database
    pub fn is_stopped(&self) -> bool {
        self.db.read().is_none()
    }
}

impl Storage for StandaloneStorage {
    type Reader<'a> = StandaloneReader;

    fn start(&self) -> Result<()> {
        if self.is_stopped() {
            return Err(KvError::Closed);
        }
        tracing::debug!("Standalone storage started");
        Ok(())
    }

    fn stop(&self) -> Result<()> {
        match self.db.write().take() {
            Some(db) => {
                drop(db);
                tracing::info!("Standalone storage stopped");
            }
            None => tracing::debug!("Standalone storage already stopped"),
        }
        Ok(())
    }

    fn reader(&self, ctx: &Context) -> Result<Self::Reader<'_>> {
        let txn = {
            let db = self.db.read();
            db.as_ref().ok_or(KvError::Closed)?.begin_read()?
        };

        tracing::trace!(request_id = ctx.request_id, "Opened snapshot reader");

        Ok(StandaloneReader::new(txn, self.config.scan_batch_size))
    }

    fn write(&self, ctx: &Context, batch: Vec<Modify>) -> Result<()> {
        if batch.is_empty() {
            return Ok(());
        }

        let mut txn = {
            let db = self.db.read();
            db.as_ref().ok_or(KvError::Closed)?.begin_write()?
        };
        txn.set_durability(self.durability());

        tracing::debug!(
            request_id = ctx.request_id,
            mutations = batch.len(),
            "Applying write batch"
        );

        match Self::apply_batch(&txn, &batch) {
            Ok(()) => {
                txn.commit()?;
                Ok(())
            }
            Err(err) => {
                // Nothing from the batch may become visible
                if let Err(abort_err) = txn.abort() {
                    tracing::warn!("Failed to abort write transaction: {}", abort_err);
                }
                Err(err)
            }
        }
    }
}
