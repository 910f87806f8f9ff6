//! Storage Module
//!
//! The contract between the service layer and the embedded engine.
//!
//! ## Responsibilities
//! - Point-in-time readers over every column family
//! - Ordered, forward-only iteration within one column family
//! - Atomic batches of Put/Delete mutations across column families
//!
//! ## Resource Model
//! ```text
//! Storage ──reader()──▶ StorageReader ──iter_cf()──▶ DbIterator
//!    │                     (snapshot)                 (borrows reader)
//!    └──write(batch)──▶ one write transaction, commit or abort
//! ```
//!
//! Readers and iterators release their snapshot when dropped, so every exit
//! path of a request gives the snapshot back.

mod iterator;
mod reader;
mod standalone;

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::Result;

pub use iterator::{CfItem, CfIterator};
pub use reader::StandaloneReader;
pub use standalone::StandaloneStorage;

// =============================================================================
// Request Context
// =============================================================================

/// Per-request metadata handed to the storage layer
///
/// Advisory only: it tags log spans and does not change consistency.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Context {
    /// Caller-chosen identifier for correlating logs
    pub request_id: u64,
}

impl Context {
    pub fn new(request_id: u64) -> Self {
        Self { request_id }
    }
}

// =============================================================================
// Write Batch
// =============================================================================

/// A single mutation inside a write batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Modify {
    /// Insert or overwrite `key` in `cf`
    Put {
        cf: String,
        key: Vec<u8>,
        value: Vec<u8>,
    },

    /// Remove `key` from `cf` (absent keys are fine)
    Delete { cf: String, key: Vec<u8> },
}

impl Modify {
    pub fn put(cf: impl Into<String>, key: impl Into<Vec<u8>>, value: impl Into<Vec<u8>>) -> Self {
        Modify::Put {
            cf: cf.into(),
            key: key.into(),
            value: value.into(),
        }
    }

    pub fn delete(cf: impl Into<String>, key: impl Into<Vec<u8>>) -> Self {
        Modify::Delete {
            cf: cf.into(),
            key: key.into(),
        }
    }

    /// Column family this mutation targets
    pub fn cf(&self) -> &str {
        match self {
            Modify::Put { cf, .. } | Modify::Delete { cf, .. } => cf,
        }
    }

    /// Logical key this mutation targets
    pub fn key(&self) -> &[u8] {
        match self {
            Modify::Put { key, .. } | Modify::Delete { key, .. } => key,
        }
    }
}

// =============================================================================
// Traits
// =============================================================================

/// A transactional, column-family aware key-value store
///
/// Implementations must be thread-safe: many readers and writers may run at
/// once, and the engine linearizes write batches.
pub trait Storage: Send + Sync {
    /// Snapshot reader type
    type Reader<'a>: StorageReader
    where
        Self: 'a;

    /// Lifecycle hook called once before serving requests
    fn start(&self) -> Result<()>;

    /// Release the engine; must be the last call on the storage
    fn stop(&self) -> Result<()>;

    /// Open a consistent snapshot over all column families
    fn reader(&self, ctx: &Context) -> Result<Self::Reader<'_>>;

    /// Apply every mutation in `batch` atomically, in order
    ///
    /// A later mutation of the same `(cf, key)` wins. On failure nothing from
    /// the batch is visible and the first error is returned.
    fn write(&self, ctx: &Context, batch: Vec<Modify>) -> Result<()>;
}

/// A point-in-time view over every column family
pub trait StorageReader {
    /// Iterator type borrowing this reader's snapshot
    type Iter<'a>: DbIterator
    where
        Self: 'a;

    /// Point lookup; `Ok(None)` when the key is absent
    fn get_cf(&self, cf: &str, key: &[u8]) -> Result<Option<Vec<u8>>>;

    /// Unpositioned iterator over one column family
    fn iter_cf(&self, cf: &str) -> Result<Self::Iter<'_>>;

    /// Release the snapshot (same as dropping the reader)
    fn close(self)
    where
        Self: Sized,
    {
        drop(self);
    }
}

/// Forward cursor over one column family
///
/// An item borrows the iterator, so take what you need from it in one
/// statement before calling `next`:
///
/// ```
/// use cfkv::storage::{DbItem, DbIterator};
/// use cfkv::{Config, Context, Modify, StandaloneStorage, Storage, StorageReader};
///
/// fn dump<R: StorageReader>(reader: &R, start: &[u8]) -> cfkv::Result<Vec<(Vec<u8>, Vec<u8>)>> {
///     let mut iter = reader.iter_cf("default")?;
///     iter.seek(start)?;
///
///     let mut pairs = Vec::new();
///     loop {
///         let pair = match iter.item() {
///             Some(item) => (item.key().to_vec(), item.value()?),
///             None => break,
///         };
///         pairs.push(pair);
///         iter.next()?;
///     }
///     Ok(pairs)
/// }
///
/// # fn main() -> cfkv::Result<()> {
/// let storage = StandaloneStorage::in_memory(Config::default())?;
/// storage.write(
///     &Context::default(),
///     vec![Modify::put("default", "user:1", "ann"), Modify::put("default", "admin", "bo")],
/// )?;
///
/// let reader = storage.reader(&Context::default())?;
/// assert_eq!(dump(&reader, b"user:")?, vec![(b"user:1".to_vec(), b"ann".to_vec())]);
/// # Ok(())
/// # }
/// ```
pub trait DbIterator {
    /// Entry type exposing the key and a lazy value accessor
    type Item<'a>: DbItem
    where
        Self: 'a;

    /// Position at the first key >= `key`; invalid if there is none
    fn seek(&mut self, key: &[u8]) -> Result<()>;

    /// True while the cursor refers to an entry
    fn valid(&self) -> bool;

    /// Current entry, `None` when not valid
    fn item(&self) -> Option<Self::Item<'_>>;

    /// Advance to the next key; invalid past the last entry
    fn next(&mut self) -> Result<()>;

    /// Release the iterator (same as dropping it)
    fn close(self)
    where
        Self: Sized,
    {
        drop(self);
    }
}

/// An iterator entry
pub trait DbItem {
    /// Logical key (CF prefix stripped)
    fn key(&self) -> &[u8];

    /// Read the value from the snapshot
    fn value(&self) -> Result<Vec<u8>>;
}

// =============================================================================
// Blanket Implementations
// =============================================================================

impl<S: Storage> Storage for Arc<S> {
    type Reader<'a>
        = S::Reader<'a>
    where
        Self: 'a;

    fn start(&self) -> Result<()> {
        (**self).start()
    }

    fn stop(&self) -> Result<()> {
        (**self).stop()
    }

    fn reader(&self, ctx: &Context) -> Result<Self::Reader<'_>> {
        (**self).reader(ctx)
    }

    fn write(&self, ctx: &Context, batch: Vec<Modify>) -> Result<()> {
        (**self).write(ctx, batch)
    }
}
