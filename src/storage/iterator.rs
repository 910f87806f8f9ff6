//! Column-family Iterator
//!
//! Forward cursor over one column family of a reader's snapshot.
//!
//! Keys are pulled from the snapshot in batches of `scan_batch_size`, so a
//! cursor never holds a whole column family in memory. The next batch starts
//! at the immediate successor of the last key seen (`last ++ 0x00`). Values
//! are only read when `CfItem::value()` is called.

use crate::codec::successor;
use crate::error::{KvError, Result};

use super::reader::StandaloneReader;
use super::{DbItem, DbIterator, StorageReader};

/// Cursor over the logical keys of one column family
pub struct CfIterator<'a> {
    /// Reader whose snapshot this cursor walks
    reader: &'a StandaloneReader,

    /// Column family being iterated
    cf: String,

    /// Current batch of logical keys, ascending
    batch: Vec<Vec<u8>>,

    /// Index of the current key in `batch`
    position: usize,

    /// Whether the snapshot may hold keys past the current batch
    has_more: bool,

    /// Maximum keys per batch
    batch_size: usize,
}

impl<'a> CfIterator<'a> {
    /// Create an unpositioned iterator; call `seek` before reading
    pub(crate) fn new(reader: &'a StandaloneReader, cf: String, batch_size: usize) -> Self {
        Self {
            reader,
            cf,
            batch: Vec::new(),
            position: 0,
            has_more: false,
            batch_size: batch_size.max(1),
        }
    }

    /// Replace the batch with keys >= `from`
    fn load_from(&mut self, from: &[u8]) -> Result<()> {
        // Stay invalid if the load fails
        self.batch.clear();
        self.position = 0;
        self.has_more = false;

        self.batch = self.reader.load_keys(&self.cf, from, self.batch_size)?;
        self.has_more = self.batch.len() >= self.batch_size;
        Ok(())
    }

    /// Column family this iterator walks
    pub fn cf(&self) -> &str {
        &self.cf
    }
}

impl DbIterator for CfIterator<'_> {
    type Item<'b>
        = CfItem<'b>
    where
        Self: 'b;

    fn seek(&mut self, key: &[u8]) -> Result<()> {
        self.load_from(key)
    }

    fn valid(&self) -> bool {
        self.position < self.batch.len()
    }

    fn item(&self) -> Option<Self::Item<'_>> {
        self.batch.get(self.position).map(|key| CfItem {
            reader: self.reader,
            cf: &self.cf,
            key: key.as_slice(),
        })
    }

    fn next(&mut self) -> Result<()> {
        if !self.valid() {
            return Ok(());
        }

        self.position += 1;
        if self.position == self.batch.len() && self.has_more {
            let from = successor(&self.batch[self.position - 1]);
            self.load_from(&from)?;
        }
        Ok(())
    }
}

/// The entry under a `CfIterator`
pub struct CfItem<'a> {
    reader: &'a StandaloneReader,
    cf: &'a str,
    key: &'a [u8],
}

impl DbItem for CfItem<'_> {
    fn key(&self) -> &[u8] {
        self.key
    }

    fn value(&self) -> Result<Vec<u8>> {
        // The snapshot cannot change, so a listed key must still be there
        self.reader.get_cf(self.cf, self.key)?.ok_or_else(|| {
            KvError::Corruption(format!(
                "key {:?} listed in {:?} but missing from snapshot",
                self.key, self.cf
            ))
        })
    }
}
