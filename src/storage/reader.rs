//! Snapshot Reader
//!
//! Wraps a redb read transaction. Everything read through one reader, point
//! lookups and iterators alike, comes from the same snapshot.

use redb::{ReadOnlyTable, ReadTransaction};

use crate::codec::{cf_end_key, decode_key, encode_key, validate_cf};
use crate::error::{KvError, Result};

use super::iterator::CfIterator;
use super::standalone::DATA_TABLE;
use super::StorageReader;

/// A consistent, read-only view over every column family
pub struct StandaloneReader {
    /// The snapshot, released when the reader is dropped
    txn: ReadTransaction,

    /// Keys per iterator batch
    scan_batch_size: usize,
}

impl StandaloneReader {
    pub(crate) fn new(txn: ReadTransaction, scan_batch_size: usize) -> Self {
        Self {
            txn,
            scan_batch_size,
        }
    }

    fn table(&self) -> Result<ReadOnlyTable<&'static [u8], &'static [u8]>> {
        Ok(self.txn.open_table(DATA_TABLE)?)
    }

    /// Load up to `limit` logical keys of `cf`, starting at the first key >= `from`
    ///
    /// Only keys are copied out; values stay in the snapshot until asked for.
    pub(crate) fn load_keys(&self, cf: &str, from: &[u8], limit: usize) -> Result<Vec<Vec<u8>>> {
        let start = encode_key(cf, from)?;
        let end = cf_end_key(cf)?;
        let table = self.table()?;

        let mut keys = Vec::with_capacity(limit.min(1024));
        for entry in table.range(start.as_slice()..end.as_slice())? {
            let (physical, _) = entry?;
            let (_, logical) = decode_key(physical.value()).ok_or_else(|| {
                KvError::Corruption(format!("malformed physical key {:?}", physical.value()))
            })?;
            keys.push(logical.to_vec());

            if keys.len() >= limit {
                break;
            }
        }

        Ok(keys)
    }
}

impl StorageReader for StandaloneReader {
    type Iter<'a>
        = CfIterator<'a>
    where
        Self: 'a;

    fn get_cf(&self, cf: &str, key: &[u8]) -> Result<Option<Vec<u8>>> {
        let physical = encode_key(cf, key)?;
        let table = self.table()?;

        let value = table.get(physical.as_slice())?;
        Ok(value.map(|guard| guard.value().to_vec()))
    }

    fn iter_cf(&self, cf: &str) -> Result<Self::Iter<'_>> {
        validate_cf(cf)?;
        Ok(CfIterator::new(self, cf.to_string(), self.scan_batch_size))
    }
}
