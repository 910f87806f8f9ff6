//! Server Module
//!
//! The raw key-value API: Get, Put, Delete and Scan over column families.
//!
//! ## Architecture
//! - Each handler runs an inner function returning `Result`
//! - The response type converts from that `Result`, filling `error`
//! - Handlers never fail at the call level; engine errors ride in the response
//! - Readers and iterators are scoped to one call and dropped on every path

mod types;

pub use types::{
    KvPair, RawDeleteRequest, RawDeleteResponse, RawGetRequest, RawGetResponse, RawPutRequest,
    RawPutResponse, RawScanRequest, RawScanResponse,
};

use crate::error::{KvError, Result};
use crate::storage::{Context, DbItem, DbIterator, Modify, Storage, StorageReader};

/// Cap on up-front allocation for scan results; larger scans grow as needed
const SCAN_PREALLOC_LIMIT: usize = 1024;

/// Raw API handlers over a storage engine
pub struct Server<S: Storage> {
    storage: S,
}

impl<S: Storage> Server<S> {
    /// Create a server over the given storage
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    /// Get the underlying storage
    pub fn storage(&self) -> &S {
        &self.storage
    }

    // =========================================================================
    // Handlers
    // =========================================================================

    /// Look up one key
    pub fn raw_get(&self, req: RawGetRequest) -> RawGetResponse {
        self.get(&req)
            .inspect_err(|e| log_failure("RawGet", &req.context, e))
            .into()
    }

    /// Store one key-value pair
    pub fn raw_put(&self, req: RawPutRequest) -> RawPutResponse {
        let ctx = req.context;
        self.storage
            .write(&ctx, vec![Modify::put(req.cf, req.key, req.value)])
            .inspect_err(|e| log_failure("RawPut", &ctx, e))
            .into()
    }

    /// Remove one key (absent keys are fine)
    pub fn raw_delete(&self, req: RawDeleteRequest) -> RawDeleteResponse {
        let ctx = req.context;
        self.storage
            .write(&ctx, vec![Modify::delete(req.cf, req.key)])
            .inspect_err(|e| log_failure("RawDelete", &ctx, e))
            .into()
    }

    /// Return up to `limit` pairs with keys >= `start_key`, in key order
    pub fn raw_scan(&self, req: RawScanRequest) -> RawScanResponse {
        self.scan(&req)
            .inspect_err(|e| log_failure("RawScan", &req.context, e))
            .into()
    }

    // =========================================================================
    // Internal
    // =========================================================================

    fn get(&self, req: &RawGetRequest) -> Result<Option<Vec<u8>>> {
        let reader = self.storage.reader(&req.context)?;
        reader.get_cf(&req.cf, &req.key)
    }

    fn scan(&self, req: &RawScanRequest) -> Result<Vec<KvPair>> {
        let reader = self.storage.reader(&req.context)?;
        let mut iter = reader.iter_cf(&req.cf)?;
        iter.seek(&req.start_key)?;

        let limit = req.limit as usize;
        let mut kvs = Vec::with_capacity(limit.min(SCAN_PREALLOC_LIMIT));

        while kvs.len() < limit {
            let pair = match iter.item() {
                Some(item) => KvPair {
                    key: item.key().to_vec(),
                    value: item.value()?,
                },
                None => break,
            };
            kvs.push(pair);
            iter.next()?;
        }

        Ok(kvs)
    }
}

fn log_failure(op: &str, ctx: &Context, err: &KvError) {
    tracing::warn!(request_id = ctx.request_id, "{} failed: {}", op, err);
}
