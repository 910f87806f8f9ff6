//! Error types for cfkv
//!
//! Provides a unified error type for all operations. A missing key is never
//! an error; lookups report absence through `Option`.

use thiserror::Error;

/// Result type alias using KvError
pub type Result<T> = std::result::Result<T, KvError>;

/// Unified error type for cfkv operations
#[derive(Debug, Error)]
pub enum KvError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Engine Errors
    // -------------------------------------------------------------------------
    /// Failure reported by the embedded engine (I/O, corruption, commit)
    #[error("Engine error: {0}")]
    Engine(#[from] redb::Error),

    #[error("Data corruption detected: {0}")]
    Corruption(String),

    /// The storage was stopped and no longer owns a database handle
    #[error("Storage is closed")]
    Closed,

    // -------------------------------------------------------------------------
    // Request Errors
    // -------------------------------------------------------------------------
    #[error("Invalid column family: {0:?}")]
    InvalidColumnFamily(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

// redb reports each stage with its own error type; all of them are engine
// failures from the caller's point of view.
macro_rules! impl_from_redb {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for KvError {
                fn from(err: $ty) -> Self {
                    KvError::Engine(err.into())
                }
            }
        )*
    };
}

impl_from_redb!(
    redb::DatabaseError,
    redb::TransactionError,
    redb::TableError,
    redb::StorageError,
    redb::CommitError,
);
