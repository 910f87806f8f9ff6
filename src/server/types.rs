//! Request and response types for the raw API
//!
//! Each response converts from the `Result` its handler produces. That
//! conversion is the only place an error turns into the `error` string.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::storage::Context;

// =============================================================================
// Requests
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawGetRequest {
    pub context: Context,
    pub cf: String,
    pub key: Vec<u8>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawPutRequest {
    pub context: Context,
    pub cf: String,
    pub key: Vec<u8>,
    pub value: Vec<u8>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawDeleteRequest {
    pub context: Context,
    pub cf: String,
    pub key: Vec<u8>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawScanRequest {
    pub context: Context,
    pub cf: String,
    /// First key to return (inclusive)
    pub start_key: Vec<u8>,
    /// Maximum number of pairs to return
    pub limit: u32,
}

// =============================================================================
// Responses
// =============================================================================

/// Response to a point lookup
///
/// `not_found` is set when the key is absent; absence is not an error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawGetResponse {
    pub value: Vec<u8>,
    pub not_found: bool,
    /// Empty on success
    pub error: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawPutResponse {
    pub error: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawDeleteResponse {
    pub error: String,
}

/// A key-value pair returned by a scan
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KvPair {
    pub key: Vec<u8>,
    pub value: Vec<u8>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawScanResponse {
    pub kvs: Vec<KvPair>,
    pub error: String,
}

impl RawGetResponse {
    /// Create a NOT_FOUND response
    pub fn not_found() -> Self {
        Self {
            not_found: true,
            ..Self::default()
        }
    }
}

// =============================================================================
// Result -> Response
// =============================================================================

impl From<Result<Option<Vec<u8>>>> for RawGetResponse {
    fn from(result: Result<Option<Vec<u8>>>) -> Self {
        match result {
            Ok(Some(value)) => Self {
                value,
                ..Self::default()
            },
            Ok(None) => Self::not_found(),
            Err(e) => Self {
                error: e.to_string(),
                ..Self::default()
            },
        }
    }
}

impl From<Result<()>> for RawPutResponse {
    fn from(result: Result<()>) -> Self {
        Self {
            error: error_message(result),
        }
    }
}

impl From<Result<()>> for RawDeleteResponse {
    fn from(result: Result<()>) -> Self {
        Self {
            error: error_message(result),
        }
    }
}

impl From<Result<Vec<KvPair>>> for RawScanResponse {
    fn from(result: Result<Vec<KvPair>>) -> Self {
        match result {
            Ok(kvs) => Self {
                kvs,
                error: String::new(),
            },
            Err(e) => Self {
                kvs: Vec::new(),
                error: e.to_string(),
            },
        }
    }
}

fn error_message(result: Result<()>) -> String {
    result.err().map(|e| e.to_string()).unwrap_or_default()
}
