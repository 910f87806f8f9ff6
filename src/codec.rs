//! Column-Family Key Codec
//!
//! Every column family shares one physical table in the engine. A logical
//! key is stored under its CF name followed by a separator byte:
//!
//! ```text
//! ┌──────────────────┬──────┬──────────────────────┐
//! │  CF name (utf8)  │ 0x00 │     logical key      │
//! └──────────────────┴──────┴──────────────────────┘
//! ```
//!
//! CF names may not contain the separator, so no CF prefix is a prefix of
//! another and all keys of one CF sit in `[cf 0x00, cf 0x01)`.

use crate::error::{KvError, Result};

/// Separator byte between CF name and logical key
pub const KEY_SEPARATOR: u8 = 0x00;

pub const CF_DEFAULT: &str = "default";
pub const CF_WRITE: &str = "write";
pub const CF_LOCK: &str = "lock";

/// Well-known column families
pub const CFS: [&str; 3] = [CF_DEFAULT, CF_WRITE, CF_LOCK];

/// Check that a CF name can be encoded without ambiguity
pub fn validate_cf(cf: &str) -> Result<()> {
    if cf.is_empty() || cf.as_bytes().contains(&KEY_SEPARATOR) {
        return Err(KvError::InvalidColumnFamily(cf.to_string()));
    }
    Ok(())
}

/// Encode a CF name and logical key into a physical key
pub fn encode_key(cf: &str, key: &[u8]) -> Result<Vec<u8>> {
    validate_cf(cf)?;
    let mut encoded = Vec::with_capacity(cf.len() + 1 + key.len());
    encoded.extend_from_slice(cf.as_bytes());
    encoded.push(KEY_SEPARATOR);
    encoded.extend_from_slice(key);
    Ok(encoded)
}

/// Split a physical key into its CF name and logical key
///
/// Returns `None` if the key has no separator or the CF is not UTF-8.
pub fn decode_key(encoded: &[u8]) -> Option<(&str, &[u8])> {
    let sep_pos = encoded.iter().position(|&b| b == KEY_SEPARATOR)?;
    let cf = std::str::from_utf8(&encoded[..sep_pos]).ok()?;
    Some((cf, &encoded[sep_pos + 1..]))
}

/// First physical key that can belong to `cf`
pub fn cf_start_key(cf: &str) -> Result<Vec<u8>> {
    encode_key(cf, &[])
}

/// First physical key past every key of `cf` (exclusive upper bound)
pub fn cf_end_key(cf: &str) -> Result<Vec<u8>> {
    validate_cf(cf)?;
    let mut key = Vec::with_capacity(cf.len() + 1);
    key.extend_from_slice(cf.as_bytes());
    key.push(KEY_SEPARATOR + 1);
    Ok(key)
}

/// Smallest logical key strictly greater than `key`
pub(crate) fn successor(key: &[u8]) -> Vec<u8> {
    let mut next = Vec::with_capacity(key.len() + 1);
    next.extend_from_slice(key);
    next.push(0x00);
    next
}
