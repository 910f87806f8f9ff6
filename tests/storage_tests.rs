//! Tests for StandaloneStorage
//!
//! These tests verify:
//! - Point reads and not-found signaling
//! - Atomic batches and rollback on failure
//! - Ordered, batched iteration within a column family
//! - Snapshot isolation for readers and iterators
//! - Column family isolation

use cfkv::codec::{CF_DEFAULT, CF_LOCK, CF_WRITE};
use cfkv::storage::{DbItem, DbIterator};
use cfkv::{Config, Context, KvError, Modify, StandaloneStorage, Storage, StorageReader};

// =============================================================================
// Helper Functions
// =============================================================================

fn setup_storage() -> StandaloneStorage {
    StandaloneStorage::in_memory(Config::default()).unwrap()
}

fn setup_storage_with_batch(batch_size: usize) -> StandaloneStorage {
    let config = Config::builder().scan_batch_size(batch_size).build();
    StandaloneStorage::in_memory(config).unwrap()
}

fn put(storage: &StandaloneStorage, cf: &str, key: &[u8], value: &[u8]) {
    storage
        .write(&Context::default(), vec![Modify::put(cf, key, value)])
        .unwrap();
}

fn get(storage: &StandaloneStorage, cf: &str, key: &[u8]) -> Option<Vec<u8>> {
    storage
        .reader(&Context::default())
        .unwrap()
        .get_cf(cf, key)
        .unwrap()
}

/// Collect every key >= `start` in `cf`
fn collect_keys<R: StorageReader>(reader: &R, cf: &str, start: &[u8]) -> Vec<Vec<u8>> {
    let mut iter = reader.iter_cf(cf).unwrap();
    iter.seek(start).unwrap();

    let mut keys = Vec::new();
    loop {
        let key = match iter.item() {
            Some(item) => item.key().to_vec(),
            None => break,
        };
        keys.push(key);
        iter.next().unwrap();
    }
    keys
}

// =============================================================================
// Point Read Tests
// =============================================================================

#[test]
fn test_get_missing_key_is_not_an_error() {
    let storage = setup_storage();

    assert_eq!(get(&storage, CF_DEFAULT, b"nothing"), None);
}

#[test]
fn test_put_overwrite() {
    let storage = setup_storage();

    put(&storage, CF_DEFAULT, b"key", b"value1");
    put(&storage, CF_DEFAULT, b"key", b"value2");

    assert_eq!(get(&storage, CF_DEFAULT, b"key"), Some(b"value2".to_vec()));
}

#[test]
fn test_empty_key_and_value() {
    let storage = setup_storage();

    put(&storage, CF_DEFAULT, b"", b"");

    assert_eq!(get(&storage, CF_DEFAULT, b""), Some(Vec::new()));
}

#[test]
fn test_invalid_cf_on_read() {
    let storage = setup_storage();
    let reader = storage.reader(&Context::default()).unwrap();

    assert!(matches!(
        reader.get_cf("bad\0cf", b"k"),
        Err(KvError::InvalidColumnFamily(_))
    ));
    assert!(matches!(reader.iter_cf(""), Err(KvError::InvalidColumnFamily(_))));
}

// =============================================================================
// Write Batch Tests
// =============================================================================

#[test]
fn test_batch_across_cfs() {
    let storage = setup_storage();

    storage
        .write(
            &Context::default(),
            vec![
                Modify::put(CF_DEFAULT, "k", "d"),
                Modify::put(CF_WRITE, "k", "w"),
                Modify::put(CF_LOCK, "k", "l"),
            ],
        )
        .unwrap();

    assert_eq!(get(&storage, CF_DEFAULT, b"k"), Some(b"d".to_vec()));
    assert_eq!(get(&storage, CF_WRITE, b"k"), Some(b"w".to_vec()));
    assert_eq!(get(&storage, CF_LOCK, b"k"), Some(b"l".to_vec()));
}

#[test]
fn test_batch_last_write_wins() {
    let storage = setup_storage();

    storage
        .write(
            &Context::default(),
            vec![
                Modify::put(CF_DEFAULT, "k", "first"),
                Modify::put(CF_DEFAULT, "k", "second"),
                Modify::put(CF_DEFAULT, "gone", "x"),
                Modify::delete(CF_DEFAULT, "gone"),
            ],
        )
        .unwrap();

    assert_eq!(get(&storage, CF_DEFAULT, b"k"), Some(b"second".to_vec()));
    assert_eq!(get(&storage, CF_DEFAULT, b"gone"), None);
}

#[test]
fn test_failed_batch_is_rolled_back() {
    let storage = setup_storage();
    put(&storage, CF_DEFAULT, b"b", b"old");

    // The third mutation fails after the first two were applied in the txn
    let result = storage.write(
        &Context::default(),
        vec![
            Modify::put(CF_DEFAULT, "a", "new"),
            Modify::delete(CF_DEFAULT, "b"),
            Modify::put("bad\0cf", "c", "x"),
        ],
    );

    assert!(matches!(result, Err(KvError::InvalidColumnFamily(_))));
    assert_eq!(get(&storage, CF_DEFAULT, b"a"), None);
    assert_eq!(get(&storage, CF_DEFAULT, b"b"), Some(b"old".to_vec()));

    // The engine keeps working after an aborted batch
    put(&storage, CF_DEFAULT, b"a", b"after");
    assert_eq!(get(&storage, CF_DEFAULT, b"a"), Some(b"after".to_vec()));
}

#[test]
fn test_delete_missing_key() {
    let storage = setup_storage();

    storage
        .write(&Context::default(), vec![Modify::delete(CF_DEFAULT, "nope")])
        .unwrap();

    assert_eq!(get(&storage, CF_DEFAULT, b"nope"), None);
}

// =============================================================================
// Iterator Tests
// =============================================================================

#[test]
fn test_iteration_order() {
    let storage = setup_storage();
    for key in [&b"c"[..], b"a", b"b", b"\xFF", b"ab"] {
        put(&storage, CF_DEFAULT, key, b"v");
    }

    let reader = storage.reader(&Context::default()).unwrap();
    let keys = collect_keys(&reader, CF_DEFAULT, b"");

    assert_eq!(
        keys,
        vec![b"a".to_vec(), b"ab".to_vec(), b"b".to_vec(), b"c".to_vec(), b"\xFF".to_vec()]
    );
}

#[test]
fn test_iterator_stays_within_cf() {
    let storage = setup_storage();
    put(&storage, "w", b"1", b"short-name");
    put(&storage, CF_WRITE, b"2", b"write");
    put(&storage, CF_DEFAULT, b"3", b"default");

    let reader = storage.reader(&Context::default()).unwrap();

    assert_eq!(collect_keys(&reader, "w", b""), vec![b"1".to_vec()]);
    assert_eq!(collect_keys(&reader, CF_WRITE, b""), vec![b"2".to_vec()]);
    assert!(collect_keys(&reader, CF_LOCK, b"").is_empty());
}

#[test]
fn test_seek_positions_at_first_key_not_less() {
    let storage = setup_storage();
    for key in ["b", "d", "f"] {
        put(&storage, CF_DEFAULT, key.as_bytes(), b"v");
    }

    let reader = storage.reader(&Context::default()).unwrap();
    let mut iter = reader.iter_cf(CF_DEFAULT).unwrap();

    assert!(!iter.valid());

    iter.seek(b"c").unwrap();
    assert_eq!(iter.item().unwrap().key(), b"d");

    iter.seek(b"d").unwrap();
    assert_eq!(iter.item().unwrap().key(), b"d");

    iter.seek(b"g").unwrap();
    assert!(!iter.valid());
    assert!(iter.item().is_none());

    // next() on an exhausted iterator is harmless
    iter.next().unwrap();
    assert!(!iter.valid());
}

#[test]
fn test_iteration_across_batches() {
    let storage = setup_storage_with_batch(3);
    for i in 0..10u8 {
        put(&storage, CF_DEFAULT, &[b'k', i], &[i]);
    }
    // Keys that sort right after a batch boundary
    put(&storage, CF_DEFAULT, &[b'k', 2, 0], b"x");
    put(&storage, CF_DEFAULT, &[b'k', 5, 0, 0], b"y");

    let reader = storage.reader(&Context::default()).unwrap();
    let keys = collect_keys(&reader, CF_DEFAULT, b"");

    assert_eq!(keys.len(), 12);
    assert!(keys.windows(2).all(|w| w[0] < w[1]));
    assert!(keys.contains(&vec![b'k', 2, 0]));
    assert!(keys.contains(&vec![b'k', 5, 0, 0]));
}

#[test]
fn test_item_value_is_read_lazily() {
    let storage = setup_storage();
    put(&storage, CF_DEFAULT, b"a", b"1");
    put(&storage, CF_DEFAULT, b"b", b"2");

    let reader = storage.reader(&Context::default()).unwrap();
    let mut iter = reader.iter_cf(CF_DEFAULT).unwrap();
    iter.seek(b"").unwrap();

    // Skip the first value entirely
    iter.next().unwrap();
    let item = iter.item().unwrap();
    assert_eq!(item.key(), b"b");
    assert_eq!(item.value().unwrap(), b"2");
}

// =============================================================================
// Snapshot Isolation Tests
// =============================================================================

#[test]
fn test_reader_does_not_see_later_writes() {
    let storage = setup_storage();
    put(&storage, CF_DEFAULT, b"k", b"before");

    let reader = storage.reader(&Context::default()).unwrap();

    storage
        .write(
            &Context::default(),
            vec![
                Modify::put(CF_DEFAULT, "k", "after"),
                Modify::put(CF_DEFAULT, "new", "x"),
            ],
        )
        .unwrap();

    assert_eq!(reader.get_cf(CF_DEFAULT, b"k").unwrap(), Some(b"before".to_vec()));
    assert_eq!(reader.get_cf(CF_DEFAULT, b"new").unwrap(), None);
    assert_eq!(collect_keys(&reader, CF_DEFAULT, b""), vec![b"k".to_vec()]);
    reader.close();

    // A reader opened afterwards sees the whole batch
    let reader = storage.reader(&Context::default()).unwrap();
    assert_eq!(reader.get_cf(CF_DEFAULT, b"k").unwrap(), Some(b"after".to_vec()));
    assert_eq!(reader.get_cf(CF_DEFAULT, b"new").unwrap(), Some(b"x".to_vec()));
}

#[test]
fn test_iterator_does_not_see_later_writes() {
    let storage = setup_storage_with_batch(1);
    put(&storage, CF_DEFAULT, b"a", b"1");
    put(&storage, CF_DEFAULT, b"c", b"3");

    let reader = storage.reader(&Context::default()).unwrap();
    let mut iter = reader.iter_cf(CF_DEFAULT).unwrap();
    iter.seek(b"").unwrap();
    assert_eq!(iter.item().unwrap().key(), b"a");

    // Lands between the current key and the next batch
    storage
        .write(
            &Context::default(),
            vec![Modify::put(CF_DEFAULT, "b", "2"), Modify::delete(CF_DEFAULT, "c")],
        )
        .unwrap();

    iter.next().unwrap();
    let item = iter.item().unwrap();
    assert_eq!(item.key(), b"c");
    assert_eq!(item.value().unwrap(), b"3");
    drop(item);

    iter.next().unwrap();
    assert!(!iter.valid());
    iter.close();
}
