//! RocksDB-backed store.
//!
//! All operations are synchronous blocking I/O; callers hold the chain lock
//! only for the short duration of a block commit.

use modulax_chain::{Store, StoreError};
use rocksdb::{Options, WriteBatch, DB};
use std::path::Path;

/// Production [`Store`] implementation on RocksDB.
///
/// RocksDB is internally synchronized, so all trait methods take `&self`
/// and are safe under concurrent single-key use. `write_batch` maps to a
/// native `WriteBatch`, making the block-body + tip-pointer commit atomic.
pub struct RocksDbStore {
    db: DB,
}

impl RocksDbStore {
    /// Open or create a database at the given path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        let db = DB::open(&opts, path).map_err(|e| StoreError::Backend(e.to_string()))?;
        Ok(Self { db })
    }
}

impl Store for RocksDbStore {
    fn put(&self, key: &[u8], value: &[u8]) -> Result<(), StoreError> {
        self.db
            .put(key, value)
            .map_err(|e| StoreError::Backend(e.to_string()))
    }

    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError> {
        self.db
            .get(key)
            .map_err(|e| StoreError::Backend(e.to_string()))
    }

    fn delete(&self, key: &[u8]) -> Result<(), StoreError> {
        self.db
            .delete(key)
            .map_err(|e| StoreError::Backend(e.to_string()))
    }

    fn write_batch(&self, entries: Vec<(Vec<u8>, Vec<u8>)>) -> Result<(), StoreError> {
        let mut batch = WriteBatch::default();
        for (key, value) in &entries {
            batch.put(key, value);
        }
        self.db
            .write(batch)
            .map_err(|e| StoreError::Backend(e.to_string()))
    }

    fn close(&self) -> Result<(), StoreError> {
        // Resources are released when the DB handle drops.
        Ok(())
    }
}
