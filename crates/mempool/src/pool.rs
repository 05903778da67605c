//! The transaction pool.

use modulax_types::{AccountReader, Hash, Transaction};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

/// Default pool capacity.
pub const DEFAULT_CAPACITY: usize = 1024;

/// Admission failures.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PoolError {
    #[error("transaction pool is full")]
    PoolFull,

    #[error("transaction {0} already in pool")]
    Duplicate(Hash),

    #[error("invalid transaction signature")]
    InvalidSignature,

    #[error("invalid nonce: expected {expected}, got {got}")]
    InvalidNonce { expected: u64, got: u64 },

    #[error("insufficient funds for transfer")]
    InsufficientFunds,
}

/// Bounded set of admitted-but-unincluded transactions, keyed by hash.
///
/// Thread-safe: `pending` takes a read lock, `add`/`clear` a write lock.
/// Admission consults the read-only account view while holding the write
/// lock; those reads are advisory — the executor recheck at block
/// application time is authoritative.
pub struct TxPool {
    all: RwLock<HashMap<Hash, Transaction>>,
    state: Arc<dyn AccountReader>,
    capacity: usize,
}

impl TxPool {
    /// Pool with the default capacity.
    pub fn new(state: Arc<dyn AccountReader>) -> Self {
        Self::with_capacity(state, DEFAULT_CAPACITY)
    }

    pub fn with_capacity(state: Arc<dyn AccountReader>, capacity: usize) -> Self {
        Self {
            all: RwLock::new(HashMap::new()),
            state,
            capacity,
        }
    }

    /// Admit a transaction.
    ///
    /// Checks, in order: capacity, duplicate hash, signature, sender nonce,
    /// sender balance. Returns the transaction hash on success.
    pub fn add(&self, tx: Transaction) -> Result<Hash, PoolError> {
        let mut all = self.all.write();

        if all.len() >= self.capacity {
            return Err(PoolError::PoolFull);
        }
        if all.contains_key(&tx.hash) {
            return Err(PoolError::Duplicate(tx.hash));
        }
        if !tx.verify() {
            return Err(PoolError::InvalidSignature);
        }

        let sender = self.state.account(&tx.sender());
        if tx.nonce != sender.nonce {
            return Err(PoolError::InvalidNonce {
                expected: sender.nonce,
                got: tx.nonce,
            });
        }
        if sender.balance < tx.value {
            return Err(PoolError::InsufficientFunds);
        }

        let hash = tx.hash;
        all.insert(hash, tx);
        debug!(%hash, pool_size = all.len(), "transaction admitted");
        Ok(hash)
    }

    /// Snapshot of all pending transactions, sorted by hash.
    ///
    /// The deterministic order means two nodes holding the same pool
    /// propose byte-identical transaction sequences.
    pub fn pending(&self) -> Vec<Transaction> {
        let mut txs: Vec<_> = self.all.read().values().cloned().collect();
        txs.sort_by_key(|tx| tx.hash);
        txs
    }

    /// Drop every pending transaction.
    pub fn clear(&self) {
        self.all.write().clear();
    }

    pub fn contains(&self, hash: &Hash) -> bool {
        self.all.read().contains_key(hash)
    }

    pub fn len(&self) -> usize {
        self.all.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.all.read().is_empty()
    }
}
