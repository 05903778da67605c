//! Pending-transaction pool.

mod pool;

pub use pool::{PoolError, TxPool, DEFAULT_CAPACITY};
