//! Modulax chain core.
//!
//! Owns the deterministic part of the node: the account [`State`], the
//! [`Executor`] state-transition seam, and the [`Blockchain`] that extends
//! the chain and persists it through a byte-keyed [`Store`].
//!
//! Concurrency contract: a `Blockchain` is not internally synchronized —
//! callers serialize `add_block` / `add_existing_block` behind one mutex.
//! The [`StateView`] handed to the pool and the RPC layer takes read locks
//! on the shared state and may observe it mid-update; those reads are
//! advisory, the executor recheck at block application time is
//! authoritative.

mod blockchain;
mod executor;
mod state;
mod store;

pub use blockchain::{
    genesis_block, genesis_wallet, Blockchain, ChainError, GENESIS_PRIVATE_KEY, GENESIS_SUPPLY,
};
pub use executor::{ExecError, Executor, TransferExecutor};
pub use state::{SharedState, State, StateView};
pub use store::{MemoryStore, Store, StoreError};
