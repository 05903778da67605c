//! Modulax node runtime.
//!
//! Wraps the deterministic chain core with real I/O:
//!
//! - RocksDB persistence ([`RocksDbStore`])
//! - libp2p gossipsub networking ([`network`])
//! - JSON-RPC 2.0 over HTTP ([`rpc`])
//! - the periodic block [`Proposer`]
//! - the [`Node`] runner that wires everything together
//!
//! plus the operator-facing pieces: the wallet keystore, the cipher address
//! display encoding, the JSON-RPC client and the `modulax` CLI binary.
//!
//! # Architecture
//!
//! Three long-lived tasks (proposer, gossip swarm loop, ingest loop) and the
//! RPC server share the same `Blockchain` / `TxPool` instances. The
//! blockchain sits behind one mutex, held for the whole of a block
//! application, so proposer ticks and peer-block ingest linearize. All tasks
//! watch one process-wide shutdown signal.

pub mod cipher;
mod client;
mod config;
pub mod keystore;
pub mod network;
mod proposer;
pub mod rpc;
mod runner;
mod storage;
pub mod telemetry;

pub use client::{ClientError, RpcClient};
pub use config::NodeConfig;
pub use proposer::{Proposer, DEFAULT_PROPOSAL_INTERVAL};
pub use runner::{on_remote_block, on_remote_transaction, Broadcast, Node, NodeError};
pub use storage::RocksDbStore;
