//! Gossip overlay.
//!
//! Topic-based best-effort pub/sub over libp2p gossipsub. Delivery may be
//! duplicated or reordered; the pool's hash dedup and the chain's
//! parent-hash check absorb both.

mod adapter;
mod config;

pub use adapter::{GossipService, InboundGossip, NetworkError, BLOCK_TOPIC, TX_TOPIC};
pub use config::GossipConfig;
