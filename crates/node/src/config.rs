//! Node configuration.

use crate::network::GossipConfig;
use crate::proposer::DEFAULT_PROPOSAL_INTERVAL;
use crate::rpc::RpcServerConfig;
use std::path::PathBuf;
use std::time::Duration;

/// Top-level configuration for a node.
#[derive(Debug, Clone)]
pub struct NodeConfig {
    /// Chain database directory.
    ///
    /// Default: `./modulax_chain`
    pub db_path: PathBuf,

    /// Gossip network settings.
    pub gossip: GossipConfig,

    /// JSON-RPC server settings.
    pub rpc: RpcServerConfig,

    /// Block proposal period.
    ///
    /// Default: 5 seconds
    pub proposal_interval: Duration,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from("./modulax_chain"),
            gossip: GossipConfig::default(),
            rpc: RpcServerConfig::default(),
            proposal_interval: DEFAULT_PROPOSAL_INTERVAL,
        }
    }
}

impl NodeConfig {
    pub fn with_db_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.db_path = path.into();
        self
    }

    pub fn with_gossip(mut self, gossip: GossipConfig) -> Self {
        self.gossip = gossip;
        self
    }

    pub fn with_rpc(mut self, rpc: RpcServerConfig) -> Self {
        self.rpc = rpc;
        self
    }

    pub fn with_proposal_interval(mut self, interval: Duration) -> Self {
        self.proposal_interval = interval;
        self
    }
}
