//! Gossip network configuration.

use libp2p::Multiaddr;
use std::time::Duration;

/// Configuration for the gossip adapter.
#[derive(Debug, Clone)]
pub struct GossipConfig {
    /// Address to listen on.
    ///
    /// Default: `/ip4/0.0.0.0/tcp/4001`
    pub listen_address: Multiaddr,

    /// Peers to dial at startup.
    ///
    /// Default: empty (no bootstrap peers)
    pub bootstrap_peers: Vec<Multiaddr>,

    /// Gossipsub heartbeat interval.
    ///
    /// Default: 1 second
    pub heartbeat: Duration,

    /// Maximum gossip message size in bytes.
    ///
    /// Default: 1MB
    pub max_message_size: usize,

    /// Idle connection timeout.
    ///
    /// Default: 60 seconds
    pub idle_connection_timeout: Duration,
}

impl Default for GossipConfig {
    fn default() -> Self {
        Self {
            listen_address: "/ip4/0.0.0.0/tcp/4001".parse().expect("static multiaddr"),
            bootstrap_peers: vec![],
            heartbeat: Duration::from_secs(1),
            max_message_size: 1024 * 1024,
            idle_connection_timeout: Duration::from_secs(60),
        }
    }
}

impl GossipConfig {
    /// Set the listen address.
    pub fn with_listen_address(mut self, addr: Multiaddr) -> Self {
        self.listen_address = addr;
        self
    }

    /// Set the bootstrap peers.
    pub fn with_bootstrap_peers(mut self, peers: Vec<Multiaddr>) -> Self {
        self.bootstrap_peers = peers;
        self
    }

    /// Set the gossipsub heartbeat interval.
    pub fn with_heartbeat(mut self, interval: Duration) -> Self {
        self.heartbeat = interval;
        self
    }

    /// Config for local testing: loopback with an OS-assigned port.
    pub fn for_testing() -> Self {
        Self {
            listen_address: "/ip4/127.0.0.1/tcp/0".parse().expect("static multiaddr"),
            bootstrap_peers: vec![],
            heartbeat: Duration::from_millis(200),
            max_message_size: 1024 * 1024,
            idle_connection_timeout: Duration::from_secs(30),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_listens_on_protocol_port() {
        let config = GossipConfig::default();
        assert_eq!(config.listen_address.to_string(), "/ip4/0.0.0.0/tcp/4001");
        assert!(config.bootstrap_peers.is_empty());
        assert_eq!(config.heartbeat, Duration::from_secs(1));
    }

    #[test]
    fn builder_methods_override_fields() {
        let peer: Multiaddr = "/ip4/10.0.0.1/tcp/4001".parse().unwrap();
        let config = GossipConfig::default()
            .with_listen_address("/ip4/127.0.0.1/tcp/4002".parse().unwrap())
            .with_bootstrap_peers(vec![peer.clone()])
            .with_heartbeat(Duration::from_millis(500));

        assert_eq!(
            config.listen_address.to_string(),
            "/ip4/127.0.0.1/tcp/4002"
        );
        assert_eq!(config.bootstrap_peers, vec![peer]);
        assert_eq!(config.heartbeat, Duration::from_millis(500));
    }
}
