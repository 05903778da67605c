//! libp2p gossip adapter.
//!
//! A background task owns the swarm; the [`GossipService`] handle talks to
//! it over a command channel and inbound messages flow back over an mpsc
//! receiver. Messages published by the local peer are dropped on receipt,
//! everything else is forwarded raw — decoding happens at the ingest layer.

use super::config::GossipConfig;
use futures::StreamExt;
use libp2p::gossipsub::{self, IdentTopic, TopicHash};
use libp2p::swarm::SwarmEvent;
use libp2p::{noise, tcp, yamux, Multiaddr, PeerId, Swarm, SwarmBuilder};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

/// Version-tagged topic carrying encoded blocks.
pub const BLOCK_TOPIC: &str = "/modulax/blocks/1.0.0";

/// Version-tagged topic carrying encoded transactions.
pub const TX_TOPIC: &str = "/modulax/txs/1.0.0";

/// Network errors.
#[derive(Debug, thiserror::Error)]
pub enum NetworkError {
    #[error("network error: {0}")]
    Other(String),

    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    #[error("network shutdown")]
    Shutdown,
}

/// A message received from a peer, tagged by topic.
#[derive(Debug)]
pub enum InboundGossip {
    /// Encoded block bytes from the blocks topic.
    Block(Vec<u8>),
    /// Encoded transaction bytes from the transactions topic.
    Transaction(Vec<u8>),
}

/// Commands sent to the swarm task.
enum SwarmCommand {
    Publish {
        topic: &'static str,
        data: Vec<u8>,
    },
    Dial {
        address: Multiaddr,
    },
    GetListenAddresses {
        response_tx: oneshot::Sender<Vec<Multiaddr>>,
    },
}

/// Handle to the gossip overlay.
pub struct GossipService {
    local_peer_id: PeerId,
    command_tx: mpsc::UnboundedSender<SwarmCommand>,
    shutdown_tx: mpsc::Sender<()>,
}

impl GossipService {
    /// Build the swarm, subscribe to both topics, dial bootstrap peers and
    /// spawn the event loop.
    ///
    /// Returns the service handle and the receiver of inbound messages.
    /// Must be called from within a tokio runtime.
    pub fn start(
        config: GossipConfig,
    ) -> Result<(Self, mpsc::Receiver<InboundGossip>), NetworkError> {
        let gossipsub_config = gossipsub::ConfigBuilder::default()
            .heartbeat_interval(config.heartbeat)
            .validation_mode(gossipsub::ValidationMode::Strict)
            .max_transmit_size(config.max_message_size)
            .build()
            .map_err(|e| NetworkError::Other(e.to_string()))?;

        let mut swarm = SwarmBuilder::with_new_identity()
            .with_tokio()
            .with_tcp(
                tcp::Config::default(),
                noise::Config::new,
                yamux::Config::default,
            )
            .map_err(|e| NetworkError::Other(e.to_string()))?
            .with_behaviour(|key| {
                gossipsub::Behaviour::new(
                    gossipsub::MessageAuthenticity::Signed(key.clone()),
                    gossipsub_config,
                )
            })
            .map_err(|e| NetworkError::Other(e.to_string()))?
            .with_swarm_config(|c| c.with_idle_connection_timeout(config.idle_connection_timeout))
            .build();

        let local_peer_id = *swarm.local_peer_id();
        info!(peer_id = %local_peer_id, "created gossip node");

        for topic in [BLOCK_TOPIC, TX_TOPIC] {
            swarm
                .behaviour_mut()
                .subscribe(&IdentTopic::new(topic))
                .map_err(|e| NetworkError::Other(format!("subscribe {topic}: {e:?}")))?;
            info!(topic, "subscribed to gossip topic");
        }

        swarm
            .listen_on(config.listen_address.clone())
            .map_err(|e| NetworkError::Other(e.to_string()))?;

        for addr in &config.bootstrap_peers {
            swarm
                .dial(addr.clone())
                .map_err(|e| NetworkError::ConnectionFailed(e.to_string()))?;
            info!(address = %addr, "dialing bootstrap peer");
        }

        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (inbound_tx, inbound_rx) = mpsc::channel(256);
        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);

        tokio::spawn(event_loop(
            swarm,
            command_rx,
            inbound_tx,
            shutdown_rx,
            local_peer_id,
        ));

        Ok((
            Self {
                local_peer_id,
                command_tx,
                shutdown_tx,
            },
            inbound_rx,
        ))
    }

    /// Best-effort publish of an encoded block.
    pub fn broadcast_block(&self, data: Vec<u8>) -> Result<(), NetworkError> {
        self.publish(BLOCK_TOPIC, data)
    }

    /// Best-effort publish of an encoded transaction.
    pub fn broadcast_transaction(&self, data: Vec<u8>) -> Result<(), NetworkError> {
        self.publish(TX_TOPIC, data)
    }

    fn publish(&self, topic: &'static str, data: Vec<u8>) -> Result<(), NetworkError> {
        self.command_tx
            .send(SwarmCommand::Publish { topic, data })
            .map_err(|_| NetworkError::Shutdown)
    }

    /// Dial a peer address.
    pub fn dial(&self, address: Multiaddr) -> Result<(), NetworkError> {
        self.command_tx
            .send(SwarmCommand::Dial { address })
            .map_err(|_| NetworkError::Shutdown)
    }

    /// Addresses the swarm is currently listening on.
    pub async fn listen_addresses(&self) -> Vec<Multiaddr> {
        let (tx, rx) = oneshot::channel();
        if self
            .command_tx
            .send(SwarmCommand::GetListenAddresses { response_tx: tx })
            .is_err()
        {
            return vec![];
        }
        rx.await.unwrap_or_default()
    }

    /// The local peer ID.
    pub fn local_peer_id(&self) -> PeerId {
        self.local_peer_id
    }

    /// Stop the swarm event loop.
    pub async fn shutdown(&self) {
        let _ = self.shutdown_tx.send(()).await;
    }
}

/// Background loop owning the swarm.
async fn event_loop(
    mut swarm: Swarm<gossipsub::Behaviour>,
    mut command_rx: mpsc::UnboundedReceiver<SwarmCommand>,
    inbound_tx: mpsc::Sender<InboundGossip>,
    mut shutdown_rx: mpsc::Receiver<()>,
    local_peer_id: PeerId,
) {
    let block_topic: TopicHash = IdentTopic::new(BLOCK_TOPIC).hash();
    let tx_topic: TopicHash = IdentTopic::new(TX_TOPIC).hash();

    loop {
        tokio::select! {
            _ = shutdown_rx.recv() => {
                info!("shutting down gossip event loop");
                break;
            }

            Some(cmd) = command_rx.recv() => match cmd {
                SwarmCommand::Publish { topic, data } => {
                    if let Err(e) = swarm.behaviour_mut().publish(IdentTopic::new(topic), data) {
                        match e {
                            // Best-effort delivery: a lonely node is fine.
                            gossipsub::PublishError::InsufficientPeers => {
                                debug!(topic, "no peers to publish to");
                            }
                            other => warn!(topic, error = %other, "publish failed"),
                        }
                    }
                }
                SwarmCommand::Dial { address } => {
                    if let Err(e) = swarm.dial(address.clone()) {
                        warn!(address = %address, error = %e, "dial failed");
                    }
                }
                SwarmCommand::GetListenAddresses { response_tx } => {
                    let addrs = swarm.listeners().cloned().collect();
                    let _ = response_tx.send(addrs);
                }
            },

            event = swarm.select_next_some() => match event {
                SwarmEvent::Behaviour(gossipsub::Event::Message { message, .. }) => {
                    // Drop our own publishes echoed back by the mesh.
                    if message.source == Some(local_peer_id) {
                        continue;
                    }
                    let inbound = if message.topic == block_topic {
                        InboundGossip::Block(message.data)
                    } else if message.topic == tx_topic {
                        InboundGossip::Transaction(message.data)
                    } else {
                        debug!(topic = %message.topic, "message on unknown topic");
                        continue;
                    };
                    if inbound_tx.send(inbound).await.is_err() {
                        debug!("inbound channel closed, stopping gossip loop");
                        break;
                    }
                }
                SwarmEvent::NewListenAddr { address, .. } => {
                    info!(address = %address, "listening");
                }
                SwarmEvent::ConnectionEstablished { peer_id, .. } => {
                    info!(peer = %peer_id, "peer connected");
                }
                SwarmEvent::ConnectionClosed { peer_id, .. } => {
                    debug!(peer = %peer_id, "peer disconnected");
                }
                _ => {}
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn starts_and_reports_listen_address() {
        let (service, _inbound) = GossipService::start(GossipConfig::for_testing()).unwrap();

        // The listener address shows up once the swarm has bound the socket.
        let mut addrs = vec![];
        for _ in 0..50 {
            addrs = service.listen_addresses().await;
            if !addrs.is_empty() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        assert!(!addrs.is_empty(), "swarm never bound a listen address");

        service.shutdown().await;
    }

    #[tokio::test]
    async fn two_nodes_exchange_gossip() {
        let (node_a, _inbound_a) = GossipService::start(GossipConfig::for_testing()).unwrap();
        let (node_b, mut inbound_b) = GossipService::start(GossipConfig::for_testing()).unwrap();

        // Wait for A's listener, then dial it from B.
        let mut addrs = vec![];
        for _ in 0..50 {
            addrs = node_a.listen_addresses().await;
            if !addrs.is_empty() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        node_b.dial(addrs[0].clone()).unwrap();

        // Publish until the mesh forms and B sees the message.
        let received = async {
            loop {
                let _ = node_a.broadcast_transaction(b"tx bytes".to_vec());
                tokio::select! {
                    msg = inbound_b.recv() => break msg,
                    _ = tokio::time::sleep(Duration::from_millis(200)) => {}
                }
            }
        };
        let msg = tokio::time::timeout(Duration::from_secs(20), received)
            .await
            .expect("no gossip received")
            .expect("inbound channel closed");

        match msg {
            InboundGossip::Transaction(data) => assert_eq!(data, b"tx bytes"),
            other => panic!("expected transaction gossip, got {other:?}"),
        }

        node_a.shutdown().await;
        node_b.shutdown().await;
    }
}
