//! Node wiring and gossip ingest.

use crate::config::NodeConfig;
use crate::network::{GossipService, InboundGossip, NetworkError};
use crate::proposer::Proposer;
use crate::rpc::{RpcServer, RpcServerError, RpcServerHandle, RpcState};
use crate::storage::RocksDbStore;
use modulax_chain::{Blockchain, ChainError, StoreError, TransferExecutor};
use modulax_mempool::TxPool;
use modulax_types::{codec, AccountReader, Block, Hash, Transaction};
use parking_lot::Mutex;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// Outbound gossip payloads, produced by the proposer and the RPC layer and
/// published by the forwarder task.
#[derive(Debug)]
pub enum Broadcast {
    Block(Vec<u8>),
    Transaction(Vec<u8>),
}

/// Errors from node startup.
#[derive(Debug, Error)]
pub enum NodeError {
    #[error(transparent)]
    Chain(#[from] ChainError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Network(#[from] NetworkError),

    #[error(transparent)]
    Rpc(#[from] RpcServerError),
}

/// Ingest callback for a peer block.
///
/// Decode failures and parent mismatches drop the block silently — gossip
/// is best-effort and there is no NACK path. A successfully applied block
/// clears the local pool: anything it contained is no longer pending, and
/// leftover nonces are stale against the new state.
pub fn on_remote_block(chain: &Mutex<Blockchain>, pool: &TxPool, bytes: &[u8]) {
    let block: Block = match codec::from_bytes(bytes) {
        Ok(block) => block,
        Err(e) => {
            debug!(error = %e, "dropping undecodable peer block");
            return;
        }
    };

    let applied = {
        let mut chain = chain.lock();
        chain.add_existing_block(&block)
    };
    match applied {
        Ok(()) => {
            pool.clear();
            info!(
                height = block.header.height,
                hash = %block.hash,
                "synced peer block"
            );
        }
        Err(e) => debug!(error = %e, "dropping peer block"),
    }
}

/// Ingest callback for a peer transaction.
///
/// Admission failures are dropped; admitted transactions are *not*
/// re-broadcast — the origin already published once.
pub fn on_remote_transaction(pool: &TxPool, bytes: &[u8]) {
    let tx: Transaction = match codec::from_bytes(bytes) {
        Ok(tx) => tx,
        Err(e) => {
            debug!(error = %e, "dropping undecodable peer transaction");
            return;
        }
    };

    match pool.add(tx) {
        Ok(hash) => debug!(%hash, "admitted peer transaction"),
        Err(e) => debug!(error = %e, "dropped peer transaction"),
    }
}

/// A running node: chain, pool, gossip, proposer and RPC, wired together.
pub struct Node {
    chain: Arc<Mutex<Blockchain>>,
    pool: Arc<TxPool>,
    gossip: Arc<GossipService>,
    rpc: RpcServerHandle,
    shutdown: watch::Sender<bool>,
    tasks: Vec<JoinHandle<()>>,
}

impl Node {
    /// Start all services.
    pub async fn start(config: NodeConfig) -> Result<Self, NodeError> {
        let store = Arc::new(RocksDbStore::open(&config.db_path)?);
        let chain = Blockchain::open(store, Box::new(TransferExecutor))?;
        let tip = chain.latest_block()?;
        info!(height = tip.header.height, tip = %tip.hash, "chain ready");

        let accounts: Arc<dyn AccountReader> = Arc::new(chain.state_view());
        let chain = Arc::new(Mutex::new(chain));
        let pool = Arc::new(TxPool::new(Arc::clone(&accounts)));

        let (gossip, inbound_rx) = GossipService::start(config.gossip.clone())?;
        let gossip = Arc::new(gossip);
        let (broadcast_tx, broadcast_rx) = mpsc::channel(64);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let mut tasks = Vec::new();
        tasks.push(spawn_ingest(
            Arc::clone(&chain),
            Arc::clone(&pool),
            inbound_rx,
            shutdown_rx.clone(),
        ));
        tasks.push(spawn_forwarder(
            Arc::clone(&gossip),
            broadcast_rx,
            shutdown_rx.clone(),
        ));
        tasks.push(
            Proposer::new(
                Arc::clone(&chain),
                Arc::clone(&pool),
                broadcast_tx.clone(),
            )
            .with_interval(config.proposal_interval)
            .spawn(shutdown_rx),
        );

        let rpc_state = RpcState {
            accounts,
            pool: Arc::clone(&pool),
            broadcast: broadcast_tx,
        };
        let rpc = RpcServer::new(config.rpc.clone(), rpc_state).start().await?;

        Ok(Self {
            chain,
            pool,
            gossip,
            rpc,
            shutdown: shutdown_tx,
            tasks,
        })
    }

    /// The bound RPC address.
    pub fn rpc_addr(&self) -> std::net::SocketAddr {
        self.rpc.local_addr()
    }

    /// Hash of the current tip.
    pub fn tip_hash(&self) -> Hash {
        self.chain.lock().tip_hash()
    }

    /// Number of pending transactions.
    pub fn pending_count(&self) -> usize {
        self.pool.len()
    }

    /// The gossip handle, e.g. for dialing peers after startup.
    pub fn gossip(&self) -> &GossipService {
        &self.gossip
    }

    /// Stop every task and the RPC server.
    pub async fn shutdown(self) {
        let _ = self.shutdown.send(true);
        self.gossip.shutdown().await;
        self.rpc.abort();
        for task in self.tasks {
            let _ = task.await;
        }
        info!("node stopped");
    }
}

/// Dispatch inbound gossip to the ingest callbacks.
fn spawn_ingest(
    chain: Arc<Mutex<Blockchain>>,
    pool: Arc<TxPool>,
    mut inbound_rx: mpsc::Receiver<InboundGossip>,
    mut shutdown: watch::Receiver<bool>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = shutdown.changed() => break,
                msg = inbound_rx.recv() => match msg {
                    Some(InboundGossip::Block(bytes)) => on_remote_block(&chain, &pool, &bytes),
                    Some(InboundGossip::Transaction(bytes)) => on_remote_transaction(&pool, &bytes),
                    None => break,
                },
            }
        }
    })
}

/// Publish queued broadcasts onto the gossip topics.
fn spawn_forwarder(
    gossip: Arc<GossipService>,
    mut broadcast_rx: mpsc::Receiver<Broadcast>,
    mut shutdown: watch::Receiver<bool>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = shutdown.changed() => break,
                msg = broadcast_rx.recv() => {
                    let result = match msg {
                        Some(Broadcast::Block(bytes)) => gossip.broadcast_block(bytes),
                        Some(Broadcast::Transaction(bytes)) => gossip.broadcast_transaction(bytes),
                        None => break,
                    };
                    if let Err(e) = result {
                        debug!(error = %e, "broadcast failed");
                    }
                }
            }
        }
    })
}
