//! Periodic block proposer.

use crate::runner::Broadcast;
use modulax_chain::Blockchain;
use modulax_mempool::TxPool;
use modulax_types::codec;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

/// Default proposal period.
pub const DEFAULT_PROPOSAL_INTERVAL: Duration = Duration::from_secs(5);

/// Timer-driven task that drains the pool and seals blocks.
pub struct Proposer {
    chain: Arc<Mutex<Blockchain>>,
    pool: Arc<TxPool>,
    broadcast: mpsc::Sender<Broadcast>,
    interval: Duration,
}

impl Proposer {
    pub fn new(
        chain: Arc<Mutex<Blockchain>>,
        pool: Arc<TxPool>,
        broadcast: mpsc::Sender<Broadcast>,
    ) -> Self {
        Self {
            chain,
            pool,
            broadcast,
            interval: DEFAULT_PROPOSAL_INTERVAL,
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Start ticking until the shutdown signal fires.
    pub fn spawn(self, mut shutdown: watch::Receiver<bool>) -> JoinHandle<()> {
        tokio::spawn(async move {
            // First tick one full period from now, not immediately.
            let mut ticker = interval_at(Instant::now() + self.interval, self.interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            info!(period = ?self.interval, "block proposer started");

            loop {
                tokio::select! {
                    _ = shutdown.changed() => {
                        info!("block proposer stopped");
                        break;
                    }
                    _ = ticker.tick() => self.propose_once().await,
                }
            }
        })
    }

    /// One proposer tick: drain, seal, clear, broadcast.
    ///
    /// On any sealing error the pool is left intact and the tick is retried
    /// by the next timer fire.
    pub async fn propose_once(&self) {
        let pending = self.pool.pending();
        if pending.is_empty() {
            return;
        }
        debug!(count = pending.len(), "proposing block from pending transactions");

        let sealed = {
            let mut chain = self.chain.lock();
            chain.add_block(pending)
        };

        match sealed {
            Ok(block) => {
                self.pool.clear();
                let bytes = codec::to_bytes(&block);
                if self.broadcast.send(Broadcast::Block(bytes)).await.is_err() {
                    debug!("broadcast channel closed, block not gossiped");
                }
                info!(
                    height = block.header.height,
                    txs = block.transactions.len(),
                    hash = %block.hash,
                    "proposed block"
                );
            }
            Err(e) => warn!(error = %e, "failed to seal block, keeping pool"),
        }
    }
}
