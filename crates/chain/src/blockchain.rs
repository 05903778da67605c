//! The chain itself: genesis, tip, block application, persistence.

use crate::executor::{ExecError, Executor};
use crate::state::{SharedState, State, StateView};
use crate::store::{Store, StoreError};
use modulax_types::{codec, Block, CryptoError, Hash, Transaction, Wallet};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;
use tracing::info;

/// Private scalar of the genesis wallet.
///
/// A protocol constant, not a secret: every node derives the same genesis
/// block from it, which is what makes chain bootstrap deterministic.
pub const GENESIS_PRIVATE_KEY: &str =
    "c1850f2b53d1e1f7cf655513970b13c847796a4b1054b1509a2a7a42140a33a5";

/// Units minted to the genesis address at height 0.
pub const GENESIS_SUPPLY: u64 = 1_000_000;

/// Well-known store key holding the tip block hash.
const TIP_KEY: &[u8] = b"l";

/// Errors from chain operations.
#[derive(Debug, Error)]
pub enum ChainError {
    #[error("block at height {height} has invalid parent hash")]
    InvalidParent { height: u32 },

    #[error("block height {got} does not extend tip height {tip}")]
    InvalidHeight { tip: u32, got: u32 },

    #[error("block {0} not found")]
    NotFound(Hash),

    #[error(transparent)]
    Exec(#[from] ExecError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Crypto(#[from] CryptoError),

    #[error("corrupt chain data: {0}")]
    Corrupt(String),
}

/// The genesis wallet derived from the protocol constant.
pub fn genesis_wallet() -> Result<Wallet, CryptoError> {
    Wallet::from_hex(GENESIS_PRIVATE_KEY)
}

/// The deterministic height-0 block: zero parent, zero timestamp, one
/// signed credit of the genesis supply to the genesis address.
pub fn genesis_block() -> Result<Block, CryptoError> {
    let wallet = genesis_wallet()?;
    let mint = Transaction::new_signed(&wallet, wallet.address(), GENESIS_SUPPLY, 0)?;
    Ok(Block::new(Hash::ZERO, 0, 0, vec![mint]))
}

/// The replicated chain and the state it derives.
///
/// Owns the tip pointer, the store handle, the shared [`State`] and the
/// executor. Not internally synchronized; see the crate docs.
pub struct Blockchain {
    store: Arc<dyn Store>,
    state: SharedState,
    executor: Box<dyn Executor>,
    tip_hash: Hash,
}

impl std::fmt::Debug for Blockchain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Blockchain")
            .field("tip_hash", &self.tip_hash)
            .finish()
    }
}

impl Blockchain {
    /// Open or bootstrap a chain on the given store.
    ///
    /// A fresh store gets the genesis block and its mint credited directly
    /// into state — genesis never runs through the executor, it has no
    /// valid predecessor nonce. An existing store has its tip loaded and
    /// the whole chain replayed to rebuild the account state.
    pub fn open(store: Arc<dyn Store>, executor: Box<dyn Executor>) -> Result<Self, ChainError> {
        let state = State::new().into_shared();
        let mut chain = Self {
            store,
            state,
            executor,
            tip_hash: Hash::ZERO,
        };

        match chain.store.get(TIP_KEY)? {
            None => chain.bootstrap_genesis()?,
            Some(bytes) => {
                let tip: [u8; 32] = bytes.as_slice().try_into().map_err(|_| {
                    ChainError::Corrupt(format!("tip pointer has {} bytes", bytes.len()))
                })?;
                chain.tip_hash = Hash::from_bytes(tip);
                chain.replay_chain()?;
            }
        }
        Ok(chain)
    }

    fn bootstrap_genesis(&mut self) -> Result<(), ChainError> {
        let genesis = genesis_block()?;
        {
            let mut state = self.state.write();
            let mint = &genesis.transactions[0];
            state.credit(mint.to, mint.value);
            state.persist()?;
        }
        self.store.write_batch(vec![
            (genesis.hash.as_bytes().to_vec(), codec::to_bytes(&genesis)),
            (TIP_KEY.to_vec(), genesis.hash.as_bytes().to_vec()),
        ])?;
        self.tip_hash = genesis.hash;
        info!(hash = %genesis.hash, "bootstrapped genesis block");
        Ok(())
    }

    /// Rebuild the account state by re-executing the chain from genesis.
    ///
    /// The backward walk terminates at the zero parent hash, and the block
    /// it lands on must be the canonical genesis — header fields of stored
    /// blocks are not trusted to mark the chain root.
    fn replay_chain(&mut self) -> Result<(), ChainError> {
        let mut blocks = Vec::new();
        let mut cursor = self.tip_hash;
        loop {
            let block = self.block_by_hash(cursor)?;
            cursor = block.header.parent_hash;
            blocks.push(block);
            if cursor == Hash::ZERO {
                break;
            }
        }
        blocks.reverse();

        let canonical = genesis_block()?;
        if blocks[0].hash != canonical.hash {
            return Err(ChainError::Corrupt(format!(
                "chain root {} is not the genesis block",
                blocks[0].hash
            )));
        }

        let mut state = State::new();
        let mint = &canonical.transactions[0];
        state.credit(mint.to, mint.value);
        for block in &blocks[1..] {
            for tx in &block.transactions {
                self.executor.execute(&mut state, tx).map_err(|e| {
                    ChainError::Corrupt(format!(
                        "replay failed at height {}: {e}",
                        block.header.height
                    ))
                })?;
            }
        }

        let height = blocks.len() as u32 - 1;
        *self.state.write() = state;
        info!(height, tip = %self.tip_hash, "replayed chain into state");
        Ok(())
    }

    /// Seal a new block over the current tip from local transactions.
    pub fn add_block(&mut self, transactions: Vec<Transaction>) -> Result<Block, ChainError> {
        let parent = self.latest_block()?;
        let block = Block::new(
            self.tip_hash,
            parent.header.height + 1,
            now_nanos(),
            transactions,
        );
        self.commit_block(&block)?;
        Ok(block)
    }

    /// Append a block received from a peer.
    ///
    /// Only the tip may be extended: a parent hash that is not the current
    /// tip is rejected, there is no fork handling. The height must also
    /// advance the tip by exactly one — a peer cannot smuggle in a block
    /// claiming some other height over a correct parent hash.
    pub fn add_existing_block(&mut self, block: &Block) -> Result<(), ChainError> {
        if block.header.parent_hash != self.tip_hash {
            return Err(ChainError::InvalidParent {
                height: block.header.height,
            });
        }
        let parent = self.latest_block()?;
        if block.header.height != parent.header.height + 1 {
            return Err(ChainError::InvalidHeight {
                tip: parent.header.height,
                got: block.header.height,
            });
        }
        self.commit_block(block)
    }

    /// Execute and persist a block, then advance the tip.
    ///
    /// Every transaction runs through the executor; genesis never reaches
    /// this path, it is credited directly during bootstrap. Transactions
    /// run against a scratch copy of the state; a failure aborts the whole
    /// block with no state mutation, no store writes and no tip advance.
    /// Block body and tip pointer are committed in one batch.
    fn commit_block(&mut self, block: &Block) -> Result<(), ChainError> {
        let mut scratch = self.state.read().clone();
        for tx in &block.transactions {
            self.executor.execute(&mut scratch, tx)?;
        }
        scratch.persist()?;
        *self.state.write() = scratch;

        self.store.write_batch(vec![
            (block.hash.as_bytes().to_vec(), codec::to_bytes(block)),
            (TIP_KEY.to_vec(), block.hash.as_bytes().to_vec()),
        ])?;
        self.tip_hash = block.hash;

        info!(
            height = block.header.height,
            txs = block.transactions.len(),
            hash = %block.hash,
            "appended block"
        );
        Ok(())
    }

    /// Load a block by hash; a miss is `NotFound`, undecodable bytes are
    /// corruption.
    pub fn block_by_hash(&self, hash: Hash) -> Result<Block, ChainError> {
        let bytes = self
            .store
            .get(hash.as_bytes())?
            .ok_or(ChainError::NotFound(hash))?;
        codec::from_bytes(&bytes)
            .map_err(|e| ChainError::Corrupt(format!("stored block {hash}: {e}")))
    }

    /// The block at the current tip.
    pub fn latest_block(&self) -> Result<Block, ChainError> {
        self.block_by_hash(self.tip_hash)
    }

    /// Hash of the current tip.
    pub fn tip_hash(&self) -> Hash {
        self.tip_hash
    }

    /// Read-only account view for the pool and RPC.
    pub fn state_view(&self) -> StateView {
        StateView::new(self.state.clone())
    }

    /// Sum of all balances, for diagnostics and invariant checks.
    pub fn total_balance(&self) -> u64 {
        self.state.read().total_balance()
    }
}

fn now_nanos() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as i64)
        .unwrap_or_default()
}
