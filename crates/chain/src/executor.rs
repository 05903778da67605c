//! Transaction execution.

use crate::state::State;
use modulax_types::Transaction;
use thiserror::Error;

/// Reasons a transaction cannot be applied.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExecError {
    #[error("invalid transaction signature")]
    InvalidSignature,

    #[error("invalid nonce: expected {expected}, got {got}")]
    InvalidNonce { expected: u64, got: u64 },

    #[error("insufficient funds for transfer")]
    InsufficientFunds,
}

/// The state-transition machine.
///
/// The blockchain depends on this abstraction rather than a concrete
/// executor so tests can substitute a no-op implementation.
pub trait Executor: Send + Sync {
    /// Advance `state` by exactly one transaction.
    fn execute(&self, state: &mut State, tx: &Transaction) -> Result<(), ExecError>;
}

/// The production executor: verified, nonce-checked value transfers.
#[derive(Debug, Default)]
pub struct TransferExecutor;

impl Executor for TransferExecutor {
    fn execute(&self, state: &mut State, tx: &Transaction) -> Result<(), ExecError> {
        if !tx.verify() {
            return Err(ExecError::InvalidSignature);
        }

        let sender = tx.sender();
        let expected = state.account_mut(sender).nonce;
        if tx.nonce != expected {
            return Err(ExecError::InvalidNonce {
                expected,
                got: tx.nonce,
            });
        }

        state.transfer(sender, tx.to, tx.value)?;
        state.account_mut(sender).nonce += 1;
        Ok(())
    }
}
