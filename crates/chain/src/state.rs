//! In-memory account state.

use crate::executor::ExecError;
use crate::store::StoreError;
use modulax_types::{Account, AccountReader, Address};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// The account map, rebuilt from the chain on startup.
///
/// Not thread-safe on its own; it lives inside a [`SharedState`] owned by
/// the blockchain, which serializes all mutation.
#[derive(Debug, Clone, Default)]
pub struct State {
    accounts: HashMap<Address, Account>,
}

/// Shared handle to the state: the blockchain writes, views read.
pub type SharedState = Arc<RwLock<State>>;

impl State {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mutable handle to an account, created zero-valued if absent.
    pub fn account_mut(&mut self, addr: Address) -> &mut Account {
        self.accounts.entry(addr).or_default()
    }

    /// Copy of an account, zero-valued if absent.
    pub fn account(&self, addr: &Address) -> Account {
        self.accounts.get(addr).copied().unwrap_or_default()
    }

    /// Move funds between accounts.
    ///
    /// Fails with `InsufficientFunds` without touching either account when
    /// the sender's balance does not cover the amount.
    pub fn transfer(&mut self, from: Address, to: Address, amount: u64) -> Result<(), ExecError> {
        let sender = self.account_mut(from);
        if sender.balance < amount {
            return Err(ExecError::InsufficientFunds);
        }
        sender.balance -= amount;
        self.account_mut(to).balance += amount;
        Ok(())
    }

    /// Unconditionally add funds. Only used for the genesis mint.
    pub fn credit(&mut self, addr: Address, amount: u64) {
        self.account_mut(addr).balance += amount;
    }

    /// Sum of all balances. Constant at the genesis supply for any valid
    /// chain: transfers neither create nor destroy value.
    pub fn total_balance(&self) -> u64 {
        self.accounts.values().map(|a| a.balance).sum()
    }

    /// Flush state to durable storage.
    ///
    /// Accounts are durable through chain replay, not per-account writes,
    /// so this only records the flush for visibility.
    pub fn persist(&self) -> Result<(), StoreError> {
        debug!(accounts = self.accounts.len(), "state persisted");
        Ok(())
    }

    /// Wrap this state into its shared handle.
    pub fn into_shared(self) -> SharedState {
        Arc::new(RwLock::new(self))
    }
}

/// Read-only view over a [`SharedState`].
///
/// This is the only surface the transaction pool and the RPC layer hold; it
/// cannot mutate accounts.
#[derive(Clone)]
pub struct StateView {
    inner: SharedState,
}

impl StateView {
    pub(crate) fn new(inner: SharedState) -> Self {
        Self { inner }
    }
}

impl AccountReader for StateView {
    fn account(&self, addr: &Address) -> Account {
        self.inner.read().account(addr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(byte: u8) -> Address {
        Address::from_bytes([byte; 20])
    }

    #[test]
    fn unknown_accounts_are_zero_valued() {
        let state = State::new();
        assert_eq!(state.account(&addr(1)), Account::default());
    }

    #[test]
    fn reads_are_idempotent() {
        let state = State::new();
        assert_eq!(state.account(&addr(1)), state.account(&addr(1)));
    }

    #[test]
    fn transfer_moves_funds() {
        let mut state = State::new();
        state.credit(addr(1), 100);

        state.transfer(addr(1), addr(2), 25).unwrap();
        assert_eq!(state.account(&addr(1)).balance, 75);
        assert_eq!(state.account(&addr(2)).balance, 25);
        assert_eq!(state.total_balance(), 100);
    }

    #[test]
    fn failed_transfer_leaves_both_accounts_untouched() {
        let mut state = State::new();
        state.credit(addr(1), 10);

        let err = state.transfer(addr(1), addr(2), 50).unwrap_err();
        assert_eq!(err, ExecError::InsufficientFunds);
        assert_eq!(state.account(&addr(1)).balance, 10);
        assert_eq!(state.account(&addr(2)).balance, 0);
    }

    #[test]
    fn self_transfer_is_a_no_op_on_balance() {
        let mut state = State::new();
        state.credit(addr(1), 40);
        state.transfer(addr(1), addr(1), 15).unwrap();
        assert_eq!(state.account(&addr(1)).balance, 40);
    }

    #[test]
    fn view_reads_through_shared_state() {
        let mut state = State::new();
        state.credit(addr(3), 7);
        let shared = state.into_shared();
        let view = StateView::new(shared.clone());

        assert_eq!(view.account(&addr(3)).balance, 7);

        shared.write().credit(addr(3), 3);
        assert_eq!(view.account(&addr(3)).balance, 10);
    }
}
