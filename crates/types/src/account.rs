//! Accounts and the read-only account view.

use crate::Address;
use serde::{Deserialize, Serialize};

/// Balance and nonce of a single account.
///
/// Both fields default to zero for never-seen addresses. The nonce counts
/// successfully applied outgoing transactions and only ever increases, by
/// exactly one per applied transaction.
///
/// The JSON field names match the wire shape of the `getAccount` RPC result.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    #[serde(rename = "Balance")]
    pub balance: u64,
    #[serde(rename = "Nonce")]
    pub nonce: u64,
}

/// Read-only account lookup.
///
/// The blockchain exclusively owns the mutable state; the transaction pool
/// and the RPC layer only ever see this trait. Lookups of unknown addresses
/// return a zero-valued account, so two reads with no intervening writes
/// always observe equal values.
pub trait AccountReader: Send + Sync {
    fn account(&self, addr: &Address) -> Account;
}
