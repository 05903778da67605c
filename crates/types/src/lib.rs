//! Core types for the Modulax ledger.
//!
//! This crate provides the foundational types used throughout the node:
//!
//! - **Primitives**: [`Hash`], [`Address`]
//! - **Accounts**: [`Account`] and the read-only [`AccountReader`] view
//! - **Crypto**: [`Wallet`] (NIST P-256 keys, raw `r‖s` signatures)
//! - **Ledger records**: [`Transaction`], [`Block`], [`BlockHeader`]
//! - **Codec**: canonical SCALE encoding in [`codec`]
//!
//! # Design Philosophy
//!
//! This crate is self-contained and does not depend on any other workspace
//! crate, making it the foundation layer. Everything that is hashed, signed,
//! stored or gossiped is encoded through [`codec`], so all nodes agree on
//! block and transaction identity byte for byte.

mod account;
mod address;
pub mod codec;
mod crypto;
mod hash;

mod block;
mod transaction;

pub use account::{Account, AccountReader};
pub use address::Address;
pub use codec::CodecError;
pub use crypto::{verify_signature, CryptoError, Wallet};
pub use hash::{Hash, HexError};

pub use block::{Block, BlockHeader};
pub use transaction::Transaction;
