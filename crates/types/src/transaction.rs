//! Value-transfer transactions.

use crate::{codec, verify_signature, Address, CryptoError, Hash, Wallet};
use parity_scale_codec::{Decode, Encode};

/// A signed value transfer.
///
/// The sender is implicit: it is the address derived from `public_key`. The
/// hash commits to `(to, value, nonce)` only — not to the key or signature —
/// so re-signing the same intent yields the same hash.
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub struct Transaction {
    pub hash: Hash,
    pub to: Address,
    pub value: u64,
    pub nonce: u64,
    pub public_key: Vec<u8>,
    pub signature: Vec<u8>,
}

impl Transaction {
    /// Build and sign a transfer with the given wallet.
    pub fn new_signed(
        wallet: &Wallet,
        to: Address,
        value: u64,
        nonce: u64,
    ) -> Result<Self, CryptoError> {
        let mut tx = Self {
            hash: Hash::ZERO,
            to,
            value,
            nonce,
            public_key: wallet.public_key().to_vec(),
            signature: Vec::new(),
        };
        tx.hash = tx.calculate_hash();
        tx.signature = wallet.sign(&tx.hash)?;
        Ok(tx)
    }

    /// SHA-256 over the canonical encoding of `(to, value, nonce)`.
    pub fn calculate_hash(&self) -> Hash {
        Hash::of(&codec::to_bytes(&(self.to, self.value, self.nonce)))
    }

    /// The implicit sender address.
    pub fn sender(&self) -> Address {
        Address::from_public_key(&self.public_key)
    }

    /// Check the transaction's integrity and signature.
    ///
    /// False when the key or signature is missing, when the stored `hash`
    /// does not match the committed triple, or when the signature does not
    /// verify over that hash.
    pub fn verify(&self) -> bool {
        if self.public_key.is_empty() || self.signature.is_empty() {
            return false;
        }
        let digest = self.calculate_hash();
        if self.hash != digest {
            return false;
        }
        verify_signature(&self.public_key, &digest, &self.signature)
    }
}
