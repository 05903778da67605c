//! 20-byte account addresses.

use crate::hash::HexError;
use parity_scale_codec::{Decode, Encode};
use ripemd::Ripemd160;
use sha2::{Digest, Sha256};
use std::fmt;

/// A 20-byte account identifier.
///
/// Derived from a public key as `RIPEMD160(SHA256(public_key))`, where the
/// public key is the raw `X‖Y` concatenation of the P-256 point coordinates.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Encode, Decode)]
pub struct Address([u8; 20]);

impl Address {
    /// Number of bytes in an address.
    pub const LEN: usize = 20;

    /// Wrap raw address bytes.
    pub const fn from_bytes(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    /// Derive the address for a raw `X‖Y` public key.
    pub fn from_public_key(public_key: &[u8]) -> Self {
        let sha = Sha256::digest(public_key);
        let ripe = Ripemd160::digest(sha);
        let mut bytes = [0u8; 20];
        bytes.copy_from_slice(&ripe);
        Self(bytes)
    }

    /// Raw address bytes.
    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// Lowercase hex rendering (40 characters).
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse a 40-character hex string.
    pub fn from_hex(s: &str) -> Result<Self, HexError> {
        let bytes = hex::decode(s)?;
        let arr: [u8; 20] = bytes.as_slice().try_into().map_err(|_| HexError::Length {
            expected: Self::LEN,
            got: bytes.len(),
        })?;
        Ok(Self(arr))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.to_hex())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derivation_is_deterministic() {
        let pk = [7u8; 64];
        assert_eq!(Address::from_public_key(&pk), Address::from_public_key(&pk));
        assert_ne!(
            Address::from_public_key(&pk),
            Address::from_public_key(&[8u8; 64])
        );
    }

    #[test]
    fn hex_roundtrip() {
        let addr = Address::from_public_key(&[1u8; 64]);
        assert_eq!(addr.to_hex().len(), 40);
        assert_eq!(Address::from_hex(&addr.to_hex()).unwrap(), addr);
    }

    #[test]
    fn from_hex_rejects_wrong_length() {
        assert!(matches!(
            Address::from_hex("abcdef"),
            Err(HexError::Length { expected: 20, got: 3 })
        ));
    }
}
