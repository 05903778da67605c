//! Keys and signatures on NIST P-256.
//!
//! Wire formats are raw: a public key is the `X‖Y` concatenation of the two
//! 32-byte point coordinates, a signature is the `r‖s` concatenation of the
//! two scalar halves. Parsers split at the midpoint and left-pad short
//! big-endian halves to 32 bytes, so encodings produced by peers that strip
//! leading zeros still verify.

use crate::{Address, Hash};
use p256::ecdsa::signature::hazmat::{PrehashSigner, PrehashVerifier};
use p256::ecdsa::{Signature, SigningKey, VerifyingKey};
use p256::elliptic_curve::sec1::ToEncodedPoint;
use thiserror::Error;

/// Errors from key handling and signing.
#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("invalid private scalar")]
    InvalidPrivateKey,

    #[error("invalid public key")]
    InvalidPublicKey,

    #[error("signing failed")]
    SigningFailed,

    #[error("invalid key hex: {0}")]
    Hex(#[from] crate::HexError),
}

/// A P-256 keypair with its raw public key.
pub struct Wallet {
    signing_key: SigningKey,
    public_key: [u8; 64],
}

impl Wallet {
    /// Generate a fresh random keypair.
    pub fn generate() -> Self {
        let signing_key = SigningKey::random(&mut rand::thread_rng());
        let public_key = raw_public_key(signing_key.verifying_key());
        Self {
            signing_key,
            public_key,
        }
    }

    /// Rebuild a wallet from a 32-byte private scalar.
    pub fn from_private_scalar(scalar: [u8; 32]) -> Result<Self, CryptoError> {
        let signing_key = SigningKey::from_bytes(&scalar.into())
            .map_err(|_| CryptoError::InvalidPrivateKey)?;
        let public_key = raw_public_key(signing_key.verifying_key());
        Ok(Self {
            signing_key,
            public_key,
        })
    }

    /// Rebuild a wallet from a hex-encoded private scalar.
    ///
    /// Scalars shorter than 32 bytes are left-padded, matching big-integer
    /// encodings that strip leading zeros.
    pub fn from_hex(s: &str) -> Result<Self, CryptoError> {
        let bytes = hex::decode(s).map_err(crate::HexError::from)?;
        if bytes.len() > 32 {
            return Err(CryptoError::InvalidPrivateKey);
        }
        let mut scalar = [0u8; 32];
        scalar[32 - bytes.len()..].copy_from_slice(&bytes);
        Self::from_private_scalar(scalar)
    }

    /// Raw `X‖Y` public key.
    pub fn public_key(&self) -> [u8; 64] {
        self.public_key
    }

    /// Address derived from the public key.
    pub fn address(&self) -> Address {
        Address::from_public_key(&self.public_key)
    }

    /// Sign a 32-byte digest, returning the raw `r‖s` signature.
    ///
    /// Signing is deterministic (RFC 6979), so equal inputs produce equal
    /// signatures on every node.
    pub fn sign(&self, digest: &Hash) -> Result<Vec<u8>, CryptoError> {
        let signature: Signature = self
            .signing_key
            .sign_prehash(digest.as_bytes())
            .map_err(|_| CryptoError::SigningFailed)?;
        Ok(signature.to_bytes().to_vec())
    }

    /// Hex encoding of the private scalar, for keystore files.
    pub fn private_scalar_hex(&self) -> String {
        hex::encode(self.signing_key.to_bytes())
    }
}

/// Verify a raw `r‖s` signature over a 32-byte digest under a raw `X‖Y`
/// public key. Any malformed input simply fails verification.
pub fn verify_signature(public_key: &[u8], digest: &Hash, signature: &[u8]) -> bool {
    let Some(verifying_key) = parse_public_key(public_key) else {
        return false;
    };
    let Some(signature) = parse_signature(signature) else {
        return false;
    };
    verifying_key
        .verify_prehash(digest.as_bytes(), &signature)
        .is_ok()
}

/// Uncompressed SEC1 coordinates without the 0x04 tag.
fn raw_public_key(key: &VerifyingKey) -> [u8; 64] {
    let point = key.to_encoded_point(false);
    let mut raw = [0u8; 64];
    raw.copy_from_slice(&point.as_bytes()[1..65]);
    raw
}

fn parse_public_key(public_key: &[u8]) -> Option<VerifyingKey> {
    if public_key.is_empty() || public_key.len() % 2 != 0 {
        return None;
    }
    let (x, y) = public_key.split_at(public_key.len() / 2);
    let mut sec1 = [0u8; 65];
    sec1[0] = 0x04;
    sec1[1..33].copy_from_slice(&left_pad32(x)?);
    sec1[33..65].copy_from_slice(&left_pad32(y)?);
    VerifyingKey::from_sec1_bytes(&sec1).ok()
}

fn parse_signature(signature: &[u8]) -> Option<Signature> {
    if signature.is_empty() || signature.len() % 2 != 0 {
        return None;
    }
    let (r, s) = signature.split_at(signature.len() / 2);
    let mut raw = [0u8; 64];
    raw[..32].copy_from_slice(&left_pad32(r)?);
    raw[32..].copy_from_slice(&left_pad32(s)?);
    Signature::from_slice(&raw).ok()
}

fn left_pad32(half: &[u8]) -> Option<[u8; 32]> {
    if half.len() > 32 {
        return None;
    }
    let mut padded = [0u8; 32];
    padded[32 - half.len()..].copy_from_slice(half);
    Some(padded)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign_verify_roundtrip() {
        let wallet = Wallet::generate();
        let digest = Hash::of(b"hello, modulax");

        let signature = wallet.sign(&digest).unwrap();
        assert!(verify_signature(&wallet.public_key(), &digest, &signature));
    }

    #[test]
    fn wrong_digest_fails() {
        let wallet = Wallet::generate();
        let signature = wallet.sign(&Hash::of(b"message one")).unwrap();
        assert!(!verify_signature(
            &wallet.public_key(),
            &Hash::of(b"message two"),
            &signature
        ));
    }

    #[test]
    fn wrong_key_fails() {
        let signer = Wallet::generate();
        let other = Wallet::generate();
        let digest = Hash::of(b"payload");
        let signature = signer.sign(&digest).unwrap();
        assert!(!verify_signature(&other.public_key(), &digest, &signature));
    }

    #[test]
    fn empty_inputs_fail() {
        let wallet = Wallet::generate();
        let digest = Hash::of(b"payload");
        let signature = wallet.sign(&digest).unwrap();
        assert!(!verify_signature(&[], &digest, &signature));
        assert!(!verify_signature(&wallet.public_key(), &digest, &[]));
    }

    #[test]
    fn scalar_roundtrip_preserves_identity() {
        let original = Wallet::generate();
        let restored = Wallet::from_hex(&original.private_scalar_hex()).unwrap();
        assert_eq!(original.public_key(), restored.public_key());
        assert_eq!(original.address(), restored.address());
    }

    #[test]
    fn deterministic_signatures() {
        let wallet = Wallet::from_private_scalar([0xab; 32]).unwrap();
        let digest = Hash::of(b"deterministic");
        assert_eq!(wallet.sign(&digest).unwrap(), wallet.sign(&digest).unwrap());
    }

    #[test]
    fn address_matches_public_key_derivation() {
        let wallet = Wallet::generate();
        assert_eq!(
            wallet.address(),
            Address::from_public_key(&wallet.public_key())
        );
    }
}
