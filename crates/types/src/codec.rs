//! Canonical binary codec.
//!
//! Everything that is hashed, signed, stored or gossiped goes through SCALE
//! (`parity-scale-codec`): fixed little-endian integer layout, compact
//! length prefixes on byte sequences, no map iteration. Centralizing the
//! wrappers here guarantees that two independent nodes produce bit-exact
//! identical bytes for equal values, which block and transaction identity
//! depends on.

use parity_scale_codec::{Decode, DecodeAll, Encode};
use thiserror::Error;

/// Malformed bytes on the wire or in storage.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("invalid encoding: {0}")]
    Decode(String),
}

/// Encode a value into its canonical byte representation.
pub fn to_bytes<T: Encode>(value: &T) -> Vec<u8> {
    value.encode()
}

/// Decode a value from its canonical byte representation.
///
/// Trailing bytes are rejected: a valid prefix followed by garbage is not a
/// valid encoding.
pub fn from_bytes<T: Decode>(bytes: &[u8]) -> Result<T, CodecError> {
    T::decode_all(&mut &*bytes).map_err(|e| CodecError::Decode(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Encode, Decode, Debug, PartialEq, Eq)]
    struct Sample {
        id: u32,
        payload: Vec<u8>,
    }

    #[test]
    fn roundtrip() {
        let original = Sample {
            id: 42,
            payload: vec![1, 2, 3],
        };
        let bytes = to_bytes(&original);
        assert_eq!(from_bytes::<Sample>(&bytes).unwrap(), original);
    }

    #[test]
    fn integers_are_fixed_little_endian() {
        // A plain u64 field encodes as exactly eight little-endian bytes,
        // which the cross-node hash agreement relies on.
        let bytes = to_bytes(&0x0102030405060708u64);
        assert_eq!(bytes, vec![8, 7, 6, 5, 4, 3, 2, 1]);
    }

    #[test]
    fn trailing_bytes_are_rejected() {
        let mut bytes = to_bytes(&Sample {
            id: 1,
            payload: vec![],
        });
        bytes.push(0xff);
        assert!(from_bytes::<Sample>(&bytes).is_err());
    }

    #[test]
    fn truncated_input_is_rejected() {
        let mut bytes = to_bytes(&Sample {
            id: 7,
            payload: vec![9, 9, 9],
        });
        bytes.pop();
        assert!(from_bytes::<Sample>(&bytes).is_err());
    }
}
