//! Cipher address display encoding.
//!
//! Wallet-facing addresses are shown as letter pairs rather than hex: each
//! hex digit maps to a two-letter code drawn from `G`, `H`, `J`, `K`.

use thiserror::Error;

/// Errors from decoding a cipher string.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CipherError {
    #[error("invalid cipher string length")]
    OddLength,

    #[error("unknown cipher code: {0}")]
    UnknownCode(String),
}

fn pair_for(digit: char) -> Option<&'static str> {
    Some(match digit {
        '0' => "GG",
        '1' => "GH",
        '2' => "GJ",
        '3' => "GK",
        '4' => "HG",
        '5' => "HH",
        '6' => "HJ",
        '7' => "HK",
        '8' => "JG",
        '9' => "JH",
        'a' => "JJ",
        'b' => "JK",
        'c' => "KG",
        'd' => "KH",
        'e' => "KJ",
        'f' => "KK",
        _ => return None,
    })
}

fn digit_for(pair: &str) -> Option<char> {
    Some(match pair {
        "GG" => '0',
        "GH" => '1',
        "GJ" => '2',
        "GK" => '3',
        "HG" => '4',
        "HH" => '5',
        "HJ" => '6',
        "HK" => '7',
        "JG" => '8',
        "JH" => '9',
        "JJ" => 'a',
        "JK" => 'b',
        "KG" => 'c',
        "KH" => 'd',
        "KJ" => 'e',
        "KK" => 'f',
        _ => return None,
    })
}

/// Render a hex string in cipher form. Non-hex characters pass through
/// unchanged.
pub fn encode_to_cipher(hex_str: &str) -> String {
    let mut out = String::with_capacity(hex_str.len() * 2);
    for c in hex_str.to_lowercase().chars() {
        match pair_for(c) {
            Some(pair) => out.push_str(pair),
            None => out.push(c),
        }
    }
    out
}

/// Decode a cipher string back to hex.
pub fn decode_from_cipher(cipher: &str) -> Result<String, CipherError> {
    if cipher.len() % 2 != 0 {
        return Err(CipherError::OddLength);
    }
    let mut out = String::with_capacity(cipher.len() / 2);
    let bytes = cipher.as_bytes();
    for chunk in bytes.chunks(2) {
        let pair = std::str::from_utf8(chunk).map_err(|_| {
            CipherError::UnknownCode(String::from_utf8_lossy(chunk).into_owned())
        })?;
        let digit =
            digit_for(pair).ok_or_else(|| CipherError::UnknownCode(pair.to_string()))?;
        out.push(digit);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrips_every_hex_digit() {
        let hex = "0123456789abcdef";
        let cipher = encode_to_cipher(hex);
        assert_eq!(cipher, "GGGHGJGKHGHHHJHKJGJHJJJKKGKHKJKK");
        assert_eq!(decode_from_cipher(&cipher).unwrap(), hex);
    }

    #[test]
    fn encode_is_case_insensitive() {
        assert_eq!(encode_to_cipher("AB"), encode_to_cipher("ab"));
    }

    #[test]
    fn decode_rejects_odd_length() {
        assert_eq!(decode_from_cipher("GGG"), Err(CipherError::OddLength));
    }

    #[test]
    fn decode_rejects_unknown_pairs() {
        assert_eq!(
            decode_from_cipher("GZ"),
            Err(CipherError::UnknownCode("GZ".to_string()))
        );
    }

    #[test]
    fn roundtrips_an_address() {
        let addr = "4bc9a1f203deadbeef00112233445566778899aa";
        assert_eq!(
            decode_from_cipher(&encode_to_cipher(addr)).unwrap(),
            addr
        );
    }
}
