//! Binary token serialization.
//!
//! Token sequences travel to and from the generator as contiguous
//! little-endian `u16` values. A trailing odd byte on input is an
//! incomplete token and is dropped.

use crate::vocab::{Token, TokenSequence};

/// Serialize tokens to little-endian bytes.
pub fn tokens_to_bin(tokens: &[Token]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(tokens.len() * 2);
    for token in tokens {
        bytes.extend_from_slice(&token.to_le_bytes());
    }
    bytes
}

/// Deserialize little-endian bytes to tokens, truncating an incomplete
/// final token.
pub fn tokens_from_bin(bytes: &[u8]) -> TokenSequence {
    bytes
        .chunks_exact(2)
        .map(|pair| Token::from_le_bytes([pair[0], pair[1]]))
        .collect()
}
