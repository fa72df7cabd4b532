//! Vocabulary and merge-rank storage.
//!
//! This module provides the core lookup tables the encoder is built from.
//! Merge ranks are keyed on ordered pairs of piece strings; a lower rank
//! means the pair merges earlier.

use ahash::AHashMap;
use compact_str::CompactString;

/// A single token identifier. The remote service speaks 16-bit tokens.
pub type Token = u16;

/// An ordered sequence of tokens.
pub type TokenSequence = Vec<Token>;

/// Forward mapping: piece string -> token.
pub type Vocab = AHashMap<CompactString, Token>;

/// Reverse mapping: token -> piece string.
pub type Decoder = AHashMap<Token, CompactString>;

/// An ordered pair of pieces that may merge.
pub type Pair = (CompactString, CompactString);

/// Merge priority mapping: pair -> rank (lower rank = higher priority).
pub type MergeRanks = AHashMap<Pair, u32>;

/// Build the reverse mapping from a forward vocabulary.
pub fn invert(vocab: &Vocab) -> Decoder {
    let mut decoder = Decoder::with_capacity(vocab.len());
    for (piece, &token) in vocab.iter() {
        decoder.insert(token, piece.clone());
    }
    decoder
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invert() {
        let mut vocab = Vocab::new();
        vocab.insert(CompactString::new("he"), 7);
        vocab.insert(CompactString::new("llo"), 9);

        let decoder = invert(&vocab);
        assert_eq!(decoder.get(&7).map(|s| s.as_str()), Some("he"));
        assert_eq!(decoder.get(&9).map(|s| s.as_str()), Some("llo"));
        assert_eq!(decoder.len(), 2);
    }
}
