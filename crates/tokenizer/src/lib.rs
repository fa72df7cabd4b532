//! Taleweave-tokenizer - Byte-level BPE tokenizer with budget-aware trimming
//!
//! This crate provides the tokenizer underlying the context assembler:
//! byte-level byte-pair encoding over a fixed vocabulary and merge table,
//! plus trimming of token sequences at newline, sentence, and raw-token
//! granularities in either direction.
//!
//! # Features
//!
//! - Efficient vocabulary storage using `AHashMap` and compact strings
//! - GPT-style visual byte mapping so every byte sequence round-trips
//! - Bounded LRU cache for repeated pre-BPE segments, safe for shared use
//! - Little-endian binary token serialization
//!
//! # Example
//!
//! ```rust
//! use taleweave_tokenizer::Encoder;
//!
//! let encoder = Encoder::with_byte_vocabulary();
//! let tokens = encoder.encode("Hello, world!");
//! assert_eq!(encoder.decode(&tokens), "Hello, world!");
//! ```

pub mod error;
pub use error::{Result, TokenizerError};

pub mod vocab;
pub use vocab::{Decoder, MergeRanks, Pair, Token, TokenSequence, Vocab};

pub mod bytes;
pub mod cache;
pub mod load;
pub mod splitter;

mod bpe;

pub mod encoder;
pub use encoder::Encoder;

pub mod sentences;
pub mod trim;
pub use trim::TrimDirection;

pub mod binary;
pub use binary::{tokens_from_bin, tokens_to_bin};
