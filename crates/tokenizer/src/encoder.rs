//! The byte-level BPE encoder.
//!
//! An `Encoder` is constructed once from vocabulary and merge artifacts and
//! is immutable afterwards. The only interior state is the piece cache,
//! guarded by a mutex, so a shared reference can encode and decode from
//! multiple threads.

use crate::bpe;
use crate::bytes;
use crate::cache::PieceCache;
use crate::load;
use crate::splitter::WordSplitter;
use crate::vocab::{self, Decoder, MergeRanks, Token, TokenSequence, Vocab};
use crate::Result;
use ahash::AHashMap;
use compact_str::{CompactString, ToCompactString};
use std::path::Path;
use std::sync::{Arc, Mutex, OnceLock};

static SHARED: OnceLock<Arc<Encoder>> = OnceLock::new();

/// Byte-level BPE encoder/decoder.
pub struct Encoder {
    vocab: Vocab,
    decoder: Decoder,
    merges: MergeRanks,
    byte_to_char: [char; 256],
    char_to_byte: AHashMap<char, u8>,
    splitter: WordSplitter,
    cache: Mutex<PieceCache>,
}

impl Encoder {
    /// Build an encoder from explicit vocabulary and merge tables.
    pub fn from_parts(vocab: Vocab, merges: MergeRanks) -> Self {
        let decoder = vocab::invert(&vocab);
        Self {
            vocab,
            decoder,
            merges,
            byte_to_char: bytes::byte_to_char_table(),
            char_to_byte: bytes::char_to_byte_table(),
            splitter: WordSplitter::new(),
            cache: Mutex::new(PieceCache::new()),
        }
    }

    /// Build an encoder from `vocab.json` + `merges.txt` in a directory.
    pub fn from_dir(dir: &Path) -> Result<Self> {
        let vocab = load::load_vocab(dir)?;
        let merges = load::load_merges(dir)?;
        Ok(Self::from_parts(vocab, merges))
    }

    /// Build an encoder whose vocabulary is exactly the 256 visual byte
    /// characters (token id = byte value) with no merges. Every input
    /// round-trips; token counts equal byte counts.
    pub fn with_byte_vocabulary() -> Self {
        let table = bytes::byte_to_char_table();
        let mut vocab = Vocab::with_capacity(256);
        for (byte, &ch) in table.iter().enumerate() {
            vocab.insert(ch.to_compact_string(), byte as Token);
        }
        Self::from_parts(vocab, MergeRanks::new())
    }

    /// Return the process-wide shared encoder, loading it on first use.
    ///
    /// Subsequent calls ignore `dir` and return the already-initialized
    /// instance.
    pub fn shared_from_dir(dir: &Path) -> Result<Arc<Encoder>> {
        if let Some(encoder) = SHARED.get() {
            return Ok(encoder.clone());
        }
        let encoder = Arc::new(Self::from_dir(dir)?);
        Ok(SHARED.get_or_init(|| encoder).clone())
    }

    /// Split text into pre-tokenization word segments.
    pub fn split_words<'a>(&self, text: &'a str) -> Vec<&'a str> {
        self.splitter.split(text)
    }

    /// Encode text to a token sequence. Deterministic and pure apart from
    /// the piece cache.
    pub fn encode(&self, text: &str) -> TokenSequence {
        let mut encoded = TokenSequence::new();
        for word in self.splitter.split(text) {
            let visual = self.to_visual(word);
            let pieces = self.to_bpe(visual);
            for piece in &pieces {
                if let Some(&token) = self.vocab.get(piece.as_str()) {
                    encoded.push(token);
                }
            }
        }
        encoded
    }

    /// Number of tokens `text` encodes to.
    pub fn token_count(&self, text: &str) -> usize {
        self.encode(text).len()
    }

    /// Decode a token sequence back to text. Total: tokens without a
    /// vocabulary entry are skipped.
    pub fn decode(&self, tokens: &[Token]) -> String {
        let mut raw = Vec::with_capacity(tokens.len() * 2);
        for token in tokens {
            if let Some(piece) = self.decoder.get(token) {
                for ch in piece.chars() {
                    if let Some(&byte) = self.char_to_byte.get(&ch) {
                        raw.push(byte);
                    }
                }
            }
        }
        String::from_utf8_lossy(&raw).into_owned()
    }

    /// Remap a word segment's bytes into the visual alphabet.
    fn to_visual(&self, word: &str) -> CompactString {
        word.bytes()
            .map(|b| self.byte_to_char[b as usize])
            .collect()
    }

    /// Run the cached BPE merge loop over a visual segment.
    fn to_bpe(&self, visual: CompactString) -> Vec<CompactString> {
        if let Some(hit) = self
            .cache
            .lock()
            .expect("piece cache poisoned")
            .get(&visual)
        {
            return hit;
        }
        let chars: Vec<CompactString> = visual.chars().map(|c| c.to_compact_string()).collect();
        let merged = bpe::merge_word(chars, &self.merges);
        self.cache
            .lock()
            .expect("piece cache poisoned")
            .insert(visual, merged.clone());
        merged
    }

    /// Vocabulary size.
    pub fn vocab_size(&self) -> usize {
        self.vocab.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Byte-level encoder plus one learned merge: "he" (token 256).
    fn encoder_with_he_merge() -> Encoder {
        let table = bytes::byte_to_char_table();
        let mut vocab = Vocab::with_capacity(257);
        for (byte, &ch) in table.iter().enumerate() {
            vocab.insert(ch.to_compact_string(), byte as Token);
        }
        vocab.insert(CompactString::new("he"), 256);
        let mut merges = MergeRanks::new();
        merges.insert((CompactString::new("h"), CompactString::new("e")), 0);
        Encoder::from_parts(vocab, merges)
    }

    #[test]
    fn test_roundtrip_ascii() {
        let encoder = Encoder::with_byte_vocabulary();
        let text = "Hello, world!";
        let tokens = encoder.encode(text);
        assert_eq!(tokens.len(), text.len());
        assert_eq!(encoder.decode(&tokens), text);
    }

    #[test]
    fn test_roundtrip_multibyte() {
        let encoder = Encoder::with_byte_vocabulary();
        let text = "daimyōs — 大名 … ¡olé!";
        assert_eq!(encoder.decode(&encoder.encode(text)), text);
    }

    #[test]
    fn test_roundtrip_newlines() {
        let encoder = Encoder::with_byte_vocabulary();
        let text = "line one\n\nline three\n";
        assert_eq!(encoder.decode(&encoder.encode(text)), text);
    }

    #[test]
    fn test_roundtrip_literary_corpus() {
        let corpus = "You will rejoice to hear that no disaster has accompanied the \
commencement of an enterprise which you have regarded with such evil forebodings. \
I arrived here yesterday, and my first task is to assure my dear sister of my \
welfare and increasing confidence in the success of my undertaking.\n\n\
I am already far north of London, and as I walk in the streets of Petersburgh, I \
feel a cold northern breeze play upon my cheeks, which braces my nerves and fills \
me with delight. Do you understand this feeling? This breeze, which has travelled \
from the regions towards which I am advancing, gives me a foretaste of those icy \
climes. Inspirited by this wind of promise, my daydreams become more fervent and \
vivid.\n";
        for encoder in [Encoder::with_byte_vocabulary(), encoder_with_he_merge()] {
            let tokens = encoder.encode(corpus);
            assert_eq!(encoder.decode(&tokens), corpus);
        }
    }

    #[test]
    fn test_deterministic_encoding() {
        let encoder = Encoder::with_byte_vocabulary();
        let text = "the quick brown fox jumps over the lazy dog";
        assert_eq!(encoder.encode(text), encoder.encode(text));
    }

    #[test]
    fn test_merge_applied() {
        let encoder = encoder_with_he_merge();
        let tokens = encoder.encode("he");
        assert_eq!(tokens, vec![256]);
        assert_eq!(encoder.decode(&tokens), "he");
    }

    #[test]
    fn test_merge_inside_word() {
        let encoder = encoder_with_he_merge();
        // "hello" -> ["he", "l", "l", "o"]
        let tokens = encoder.encode("hello");
        assert_eq!(tokens.len(), 4);
        assert_eq!(tokens[0], 256);
        assert_eq!(encoder.decode(&tokens), "hello");
    }

    #[test]
    fn test_unknown_tokens_skipped_on_decode() {
        let encoder = Encoder::with_byte_vocabulary();
        let decoded = encoder.decode(&[b'h' as Token, 9999, b'i' as Token]);
        assert_eq!(decoded, "hi");
    }

    #[test]
    fn test_cache_consistency() {
        let encoder = encoder_with_he_merge();
        // Second encode of the same word hits the cache; results must match.
        let first = encoder.encode("hello hello");
        let second = encoder.encode("hello hello");
        assert_eq!(first, second);
    }

    #[test]
    fn test_shared_across_threads() {
        let encoder = std::sync::Arc::new(Encoder::with_byte_vocabulary());
        let mut handles = Vec::new();
        for _ in 0..4 {
            let enc = encoder.clone();
            handles.push(std::thread::spawn(move || {
                for _ in 0..50 {
                    let tokens = enc.encode("concurrent encoding test");
                    assert_eq!(enc.decode(&tokens), "concurrent encoding test");
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }
    }
}
