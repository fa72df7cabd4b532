//! Word splitting for pre-tokenization.
//!
//! Text is segmented into token candidates before BPE runs: contractions,
//! optionally space-prefixed letter and digit runs, punctuation runs, and
//! whitespace runs. Newlines fall into the whitespace alternative and so
//! become their own segments.

use regex::Regex;

/// The pre-tokenization pattern shared by encoding and trimming.
pub const SPLIT_PATTERN: &str =
    r"'s|'t|'re|'ve|'m|'ll|'d| ?\p{L}+| ?\p{N}+| ?[^\s\p{L}\p{N}]+|\s+";

/// Word splitter wrapping the compiled pattern.
pub struct WordSplitter {
    pattern: Regex,
}

impl WordSplitter {
    /// Compile the splitter. The pattern is a constant, so compilation
    /// cannot fail for any input reaching this call.
    pub fn new() -> Self {
        Self {
            pattern: Regex::new(SPLIT_PATTERN).expect("split pattern compiles"),
        }
    }

    /// Split text into word segments. The concatenation of all segments
    /// equals the input.
    pub fn split<'a>(&self, text: &'a str) -> Vec<&'a str> {
        self.pattern.find_iter(text).map(|m| m.as_str()).collect()
    }
}

impl Default for WordSplitter {
    fn default() -> Self {
        Self::new()
    }
}
