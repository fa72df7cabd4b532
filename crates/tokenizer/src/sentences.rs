//! Sentence segmentation.
//!
//! Sentence boundaries follow UAX #29 as implemented by the
//! `unicode-segmentation` crate. Trailing whitespace attaches to the
//! preceding sentence, and the segments tile the input exactly, which the
//! trim routines rely on when translating boundaries back into byte
//! offsets. Boundary decisions (abbreviations, ellipses) are fixed by
//! golden tests rather than re-derived.

use unicode_segmentation::UnicodeSegmentation;

/// Segment text into sentences with their byte offsets.
pub fn sentence_segments(text: &str) -> Vec<(usize, &str)> {
    text.split_sentence_bound_indices().collect()
}

/// Characters accepted as sentence-terminal punctuation.
const TERMINAL: &[char] = &['.', '!', '?', '…'];

/// Characters that may trail terminal punctuation (closing quotes and
/// brackets).
const TRAILING: &[char] = &['"', '\'', '\u{201d}', '\u{2019}', ')', ']'];

/// Check whether `text` ends on a completed sentence.
pub fn ends_on_boundary(text: &str) -> bool {
    let trimmed = text.trim_end();
    let stripped = trimmed.trim_end_matches(TRAILING);
    stripped.ends_with(TERMINAL)
}
