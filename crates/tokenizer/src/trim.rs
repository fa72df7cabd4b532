//! Budget-aware trimming of token sequences.
//!
//! Trims shorten a sequence to a token limit at newline, sentence, or raw
//! token granularity. The direction names the side that is removed: `Top`
//! keeps a suffix, `Bottom` keeps a prefix. All trims decode, segment,
//! and re-encode, so the returned count is exact rather than estimated.

use crate::encoder::Encoder;
use crate::sentences;
use crate::vocab::{Token, TokenSequence};
use crate::Result;

/// Which side of a sequence is removed when over limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrimDirection {
    /// Remove from the top; keep a suffix.
    Top,
    /// Remove from the bottom; keep a prefix.
    Bottom,
    /// Do not trim; over-limit input yields an empty sequence.
    None,
}

impl Encoder {
    /// Trim at newline boundaries.
    ///
    /// Sequences at or under `limit` are returned unchanged. Retained
    /// lines re-attach their separating newline on the preserved side
    /// before re-encoding, and accumulation stops before the line that
    /// would exceed the limit.
    pub fn trim_newlines(
        &self,
        tokens: &[Token],
        direction: TrimDirection,
        limit: usize,
    ) -> Result<TokenSequence> {
        if tokens.len() <= limit {
            return Ok(tokens.to_vec());
        }
        if direction == TrimDirection::None {
            return Ok(TokenSequence::new());
        }

        let text = self.decode(tokens);
        let lines: Vec<&str> = text.split('\n').collect();
        let mut acc = TokenSequence::new();

        match direction {
            TrimDirection::Top => {
                for line in lines.iter().rev() {
                    let with_sep = format!("\n{}", line);
                    let mut encoded = self.encode(&with_sep);
                    if encoded.len() + acc.len() > limit {
                        break;
                    }
                    encoded.extend_from_slice(&acc);
                    acc = encoded;
                }
            }
            TrimDirection::Bottom => {
                for line in lines.iter() {
                    let with_sep = format!("{}\n", line);
                    let encoded = self.encode(&with_sep);
                    if encoded.len() + acc.len() > limit {
                        break;
                    }
                    acc.extend(encoded);
                }
            }
            TrimDirection::None => unreachable!(),
        }
        Ok(acc)
    }

    /// Trim at sentence boundaries.
    ///
    /// Same contract as [`Encoder::trim_newlines`], but boundaries come
    /// from the sentence segmenter. The accumulator walks byte offsets
    /// from the preserved end and re-encodes candidate spans, so the
    /// returned sequence is an exact encoding of a prefix or suffix of
    /// the decoded text.
    pub fn trim_sentences(
        &self,
        tokens: &[Token],
        direction: TrimDirection,
        limit: usize,
    ) -> Result<TokenSequence> {
        if tokens.len() <= limit {
            return Ok(tokens.to_vec());
        }
        if direction == TrimDirection::None {
            return Ok(TokenSequence::new());
        }

        let text = self.decode(tokens);
        let segments = sentences::sentence_segments(&text);
        let mut best = TokenSequence::new();

        match direction {
            TrimDirection::Top => {
                for &(start, _) in segments.iter().rev() {
                    let encoded = self.encode(&text[start..]);
                    if encoded.len() > limit {
                        break;
                    }
                    best = encoded;
                }
            }
            TrimDirection::Bottom => {
                for &(start, segment) in segments.iter() {
                    let encoded = self.encode(&text[..start + segment.len()]);
                    if encoded.len() > limit {
                        break;
                    }
                    best = encoded;
                }
            }
            TrimDirection::None => unreachable!(),
        }
        Ok(best)
    }

    /// Drop a trailing incomplete sentence.
    ///
    /// Decodes, truncates at the start of the final sentence when that
    /// sentence does not end on terminal punctuation, and re-encodes.
    pub fn trim_incomplete_sentence(&self, tokens: &[Token]) -> Result<TokenSequence> {
        let text = self.decode(tokens);
        let result = if sentences::ends_on_boundary(&text) {
            text.as_str()
        } else {
            match sentences::sentence_segments(&text).last() {
                Some(&(start, _)) => &text[..start],
                None => "",
            }
        };
        Ok(self.encode(result.trim_end()))
    }
}
