//! Loading of tokenizer artifacts.
//!
//! An encoder is built from two artifacts shipped alongside the binary:
//! `vocab.json`, a mapping of piece string to token id, and `merges.txt`,
//! newline-delimited `left right` pairs whose line order defines the merge
//! rank. The first line of `merges.txt` is a format header and is skipped.

use crate::vocab::{MergeRanks, Token, Vocab};
use crate::{Result, TokenizerError};
use compact_str::CompactString;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Load `vocab.json` from a directory.
pub fn load_vocab(dir: &Path) -> Result<Vocab> {
    let path = dir.join("vocab.json");
    let file = File::open(&path).map_err(|err| TokenizerError::Io {
        path: path.clone(),
        err,
    })?;
    let reader = BufReader::new(file);
    let raw: std::collections::HashMap<String, Token> = serde_json::from_reader(reader)
        .map_err(|e| TokenizerError::Load(format!("Failed to deserialize vocab.json: {}", e)))?;

    let mut vocab = Vocab::with_capacity(raw.len());
    for (piece, token) in raw {
        vocab.insert(CompactString::new(&piece), token);
    }
    Ok(vocab)
}

/// Load `merges.txt` from a directory.
///
/// Ranks are assigned in line order starting at 0, after the header line.
pub fn load_merges(dir: &Path) -> Result<MergeRanks> {
    let path = dir.join("merges.txt");
    let content = std::fs::read_to_string(&path).map_err(|err| TokenizerError::Io {
        path: path.clone(),
        err,
    })?;

    let mut merges = MergeRanks::new();
    let mut rank = 0u32;
    for (line_num, line) in content.lines().enumerate() {
        if line_num == 0 {
            // Format header.
            continue;
        }
        if line.is_empty() {
            continue;
        }
        let Some((left, right)) = line.split_once(' ') else {
            return Err(TokenizerError::Load(format!(
                "Invalid merge at line {}: '{}'",
                line_num + 1,
                line
            )));
        };
        merges.insert(
            (CompactString::new(left), CompactString::new(right)),
            rank,
        );
        rank += 1;
    }
    Ok(merges)
}
