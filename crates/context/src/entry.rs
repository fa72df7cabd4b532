//! Context entries and their allocation ordering.

use crate::config::ContextConfig;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use taleweave_tokenizer::TokenSequence;

/// Byte spans of key matches within a candidate text.
pub type MatchSpans = Vec<[usize; 2]>;

/// Per-candidate match maps: resolved key string -> spans.
pub type MatchIndexes = Vec<BTreeMap<String, MatchSpans>>;

/// A text fragment participating in context assembly.
#[derive(Debug, Clone)]
pub struct ContextEntry {
    /// The (placeholder-resolved) text of this entry.
    pub text: String,
    /// Assembly policy.
    pub config: ContextConfig,
    /// Pre-computed tokens of `prefix + text + suffix`, if already known.
    /// The assembler encodes on demand when absent.
    pub tokens: Option<TokenSequence>,
    /// Display label used in reports.
    pub label: String,
    /// Key matches that activated this entry (empty for pinned entries).
    pub match_indexes: MatchIndexes,
    /// Tie-breaker for equal priorities: higher sorts first.
    pub stable_index: u64,
}

impl ContextEntry {
    /// Create an entry with a label and config, no matches.
    pub fn new(text: impl Into<String>, label: impl Into<String>, config: ContextConfig) -> Self {
        Self {
            text: text.into(),
            config,
            tokens: None,
            label: label.into(),
            match_indexes: MatchIndexes::new(),
            stable_index: 0,
        }
    }

    /// Same, with an explicit stable index.
    pub fn with_index(
        text: impl Into<String>,
        label: impl Into<String>,
        config: ContextConfig,
        stable_index: u64,
    ) -> Self {
        Self {
            stable_index,
            ..Self::new(text, label, config)
        }
    }
}

/// An ordered list of context entries.
pub type ContextEntries = Vec<ContextEntry>;

/// Allocation order: `budget_priority` descending, ties broken by
/// `stable_index` descending (LIFO within equal priority).
pub fn allocation_ordering(a: &ContextEntry, b: &ContextEntry) -> Ordering {
    b.config
        .budget_priority
        .cmp(&a.config.budget_priority)
        .then_with(|| b.stable_index.cmp(&a.stable_index))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(priority: i64, stable_index: u64) -> ContextEntry {
        let config = ContextConfig {
            budget_priority: priority,
            ..ContextConfig::default()
        };
        ContextEntry::with_index("", format!("p{}i{}", priority, stable_index), config, stable_index)
    }

    #[test]
    fn test_priority_descending() {
        let mut entries = vec![entry(0, 0), entry(800, 1), entry(-400, 2)];
        entries.sort_by(allocation_ordering);
        let labels: Vec<&str> = entries.iter().map(|e| e.label.as_str()).collect();
        assert_eq!(labels, vec!["p800i1", "p0i0", "p-400i2"]);
    }

    #[test]
    fn test_equal_priority_is_lifo() {
        let mut entries = vec![entry(400, 3), entry(400, 5), entry(400, 4)];
        entries.sort_by(allocation_ordering);
        let indexes: Vec<u64> = entries.iter().map(|e| e.stable_index).collect();
        assert_eq!(indexes, vec![5, 4, 3]);
    }
}
