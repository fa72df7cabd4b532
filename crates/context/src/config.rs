//! Per-entry assembly policy.
//!
//! A `ContextConfig` is fully realized: the scenario loader folds every
//! optional document field into a concrete value before the assembler
//! runs, so the core never observes missing fields.

use serde::{Deserialize, Serialize};
use taleweave_tokenizer::TrimDirection;

/// Deepest trim granularity permitted for an entry.
///
/// Ordered coarse to fine; `Sentence` also permits newline trimming, and
/// `Token` permits everything down to raw token slicing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MaxTrimType {
    Newline,
    Sentence,
    Token,
}

/// Assembly policy for a single context entry.
#[derive(Debug, Clone)]
pub struct ContextConfig {
    /// Wrapped in front of the text before tokenization.
    pub prefix: String,
    /// Wrapped after the text before tokenization.
    pub suffix: String,
    /// Upper bound on this entry's contribution.
    pub token_budget: usize,
    /// Tokens set aside for this entry before global allocation.
    pub reserved_tokens: usize,
    /// Larger = earlier allocation.
    pub budget_priority: i64,
    /// Which side is shortened when over budget.
    pub trim_direction: TrimDirection,
    /// Deepest granularity permitted.
    pub maximum_trim_type: MaxTrimType,
    /// 0 = front, positive = line offset, negative = offset from the end.
    pub insertion_position: i64,
    /// Realize the entry even when its budget contribution is zero.
    pub force: bool,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            prefix: String::new(),
            suffix: "\n".to_string(),
            token_budget: 2048,
            reserved_tokens: 0,
            budget_priority: 400,
            trim_direction: TrimDirection::Bottom,
            maximum_trim_type: MaxTrimType::Sentence,
            insertion_position: -1,
            force: false,
        }
    }
}

impl ContextConfig {
    /// Defaults for the story entry.
    pub fn story() -> Self {
        Self {
            prefix: String::new(),
            suffix: String::new(),
            token_budget: 2048,
            reserved_tokens: 512,
            budget_priority: 0,
            trim_direction: TrimDirection::Top,
            maximum_trim_type: MaxTrimType::Sentence,
            insertion_position: -1,
            force: true,
        }
    }

    /// Defaults for the pinned Memory entry.
    pub fn memory() -> Self {
        Self {
            budget_priority: 800,
            insertion_position: 0,
            force: true,
            ..Self::default()
        }
    }

    /// Defaults for the pinned Author's Note entry.
    pub fn authors_note() -> Self {
        Self {
            reserved_tokens: 2048,
            budget_priority: -400,
            insertion_position: -4,
            force: true,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trim_type_ordering() {
        assert!(MaxTrimType::Newline < MaxTrimType::Sentence);
        assert!(MaxTrimType::Sentence < MaxTrimType::Token);
    }

    #[test]
    fn test_pinned_defaults() {
        let memory = ContextConfig::memory();
        assert_eq!(memory.budget_priority, 800);
        assert_eq!(memory.insertion_position, 0);
        assert!(memory.force);

        let authors_note = ContextConfig::authors_note();
        assert_eq!(authors_note.budget_priority, -400);
        assert_eq!(authors_note.insertion_position, -4);
        assert_eq!(authors_note.reserved_tokens, 2048);

        let story = ContextConfig::story();
        assert_eq!(story.reserved_tokens, 512);
        assert_eq!(story.trim_direction, TrimDirection::Top);
    }

    #[test]
    fn test_trim_type_serde() {
        let json = serde_json::to_string(&MaxTrimType::Sentence).unwrap();
        assert_eq!(json, "\"sentence\"");
        let parsed: MaxTrimType = serde_json::from_str("\"token\"").unwrap();
        assert_eq!(parsed, MaxTrimType::Token);
    }
}
