//! Structural report of an assembly run.
//!
//! One entry per realized context entry, in allocation order (not output
//! order). The report serializes to stable JSON for test fixtures and
//! tooling.

use crate::entry::MatchIndexes;
use serde::{Deserialize, Serialize};

/// What happened to one realized entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportEntry {
    /// Display label of the entry.
    pub label: String,
    /// Requested insertion position.
    pub insertion_pos: i64,
    /// Token count of the full entry before trimming.
    pub token_count: usize,
    /// Tokens actually inserted after trimming.
    pub tokens_inserted: usize,
    /// Global budget left after this entry's allocation.
    pub budget_remaining: i64,
    /// Reservation pot left after this entry's allocation.
    pub reserved_remaining: i64,
    /// Key matches that activated the entry.
    pub match_indexes: MatchIndexes,
    /// Whether the entry was forced.
    pub forced: bool,
}

/// Realized entries in allocation order.
pub type ContextReport = Vec<ReportEntry>;

/// Serialize a report as indented JSON.
pub fn to_json(report: &ContextReport) -> serde_json::Result<String> {
    serde_json::to_string_pretty(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stable_json_shape() {
        let report: ContextReport = vec![ReportEntry {
            label: "Story".into(),
            insertion_pos: -1,
            token_count: 12,
            tokens_inserted: 10,
            budget_remaining: 500,
            reserved_remaining: 0,
            match_indexes: MatchIndexes::new(),
            forced: true,
        }];

        let json = to_json(&report).unwrap();
        assert!(json.contains("\"label\": \"Story\""));
        assert!(json.contains("\"tokens_inserted\": 10"));

        let parsed: ContextReport = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].token_count, 12);
    }
}
