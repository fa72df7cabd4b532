//! The BPE merge loop.
//!
//! Starting from individual visual characters, the loop repeatedly picks
//! the adjacent pair with the lowest merge rank and merges every
//! non-overlapping occurrence of it left-to-right in one pass, until the
//! word collapses to a single piece or no ranked pair remains.

use crate::vocab::{MergeRanks, Pair};
use compact_str::{CompactString, ToCompactString};
use dary_heap::OctonaryHeap;

/// A ranked merge candidate for the selection heap.
#[derive(Debug, Clone, PartialEq, Eq)]
struct RankedPair {
    rank: u32,
    pair: Pair,
}

// Lower rank = higher priority; OctonaryHeap is a max-heap, so the
// ordering is reversed.
impl Ord for RankedPair {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.rank
            .cmp(&other.rank)
            .reverse()
            .then_with(|| self.pair.cmp(&other.pair).reverse())
    }
}

impl PartialOrd for RankedPair {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

/// Collect the distinct adjacent pairs of a word, in first-seen order.
fn adjacent_pairs(word: &[CompactString]) -> Vec<Pair> {
    let mut seen = Vec::new();
    for window in word.windows(2) {
        let pair = (window[0].clone(), window[1].clone());
        if !seen.contains(&pair) {
            seen.push(pair);
        }
    }
    seen
}

/// Find the ranked pair with the lowest rank, if any pair is ranked.
fn lowest_ranked(word: &[CompactString], merges: &MergeRanks) -> Option<Pair> {
    let mut heap = OctonaryHeap::with_capacity(word.len());
    for pair in adjacent_pairs(word) {
        if let Some(&rank) = merges.get(&pair) {
            heap.push(RankedPair { rank, pair });
        }
    }
    heap.pop().map(|candidate| candidate.pair)
}

/// Run the merge loop over a word of single-character pieces.
pub(crate) fn merge_word(mut word: Vec<CompactString>, merges: &MergeRanks) -> Vec<CompactString> {
    while word.len() > 1 {
        let Some((first, second)) = lowest_ranked(&word, merges) else {
            break;
        };
        let mut merged: CompactString = first.clone();
        merged.push_str(&second);

        let mut next = Vec::with_capacity(word.len());
        let mut idx = 0;
        while idx < word.len() {
            if idx + 1 < word.len() && word[idx] == first && word[idx + 1] == second {
                next.push(merged.clone());
                idx += 2;
            } else {
                next.push(word[idx].clone());
                idx += 1;
            }
        }
        word = next;
    }
    word
}

#[cfg(test)]
mod tests {
    use super::*;

    fn word(chars: &str) -> Vec<CompactString> {
        chars.chars().map(|c| c.to_compact_string()).collect()
    }

    fn ranks(pairs: &[(&str, &str)]) -> MergeRanks {
        let mut merges = MergeRanks::new();
        for (rank, (left, right)) in pairs.iter().enumerate() {
            merges.insert(
                (CompactString::new(left), CompactString::new(right)),
                rank as u32,
            );
        }
        merges
    }

    #[test]
    fn test_no_ranked_pairs() {
        let merges = MergeRanks::new();
        assert_eq!(merge_word(word("abc"), &merges), word("abc"));
    }

    #[test]
    fn test_single_merge() {
        let merges = ranks(&[("a", "b")]);
        let result = merge_word(word("abc"), &merges);
        assert_eq!(result, vec![CompactString::new("ab"), CompactString::new("c")]);
    }

    #[test]
    fn test_rank_priority() {
        // "bc" outranks "ab", so it merges first and "ab" never forms.
        let merges = ranks(&[("b", "c"), ("a", "b")]);
        let result = merge_word(word("abc"), &merges);
        assert_eq!(result, vec![CompactString::new("a"), CompactString::new("bc")]);
    }

    #[test]
    fn test_merge_all_occurrences_in_one_pass() {
        let merges = ranks(&[("a", "a")]);
        let result = merge_word(word("aaaa"), &merges);
        // Non-overlapping left-to-right: "aa" + "aa", then "aaaa" only if ranked.
        assert_eq!(result, vec![CompactString::new("aa"), CompactString::new("aa")]);
    }

    #[test]
    fn test_cascading_merges() {
        let merges = ranks(&[("h", "e"), ("he", "l"), ("hel", "l"), ("hell", "o")]);
        let result = merge_word(word("hello"), &merges);
        assert_eq!(result, vec![CompactString::new("hello")]);
    }
}
