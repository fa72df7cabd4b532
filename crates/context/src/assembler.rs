//! The context assembler.
//!
//! Given an ordered list of entries and a token budget, the assembler
//! produces the final input text and a [`ContextReport`]. Allocation is
//! deterministic: entries are walked in priority order (LIFO within equal
//! priority), each is trimmed to its allowance, and its decoded lines are
//! spliced into the working output at its insertion position.
//!
//! Reservations pre-charge the budget on an entry's behalf and are
//! returned to the pot for the duration of that entry's own allocation.

use crate::config::{ContextConfig, MaxTrimType};
use crate::entry::{allocation_ordering, ContextEntries, ContextEntry};
use crate::report::{ContextReport, ReportEntry};
use taleweave_tokenizer::{Encoder, Token, TokenSequence, TrimDirection};

/// Assembly tunables.
#[derive(Debug, Clone)]
pub struct AssemblerOptions {
    /// A trim yielding fewer than this fraction of its target is
    /// discarded so the next, finer strategy runs instead.
    pub discard_ratio: f32,
}

impl Default for AssemblerOptions {
    fn default() -> Self {
        Self { discard_ratio: 0.3 }
    }
}

struct Prepared<'a> {
    entry: &'a ContextEntry,
    tokens: TokenSequence,
    /// This entry's contribution to the reservation pot.
    reservation: i64,
}

/// Assemble entries into a final input string and report.
///
/// A nonpositive budget yields an empty string and an empty report. The
/// assembler never panics on malformed combinations; entries that cannot
/// be afforded are skipped (or realized with zero tokens when forced).
pub fn assemble(
    entries: &ContextEntries,
    token_budget: i64,
    options: &AssemblerOptions,
    encoder: &Encoder,
) -> (String, ContextReport) {
    let mut report = ContextReport::new();
    if token_budget <= 0 {
        return (String::new(), report);
    }

    // Tokenize every entry: prefix + text + suffix. Entries with empty
    // text stay empty rather than tokenizing their wrapping alone.
    let mut prepared: Vec<Prepared<'_>> = entries
        .iter()
        .map(|entry| {
            let tokens = match &entry.tokens {
                Some(tokens) => tokens.clone(),
                None if entry.text.is_empty() => TokenSequence::new(),
                None => encoder.encode(&format!(
                    "{}{}{}",
                    entry.config.prefix, entry.text, entry.config.suffix
                )),
            };
            Prepared {
                entry,
                tokens,
                reservation: 0,
            }
        })
        .collect();

    // Charge reservations against the budget, highest priority first.
    let mut budget = token_budget;
    let mut reserved_total: i64 = 0;
    let mut reserved_order: Vec<usize> = (0..prepared.len())
        .filter(|&idx| prepared[idx].entry.config.reserved_tokens > 0)
        .collect();
    reserved_order.sort_by(|&a, &b| allocation_ordering(prepared[a].entry, prepared[b].entry));
    for idx in reserved_order {
        let slot = &mut prepared[idx];
        let contribution = slot.entry.config.reserved_tokens.min(slot.tokens.len()) as i64;
        slot.reservation = contribution;
        budget -= contribution;
        reserved_total += contribution;
    }

    // Allocation order.
    let mut order: Vec<usize> = (0..prepared.len()).collect();
    order.sort_by(|&a, &b| allocation_ordering(prepared[a].entry, prepared[b].entry));

    let mut output: Vec<String> = Vec::new();
    for idx in order {
        let slot = &prepared[idx];
        let entry = slot.entry;

        // The entry's own reservation returns to the pot while it
        // allocates.
        let allowance = budget + slot.reservation;
        let trimmed = resolve_trim(&slot.tokens, &entry.config, allowance, options, encoder);

        // The reservation is released whether or not the entry is
        // realized; a skipped entry must not strand its reserved tokens.
        budget += slot.reservation;
        reserved_total -= slot.reservation;

        if trimmed.is_empty() && !(entry.config.force && !slot.tokens.is_empty()) {
            continue;
        }

        budget -= trimmed.len() as i64;

        if !trimmed.is_empty() {
            let decoded = encoder.decode(&trimmed);
            let lines: Vec<String> = decoded.split('\n').map(String::from).collect();
            insert_lines(&mut output, entry.config.insertion_position, lines);
        }

        report.push(ReportEntry {
            label: entry.label.clone(),
            insertion_pos: entry.config.insertion_position,
            token_count: slot.tokens.len(),
            tokens_inserted: trimmed.len(),
            budget_remaining: budget,
            reserved_remaining: reserved_total,
            match_indexes: entry.match_indexes.clone(),
            forced: entry.config.force,
        });
    }

    (output.join("\n"), report)
}

/// Trim an entry's tokens to fit its allowance and self-budget.
///
/// Strategies run coarse to fine: newline, then sentence (if permitted),
/// then a raw token slice (if permitted). A result below the discard
/// ratio of the target is thrown away so the next strategy gets a chance;
/// coarse boundaries that keep almost nothing are rarely worth emitting.
fn resolve_trim(
    tokens: &[Token],
    config: &ContextConfig,
    allowance: i64,
    options: &AssemblerOptions,
    encoder: &Encoder,
) -> TokenSequence {
    let count = tokens.len() as i64;
    if count == 0 {
        return TokenSequence::new();
    }

    let self_budget = config.token_budget as i64;
    let target = if allowance - count > self_budget {
        self_budget
    } else if allowance - count >= 0 {
        count
    } else {
        allowance
    };
    let target = target.max(0) as usize;
    if target == 0 {
        return TokenSequence::new();
    }

    let discard = |trimmed: TokenSequence| -> TokenSequence {
        if (trimmed.len() as f32) < options.discard_ratio * target as f32 {
            TokenSequence::new()
        } else {
            trimmed
        }
    };

    let direction = config.trim_direction;
    let mut trimmed = discard(
        encoder
            .trim_newlines(tokens, direction, target)
            .unwrap_or_default(),
    );
    if trimmed.is_empty() && config.maximum_trim_type >= MaxTrimType::Sentence {
        trimmed = discard(
            encoder
                .trim_sentences(tokens, direction, target)
                .unwrap_or_default(),
        );
    }
    if trimmed.is_empty() && config.maximum_trim_type == MaxTrimType::Token {
        let take = target.min(tokens.len());
        trimmed = match direction {
            TrimDirection::Top => tokens[tokens.len() - take..].to_vec(),
            TrimDirection::Bottom => tokens[..take].to_vec(),
            TrimDirection::None => TokenSequence::new(),
        };
    }
    trimmed
}

/// Splice lines into the output at a signed position.
///
/// Nonnegative positions split at that line index (clamped to the end).
/// Negative positions count from the end with `p' = p + 1`, so `-1`
/// appends after the last line and `-4` inserts three lines from the
/// end; positions beyond the front prepend.
fn insert_lines(output: &mut Vec<String>, position: i64, lines: Vec<String>) {
    let len = output.len() as i64;
    let split_at = if position >= 0 {
        position.min(len)
    } else {
        (len + position + 1).max(0)
    } as usize;

    let tail = output.split_off(split_at);
    output.extend(lines);
    output.extend(tail);
}
