//! Keyword-activated lorebook entries.
//!
//! Each enabled entry scans candidate texts for its key regexes within a
//! trailing search window. A match (or `force_activation`) turns the
//! entry into a [`ContextEntry`] carrying the byte spans of every match,
//! translated back into the candidate's coordinate space.

use crate::config::ContextConfig;
use crate::entry::{ContextEntries, ContextEntry, MatchIndexes, MatchSpans};
use crate::error::{ContextError, Result};
use crate::placeholders::Placeholders;
use regex::Regex;
use std::collections::BTreeMap;
use tracing::debug;

/// A text the matcher scans. Entries only search non-story candidates
/// when their `non_story_activatable` flag is set.
#[derive(Debug, Clone, Copy)]
pub struct Candidate<'a> {
    pub text: &'a str,
    pub story: bool,
}

impl<'a> Candidate<'a> {
    pub fn story(text: &'a str) -> Self {
        Self { text, story: true }
    }

    pub fn other(text: &'a str) -> Self {
        Self { text, story: false }
    }
}

/// Compile the word-boundary-framed, case-insensitive regex for a key.
pub fn compile_key(key: &str) -> Result<Regex> {
    Regex::new(&format!(r"(?i)(^|\W)({})($|\W)", key)).map_err(|err| {
        ContextError::RegexCompile {
            key: key.to_string(),
            err,
        }
    })
}

/// A conditional context entry activated by keyword matches.
#[derive(Debug, Clone)]
pub struct LorebookEntry {
    pub text: String,
    pub config: ContextConfig,
    pub display_name: String,
    pub keys: Vec<String>,
    /// Compiled per-key regexes, parallel to `keys`.
    pub key_regexes: Vec<Regex>,
    /// How many trailing bytes of each candidate are searched.
    pub search_range: usize,
    pub enabled: bool,
    pub force_activation: bool,
    pub key_relative: bool,
    pub non_story_activatable: bool,
    pub category_id: Option<String>,
}

impl LorebookEntry {
    /// Create an enabled entry with compiled keys and default policy.
    pub fn new(
        text: impl Into<String>,
        display_name: impl Into<String>,
        keys: Vec<String>,
    ) -> Result<Self> {
        let key_regexes = keys
            .iter()
            .map(|key| compile_key(key))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            text: text.into(),
            config: ContextConfig::default(),
            display_name: display_name.into(),
            keys,
            key_regexes,
            search_range: 1000,
            enabled: true,
            force_activation: false,
            key_relative: false,
            non_story_activatable: false,
            category_id: None,
        })
    }
}

/// A category grouping lorebook entries.
#[derive(Debug, Clone)]
pub struct LorebookCategory {
    pub id: String,
    pub name: String,
    pub enabled: bool,
}

/// Lorebook-wide settings.
#[derive(Debug, Clone, Default)]
pub struct LorebookSettings {
    pub order_by_key_locations: bool,
}

/// A collection of keyword-activated entries.
#[derive(Debug, Clone, Default)]
pub struct Lorebook {
    pub entries: Vec<LorebookEntry>,
    pub categories: Vec<LorebookCategory>,
    pub settings: LorebookSettings,
}

/// The trailing window of `text` limited to `range` bytes, with its start
/// offset. The cut is widened to the next char boundary when it would
/// split a code point.
fn search_window(text: &str, range: usize) -> (usize, &str) {
    if range >= text.len() {
        return (0, text);
    }
    let mut start = text.len() - range;
    while start < text.len() && !text.is_char_boundary(start) {
        start += 1;
    }
    (start, &text[start..])
}

impl Lorebook {
    /// Scan candidates and activate matching entries.
    ///
    /// Keys are passed through placeholder substitution before matching;
    /// a changed key is recompiled. Activated entries receive stable
    /// indexes counting up from `base_index`, which callers set above the
    /// pinned entries.
    pub fn resolve_contexts(
        &self,
        placeholders: &Placeholders,
        candidates: &[Candidate<'_>],
        base_index: u64,
    ) -> Result<ContextEntries> {
        let mut activated = ContextEntries::new();

        for (lore_idx, entry) in self.entries.iter().enumerate() {
            if !entry.enabled {
                continue;
            }

            // Resolve keys once per entry; a key changed by placeholder
            // substitution is recompiled.
            let mut keys = Vec::with_capacity(entry.key_regexes.len());
            for (key_idx, compiled) in entry.key_regexes.iter().enumerate() {
                let raw_key = &entry.keys[key_idx];
                let resolved_key = placeholders.substitute(raw_key);
                let regex = if resolved_key != *raw_key {
                    compile_key(&resolved_key)?
                } else {
                    compiled.clone()
                };
                keys.push((resolved_key, regex));
            }

            // One match map per candidate, holding every key that hit
            // inside that candidate's window.
            let mut indexes = MatchIndexes::new();
            for candidate in candidates {
                if !candidate.story && !entry.non_story_activatable {
                    continue;
                }
                let (offset, window) = search_window(candidate.text, entry.search_range);
                let mut key_matches = BTreeMap::new();
                for (resolved_key, regex) in &keys {
                    let spans: MatchSpans = regex
                        .find_iter(window)
                        .map(|m| [m.start() + offset, m.end() + offset])
                        .collect();
                    if !spans.is_empty() {
                        key_matches.insert(resolved_key.clone(), spans);
                    }
                }
                if !key_matches.is_empty() {
                    indexes.push(key_matches);
                }
            }

            if !indexes.is_empty() || entry.force_activation {
                debug!(
                    entry = %entry.display_name,
                    matches = indexes.len(),
                    forced = entry.force_activation,
                    "lorebook entry activated"
                );
                let mut config = entry.config.clone();
                config.force = entry.force_activation || config.force;
                activated.push(ContextEntry {
                    text: placeholders.substitute(&entry.text),
                    config,
                    tokens: None,
                    label: entry.display_name.clone(),
                    match_indexes: indexes,
                    stable_index: base_index + lore_idx as u64,
                });
            }
        }
        Ok(activated)
    }
}
