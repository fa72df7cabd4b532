//! Placeholder variables.
//!
//! Texts may declare variables in two grammars: inline definitions of the
//! form `${VAR[DEFAULT]:DESCRIPTION}`, and a leading table block
//!
//! ```text
//! %{
//! VAR[DEFAULT]:DESCRIPTION
//! }
//! ```
//!
//! whose lines declare one variable each. References are `${VAR}` or
//! `${VAR[...]}`; the bracketed portion is discarded at reference sites.
//! Unknown references are left intact by substitution; callers rely on
//! unresolved variables surviving verbatim.

use ahash::AHashMap;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use tracing::warn;

const VAR_CLASS: &str = r"[\p{L}0-9_#()\-]+";

fn def_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(&format!(
            r"\$\{{({VAR_CLASS})\[([^\]]*)\]:([^}}]*)\}}"
        ))
        .expect("definition pattern compiles")
    })
}

fn reference_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(&format!(
            r"\$\{{({VAR_CLASS})(?:\[[^\]]*\])?(?::[^}}]*)?\}}"
        ))
        .expect("reference pattern compiles")
    })
}

fn table_line_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(&format!(r"^({VAR_CLASS})\[([^\]]*)\]:(.*)$"))
            .expect("table line pattern compiles")
    })
}

/// A named variable replaced at assembly time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Placeholder {
    pub variable: String,
    pub default: String,
    pub description: String,
    pub long_description: String,
    pub value: String,
}

impl Default for Placeholder {
    fn default() -> Self {
        Self {
            variable: String::new(),
            default: String::new(),
            description: String::new(),
            long_description: String::new(),
            value: String::new(),
        }
    }
}

/// A table of placeholders keyed by variable name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Placeholders(AHashMap<String, Placeholder>);

/// Strip a leading table block, returning the remainder of the text.
pub fn strip_table(text: &str) -> &str {
    if let Some(body) = text.strip_prefix("%{\n") {
        if let Some(end) = body.find("\n}\n") {
            return &body[end + 3..];
        }
    }
    text
}

/// The inside of a leading table block, if present.
fn table_body(text: &str) -> Option<&str> {
    let body = text.strip_prefix("%{\n")?;
    let end = body.find("\n}\n")?;
    Some(&body[..end])
}

impl Placeholders {
    pub fn new() -> Self {
        Self(AHashMap::new())
    }

    /// Collect inline `${VAR[DEFAULT]:DESCRIPTION}` definitions. Each
    /// discovered entry starts with its value set to the default.
    pub fn discover_defs(text: &str) -> Self {
        let mut defs = Self::new();
        for caps in def_pattern().captures_iter(text) {
            let variable = caps[1].to_string();
            defs.put(Placeholder {
                variable: variable.clone(),
                default: caps[2].to_string(),
                description: caps[3].to_string(),
                long_description: String::new(),
                value: caps[2].to_string(),
            });
        }
        defs
    }

    /// Collect definitions from a leading table block.
    pub fn discover_table(text: &str) -> Self {
        let mut defs = Self::new();
        let Some(body) = table_body(text) else {
            return defs;
        };
        for line in body.lines() {
            if let Some(caps) = table_line_pattern().captures(line) {
                defs.put(Placeholder {
                    variable: caps[1].to_string(),
                    default: caps[2].to_string(),
                    description: caps[3].to_string(),
                    long_description: String::new(),
                    value: caps[2].to_string(),
                });
            }
        }
        defs
    }

    /// Collect definitions from both grammars; table entries win.
    pub fn discover(text: &str) -> Self {
        let mut defs = Self::discover_defs(text);
        defs.merge(Self::discover_table(text));
        defs
    }

    /// Fold another table into this one. Later definitions overwrite.
    pub fn merge(&mut self, other: Placeholders) {
        for (variable, placeholder) in other.0 {
            if self.0.contains_key(&variable) {
                warn!(variable = %variable, "duplicate placeholder definition overwritten");
            }
            self.0.insert(variable, placeholder);
        }
    }

    /// Insert or replace a single placeholder.
    pub fn put(&mut self, placeholder: Placeholder) {
        self.0.insert(placeholder.variable.clone(), placeholder);
    }

    /// Override a value. Unknown keys are added with no default.
    pub fn update_value(&mut self, variable: &str, value: impl Into<String>) {
        let value = value.into();
        match self.0.get_mut(variable) {
            Some(placeholder) => placeholder.value = value,
            None => {
                self.put(Placeholder {
                    variable: variable.to_string(),
                    value,
                    ..Placeholder::default()
                });
            }
        }
    }

    /// Replace known references in `text`, after stripping any leading
    /// table block. Unknown references are preserved verbatim.
    pub fn substitute(&self, text: &str) -> String {
        let stripped = strip_table(text);
        reference_pattern()
            .replace_all(stripped, |caps: &regex::Captures<'_>| {
                match self.0.get(&caps[1]) {
                    Some(placeholder) => placeholder.value.clone(),
                    None => caps[0].to_string(),
                }
            })
            .into_owned()
    }

    pub fn get(&self, variable: &str) -> Option<&Placeholder> {
        self.0.get(variable)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Placeholder)> {
        self.0.iter()
    }

    /// Entries sorted by variable name, for stable display.
    pub fn sorted(&self) -> Vec<&Placeholder> {
        let mut entries: Vec<&Placeholder> = self.0.values().collect();
        entries.sort_by(|a, b| a.variable.cmp(&b.variable));
        entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TABLE_TEXT: &str = "%{\n1Name[Daniel Blackthorn]:Name\n2HairColor[red]:Hair Color (red, blonde)\n}\nI am known as ${1Name}, and my hair is ${2HairColor}.";

    #[test]
    fn test_discover_inline_defs() {
        let text = "This is a foobar test. ${1Name[Daniel]:Your name?} ${2HerName[Audrey]:Her name?}";
        let defs = Placeholders::discover(text);
        assert_eq!(defs.len(), 2);

        let first = defs.get("1Name").unwrap();
        assert_eq!(first.default, "Daniel");
        assert_eq!(first.description, "Your name?");
        assert_eq!(first.value, "Daniel");

        let second = defs.get("2HerName").unwrap();
        assert_eq!(second.default, "Audrey");
        assert_eq!(second.value, "Audrey");
    }

    #[test]
    fn test_discover_table_block() {
        let defs = Placeholders::discover(TABLE_TEXT);
        assert_eq!(defs.len(), 2);
        assert_eq!(defs.get("1Name").unwrap().value, "Daniel Blackthorn");
        assert_eq!(
            defs.get("2HairColor").unwrap().description,
            "Hair Color (red, blonde)"
        );
    }

    #[test]
    fn test_substitute_inline() {
        let text = "This is a foobar test. ${1Name[Daniel]:Your name?} ${2HerName[Audrey]:Her name?}";
        let defs = Placeholders::discover(text);
        assert_eq!(defs.substitute(text), "This is a foobar test. Daniel Audrey");
    }

    #[test]
    fn test_substitute_strips_table() {
        let defs = Placeholders::discover(TABLE_TEXT);
        assert_eq!(
            defs.substitute(TABLE_TEXT),
            "I am known as Daniel Blackthorn, and my hair is red."
        );
    }

    #[test]
    fn test_unknown_reference_preserved() {
        let defs = Placeholders::new();
        let text = "Greetings from ${UNKNOWN} and ${also-unknown[x]}.";
        assert_eq!(defs.substitute(text), text);
    }

    #[test]
    fn test_update_value() {
        let mut defs =
            Placeholders::discover("${1Name[Daniel]:Your name?}");
        defs.update_value("1Name", "Erin");
        defs.update_value("NewVar", "fresh");

        assert_eq!(defs.get("1Name").unwrap().value, "Erin");
        assert_eq!(defs.get("1Name").unwrap().default, "Daniel");
        let added = defs.get("NewVar").unwrap();
        assert_eq!(added.value, "fresh");
        assert!(added.default.is_empty());
    }

    #[test]
    fn test_later_definition_overwrites() {
        let mut defs = Placeholders::discover_defs("${Who[first]:d1}");
        defs.merge(Placeholders::discover_defs("${Who[second]:d2}"));
        assert_eq!(defs.get("Who").unwrap().default, "second");
    }

    #[test]
    fn test_reference_with_bracket_discarded() {
        let mut defs = Placeholders::new();
        defs.update_value("Hero", "Anna");
        assert_eq!(defs.substitute("${Hero[ignored]} rides."), "Anna rides.");
    }

    #[test]
    fn test_strip_table_without_block() {
        assert_eq!(strip_table("plain text"), "plain text");
    }
}
