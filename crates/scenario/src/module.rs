//! AI module identifiers.
//!
//! An AI module reaches this system as an opaque colon-separated triple
//! `model:prefix_id:hash` produced by an upstream encryption step. The
//! assembler only needs the triple as a prefix string; producing it is a
//! collaborator's job, so no cryptography lives here.

use crate::error::{Result, ScenarioError};
use std::fmt;

/// A parsed module identifier plus display metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AiModule {
    pub model: String,
    pub prefix_id: String,
    pub hash: String,
    pub name: String,
    pub description: String,
}

impl AiModule {
    /// Parse a `model:prefix_id:hash` identifier.
    pub fn from_id(id: &str, name: impl Into<String>, description: impl Into<String>) -> Result<Self> {
        let mut parts = id.splitn(3, ':');
        let (Some(model), Some(prefix_id), Some(hash)) =
            (parts.next(), parts.next(), parts.next())
        else {
            return Err(ScenarioError::InputParse(format!(
                "AI module id '{}' is not a model:prefix_id:hash triple",
                id
            )));
        };
        if model.is_empty() || prefix_id.is_empty() || hash.is_empty() {
            return Err(ScenarioError::InputParse(format!(
                "AI module id '{}' has an empty component",
                id
            )));
        }
        Ok(Self {
            model: model.to_string(),
            prefix_id: prefix_id.to_string(),
            hash: hash.to_string(),
            name: name.into(),
            description: description.into(),
        })
    }

    /// The prefix string submitted with generation requests.
    pub fn to_prefix(&self) -> String {
        format!("{}:{}:{}", self.model, self.prefix_id, self.hash)
    }
}

impl fmt::Display for AiModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_prefix())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_roundtrip() {
        let id = "6B-v4:0d6522cf:7d1b9435";
        let module = AiModule::from_id(id, "Poetry", "Writes verse").unwrap();
        assert_eq!(module.model, "6B-v4");
        assert_eq!(module.prefix_id, "0d6522cf");
        assert_eq!(module.hash, "7d1b9435");
        assert_eq!(module.to_prefix(), id);
    }

    #[test]
    fn test_malformed_ids_rejected() {
        assert!(AiModule::from_id("no-colons", "", "").is_err());
        assert!(AiModule::from_id("a:b", "", "").is_err());
        assert!(AiModule::from_id("a::c", "", "").is_err());
    }
}
