//! Raw scenario document types.
//!
//! These mirror the on-disk JSON shape: every policy field is optional
//! and unknown fields are ignored. The loader folds documents into
//! realized types via the `coerce` helpers, so nothing downstream ever
//! sees a missing value.

use crate::params::GenerateParams;
use serde::Deserialize;
use taleweave_context::{ContextConfig, MaxTrimType, Placeholder};
use taleweave_tokenizer::TrimDirection;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ContextConfigDoc {
    pub prefix: Option<String>,
    pub suffix: Option<String>,
    pub token_budget: Option<i64>,
    pub reserved_tokens: Option<i64>,
    pub budget_priority: Option<i64>,
    pub trim_direction: Option<String>,
    pub insertion_type: Option<String>,
    pub maximum_trim_type: Option<String>,
    pub insertion_position: Option<i64>,
    pub forced: Option<bool>,
    pub allow_inner_insertion: Option<bool>,
    pub allow_insertion_inside: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ContextEntryDoc {
    pub text: String,
    pub context_config: Option<ContextConfigDoc>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LorebookEntryDoc {
    pub text: String,
    pub context_config: Option<ContextConfigDoc>,
    pub last_updated_at: Option<i64>,
    pub display_name: Option<String>,
    pub keys: Vec<String>,
    pub search_range: Option<i64>,
    pub enabled: Option<bool>,
    pub force_activation: Option<bool>,
    pub key_relative: Option<bool>,
    pub non_story_activatable: Option<bool>,
    pub category: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LorebookCategoryDoc {
    pub id: String,
    pub name: String,
    pub enabled: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LorebookSettingsDoc {
    pub order_by_key_locations: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LorebookDoc {
    pub lorebook_version: Option<i64>,
    pub entries: Vec<LorebookEntryDoc>,
    pub settings: Option<LorebookSettingsDoc>,
    pub categories: Vec<LorebookCategoryDoc>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AiModuleDoc {
    pub id: String,
    pub name: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScenarioSettingsDoc {
    pub parameters: Option<GenerateParams>,
    pub prefix: Option<String>,
    pub trim_responses: Option<bool>,
    pub ban_brackets: Option<bool>,
    pub ai_module: Option<AiModuleDoc>,
    pub model: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScenarioDoc {
    pub scenario_version: Option<i64>,
    pub title: Option<String>,
    pub author: Option<String>,
    pub description: Option<String>,
    pub prompt: Option<String>,
    pub tags: Vec<String>,
    pub context: Vec<ContextEntryDoc>,
    pub settings: Option<ScenarioSettingsDoc>,
    pub lorebook: Option<LorebookDoc>,
    pub placeholders: Vec<Placeholder>,
    pub story_context_config: Option<ContextConfigDoc>,
}

fn parse_trim_direction(value: &str) -> TrimDirection {
    match value {
        "trimTop" => TrimDirection::Top,
        "trimBottom" => TrimDirection::Bottom,
        _ => TrimDirection::None,
    }
}

fn parse_max_trim_type(value: &str) -> MaxTrimType {
    match value {
        "sentence" => MaxTrimType::Sentence,
        "token" => MaxTrimType::Token,
        _ => MaxTrimType::Newline,
    }
}

/// Fold an optional document config over a realized base.
pub fn coerce_config(doc: Option<&ContextConfigDoc>, base: ContextConfig) -> ContextConfig {
    let Some(doc) = doc else {
        return base;
    };
    ContextConfig {
        prefix: doc.prefix.clone().unwrap_or(base.prefix),
        suffix: doc.suffix.clone().unwrap_or(base.suffix),
        token_budget: doc
            .token_budget
            .map(|v| v.max(0) as usize)
            .unwrap_or(base.token_budget),
        reserved_tokens: doc
            .reserved_tokens
            .map(|v| v.max(0) as usize)
            .unwrap_or(base.reserved_tokens),
        budget_priority: doc.budget_priority.unwrap_or(base.budget_priority),
        trim_direction: doc
            .trim_direction
            .as_deref()
            .map(parse_trim_direction)
            .unwrap_or(base.trim_direction),
        maximum_trim_type: doc
            .maximum_trim_type
            .as_deref()
            .map(parse_max_trim_type)
            .unwrap_or(base.maximum_trim_type),
        insertion_position: doc.insertion_position.unwrap_or(base.insertion_position),
        force: doc.forced.unwrap_or(base.force),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_fields_ignored() {
        let doc: ScenarioDoc = serde_json::from_str(
            r#"{"scenarioVersion": 1, "prompt": "Hi.", "someFutureField": {"a": 1}}"#,
        )
        .unwrap();
        assert_eq!(doc.scenario_version, Some(1));
        assert_eq!(doc.prompt.as_deref(), Some("Hi."));
    }

    #[test]
    fn test_coerce_config_overrides() {
        let doc: ContextConfigDoc = serde_json::from_str(
            r#"{"budgetPriority": -400, "trimDirection": "trimTop", "maximumTrimType": "token", "reservedTokens": 100}"#,
        )
        .unwrap();
        let realized = coerce_config(Some(&doc), ContextConfig::default());
        assert_eq!(realized.budget_priority, -400);
        assert_eq!(realized.trim_direction, TrimDirection::Top);
        assert_eq!(realized.maximum_trim_type, MaxTrimType::Token);
        assert_eq!(realized.reserved_tokens, 100);
        // Untouched fields keep base defaults.
        assert_eq!(realized.suffix, "\n");
        assert_eq!(realized.token_budget, 2048);
    }

    #[test]
    fn test_coerce_config_absent_uses_base() {
        let realized = coerce_config(None, ContextConfig::memory());
        assert_eq!(realized.budget_priority, 800);
        assert!(realized.force);
    }

    #[test]
    fn test_unrecognized_trim_direction_means_none() {
        let doc: ContextConfigDoc =
            serde_json::from_str(r#"{"trimDirection": "doNotTrim"}"#).unwrap();
        let realized = coerce_config(Some(&doc), ContextConfig::default());
        assert_eq!(realized.trim_direction, TrimDirection::None);
    }
}
