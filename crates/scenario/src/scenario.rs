//! Realized scenarios and context generation.
//!
//! A `Scenario` is the fully-coerced form of a scenario document: labels
//! and stable indexes assigned, configs folded over their defaults, key
//! regexes compiled, and the placeholder table wired from every text the
//! document carries. After loading it is treated as read-only; each
//! `generate_context` call produces a fresh report.

use crate::document::{self, ScenarioDoc};
use crate::error::{Result, ScenarioError};
use crate::module::AiModule;
use crate::params::GenerateParams;
use std::path::Path;
use taleweave_context::lorebook::compile_key;
use taleweave_context::{
    assemble, AssemblerOptions, Candidate, ContextConfig, ContextEntries, ContextEntry,
    ContextReport, Lorebook, LorebookCategory, LorebookEntry, LorebookSettings, Placeholders,
};
use taleweave_tokenizer::Encoder;

/// Default search window for lorebook entries that do not set one.
const DEFAULT_SEARCH_RANGE: usize = 1000;

/// Generation-facing scenario settings.
#[derive(Debug, Clone)]
pub struct ScenarioSettings {
    pub parameters: GenerateParams,
    pub trim_responses: bool,
    pub ban_brackets: bool,
    pub ai_module: Option<AiModule>,
}

/// A loaded scenario.
#[derive(Debug, Clone)]
pub struct Scenario {
    pub version: i64,
    pub title: String,
    pub author: String,
    pub description: String,
    pub prompt: String,
    pub tags: Vec<String>,
    /// The two pinned entries, Memory then Author's Note.
    pub context: ContextEntries,
    pub lorebook: Lorebook,
    pub placeholder_map: Placeholders,
    pub story_config: ContextConfig,
    pub settings: ScenarioSettings,
    pub assembler_options: AssemblerOptions,
}

impl Scenario {
    /// Load a scenario from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|err| ScenarioError::Io {
            path: path.to_path_buf(),
            err,
        })?;
        Self::from_json(&raw)
    }

    /// Load a scenario from JSON text.
    pub fn from_json(raw: &str) -> Result<Self> {
        let doc: ScenarioDoc = serde_json::from_str(raw)?;
        Self::from_doc(doc)
    }

    /// Realize a parsed document.
    pub fn from_doc(doc: ScenarioDoc) -> Result<Self> {
        let version = doc
            .scenario_version
            .ok_or_else(|| ScenarioError::InputParse("scenarioVersion is required".into()))?;
        let prompt = doc
            .prompt
            .ok_or_else(|| ScenarioError::InputParse("prompt is required".into()))?;
        if doc.context.len() < 2 {
            return Err(ScenarioError::InputParse(
                "context must hold at least Memory and Author's Note".into(),
            ));
        }

        let memory = ContextEntry::with_index(
            doc.context[0].text.clone(),
            "Memory",
            document::coerce_config(doc.context[0].context_config.as_ref(), ContextConfig::memory()),
            1,
        );
        let authors_note = ContextEntry::with_index(
            doc.context[1].text.clone(),
            "A/N",
            document::coerce_config(
                doc.context[1].context_config.as_ref(),
                ContextConfig::authors_note(),
            ),
            2,
        );
        let context = vec![memory, authors_note];

        let story_config =
            document::coerce_config(doc.story_context_config.as_ref(), ContextConfig::story());

        let lorebook = realize_lorebook(doc.lorebook.unwrap_or_default())?;

        let mut placeholder_map = Placeholders::new();
        for mut placeholder in doc.placeholders {
            if placeholder.value.is_empty() {
                placeholder.value = placeholder.default.clone();
            }
            placeholder_map.put(placeholder);
        }
        placeholder_map.merge(Placeholders::discover(&prompt));
        for pinned in &context {
            placeholder_map.merge(Placeholders::discover(&pinned.text));
        }
        for entry in &lorebook.entries {
            placeholder_map.merge(Placeholders::discover(&entry.text));
        }

        let settings_doc = doc.settings.unwrap_or_default();
        let mut parameters = settings_doc.parameters.unwrap_or_default();
        parameters.coerce_defaults();
        if let Some(model) = settings_doc.model {
            parameters.model = model;
        }

        let ai_module = match settings_doc.ai_module {
            Some(module_doc) if !module_doc.id.is_empty() => Some(AiModule::from_id(
                &module_doc.id,
                module_doc.name.unwrap_or_default(),
                module_doc.description.unwrap_or_default(),
            )?),
            _ => None,
        };
        if let Some(module) = &ai_module {
            parameters.prefix = module.to_prefix();
        } else if let Some(prefix) = settings_doc.prefix {
            parameters.prefix = prefix;
        }

        let ban_brackets = settings_doc
            .ban_brackets
            .or(parameters.ban_brackets)
            .unwrap_or(true);
        parameters.ban_brackets = Some(ban_brackets);

        Ok(Self {
            version,
            title: doc.title.unwrap_or_default(),
            author: doc.author.unwrap_or_default(),
            description: doc.description.unwrap_or_default(),
            prompt,
            tags: doc.tags,
            context,
            lorebook,
            placeholder_map,
            story_config,
            settings: ScenarioSettings {
                parameters,
                trim_responses: settings_doc.trim_responses.unwrap_or(false),
                ban_brackets,
                ai_module,
            },
            assembler_options: AssemblerOptions::default(),
        })
    }

    /// Build a minimal scenario from bare texts, for tests and ad-hoc
    /// runs.
    pub fn from_spec(prompt: &str, memory: &str, authors_note: &str, model: &str) -> Self {
        let mut parameters = GenerateParams::defaults();
        if !model.is_empty() {
            parameters.model = model.to_string();
        }

        let context = vec![
            ContextEntry::with_index(memory, "Memory", ContextConfig::memory(), 1),
            ContextEntry::with_index(authors_note, "A/N", ContextConfig::authors_note(), 2),
        ];

        let mut placeholder_map = Placeholders::discover(prompt);
        placeholder_map.merge(Placeholders::discover(memory));
        placeholder_map.merge(Placeholders::discover(authors_note));

        Self {
            version: 1,
            title: String::new(),
            author: String::new(),
            description: String::new(),
            prompt: prompt.to_string(),
            tags: Vec::new(),
            context,
            lorebook: Lorebook::default(),
            placeholder_map,
            story_config: ContextConfig::story(),
            settings: ScenarioSettings {
                parameters,
                trim_responses: false,
                ban_brackets: true,
                ai_module: None,
            },
            assembler_options: AssemblerOptions::default(),
        }
    }

    /// Override placeholder values before generation.
    pub fn update_placeholders<'a>(
        &mut self,
        overrides: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) {
        for (variable, value) in overrides {
            self.placeholder_map.update_value(variable, value);
        }
    }

    /// The token budget available to assembly for a given context window:
    /// the window minus the response length, minus 20 when an AI module
    /// prefix is active, minus another 20 when responses are trimmed to
    /// complete sentences.
    pub fn effective_budget(&self, context_window: i64) -> i64 {
        let max_length = self.settings.parameters.max_length.unwrap_or(40) as i64;
        let mut budget = context_window - max_length;
        if self.settings.parameters.prefix != "vanilla" {
            budget -= 20;
        }
        if self.settings.trim_responses {
            budget -= 20;
        }
        budget
    }

    /// Assemble the generation input for a story text.
    pub fn generate_context(
        &self,
        story: &str,
        budget: i64,
        encoder: &Encoder,
    ) -> Result<(String, ContextReport)> {
        let mut entries: ContextEntries = Vec::with_capacity(3 + self.lorebook.entries.len());
        entries.push(ContextEntry::with_index(
            self.placeholder_map.substitute(story),
            "Story",
            self.story_config.clone(),
            0,
        ));
        for pinned in &self.context {
            let mut entry = pinned.clone();
            entry.text = self.placeholder_map.substitute(&entry.text);
            entries.push(entry);
        }

        let candidates = [
            Candidate::story(&entries[0].text),
            Candidate::other(&entries[1].text),
            Candidate::other(&entries[2].text),
        ];
        let activated = self.lorebook.resolve_contexts(
            &self.placeholder_map,
            &candidates,
            entries.len() as u64,
        )?;
        entries.extend(activated);

        Ok(assemble(
            &entries,
            budget,
            &self.assembler_options,
            encoder,
        ))
    }
}

fn realize_lorebook(doc: crate::document::LorebookDoc) -> Result<Lorebook> {
    let mut entries = Vec::with_capacity(doc.entries.len());
    for entry_doc in doc.entries {
        let force_activation = entry_doc.force_activation.unwrap_or(false);
        let mut config =
            document::coerce_config(entry_doc.context_config.as_ref(), ContextConfig::default());
        config.force = force_activation;

        let key_regexes = entry_doc
            .keys
            .iter()
            .map(|key| compile_key(key))
            .collect::<taleweave_context::Result<Vec<_>>>()?;

        entries.push(LorebookEntry {
            text: entry_doc.text,
            config,
            display_name: entry_doc.display_name.unwrap_or_default(),
            keys: entry_doc.keys,
            key_regexes,
            search_range: entry_doc
                .search_range
                .map(|v| v.max(0) as usize)
                .unwrap_or(DEFAULT_SEARCH_RANGE),
            enabled: entry_doc.enabled.unwrap_or(true),
            force_activation,
            key_relative: entry_doc.key_relative.unwrap_or(false),
            non_story_activatable: entry_doc.non_story_activatable.unwrap_or(false),
            category_id: entry_doc.category,
        });
    }

    let settings_doc = doc.settings.unwrap_or_default();
    Ok(Lorebook {
        entries,
        categories: doc
            .categories
            .into_iter()
            .map(|category| LorebookCategory {
                id: category.id,
                name: category.name,
                enabled: category.enabled.unwrap_or(true),
            })
            .collect(),
        settings: LorebookSettings {
            order_by_key_locations: settings_doc.order_by_key_locations.unwrap_or(false),
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const WIZARD_SCENARIO: &str = r#"{
        "scenarioVersion": 1,
        "title": "The Tower",
        "prompt": "And so the wizard arrived at the gate.",
        "context": [
            {"text": "The gate is ancient."},
            {"text": "Style: somber."}
        ],
        "lorebook": {
            "lorebookVersion": 1,
            "entries": [{
                "text": "(Wizards are rare.)",
                "displayName": "Wizard Lore",
                "keys": ["wizard"],
                "enabled": true,
                "forceActivation": false,
                "searchRange": 1000
            }]
        },
        "settings": {"parameters": {"max_length": 40}}
    }"#;

    fn encoder() -> Encoder {
        Encoder::with_byte_vocabulary()
    }

    #[test]
    fn test_required_fields() {
        assert!(matches!(
            Scenario::from_json(r#"{"prompt": "Hi."}"#),
            Err(ScenarioError::InputParse(_))
        ));
        assert!(matches!(
            Scenario::from_json(r#"{"scenarioVersion": 1}"#),
            Err(ScenarioError::InputParse(_))
        ));
        assert!(matches!(
            Scenario::from_json(r#"{"scenarioVersion": 1, "prompt": "Hi.", "context": [{"text": "only one"}]}"#),
            Err(ScenarioError::InputParse(_))
        ));
    }

    #[test]
    fn test_pinned_labels_and_defaults() {
        let scenario = Scenario::from_json(WIZARD_SCENARIO).unwrap();
        assert_eq!(scenario.context[0].label, "Memory");
        assert_eq!(scenario.context[0].config.budget_priority, 800);
        assert_eq!(scenario.context[1].label, "A/N");
        assert_eq!(scenario.context[1].config.insertion_position, -4);
        assert_eq!(scenario.story_config.reserved_tokens, 512);
        assert_eq!(scenario.settings.parameters.model, "6B-v4");
    }

    #[test]
    fn test_lorebook_activation_end_to_end() {
        let scenario = Scenario::from_json(WIZARD_SCENARIO).unwrap();
        let enc = encoder();
        let budget = scenario.effective_budget(2048);
        assert_eq!(budget, 2048 - 40);

        let (text, report) = scenario
            .generate_context(&scenario.prompt, budget, &enc)
            .unwrap();
        assert_eq!(report.len(), 4);

        let lore = report.iter().find(|e| e.label == "Wizard Lore").unwrap();
        let spans = &lore.match_indexes[0]["wizard"];
        let [start, end] = spans[0];
        assert_eq!(&scenario.prompt[start..end], " wizard ");
        assert!(text.contains("(Wizards are rare.)"));
    }

    #[test]
    fn test_lorebook_non_activation() {
        let scenario = Scenario::from_json(WIZARD_SCENARIO).unwrap();
        let enc = encoder();
        let (text, report) = scenario
            .generate_context("A quiet morning at the gate.", 2048 - 40, &enc)
            .unwrap();
        assert_eq!(report.len(), 3);
        assert!(!text.contains("Wizards"));
    }

    #[test]
    fn test_placeholder_table_realized() {
        let prompt = "%{\n1Name[Daniel Blackthorn]:Name\n2HairColor[red]:Hair Color\n}\nI am ${1Name}, and my hair is ${2HairColor}.";
        let scenario = Scenario::from_spec(prompt, "", "", "euterpe-v2");
        let enc = encoder();
        let (text, report) = scenario
            .generate_context(&scenario.prompt, 1024, &enc)
            .unwrap();
        assert_eq!(report.len(), 1);
        assert_eq!(text, "I am Daniel Blackthorn, and my hair is red.");
    }

    #[test]
    fn test_placeholder_override() {
        let mut scenario =
            Scenario::from_spec("Hello ${1Name[Daniel]:Your name?}.", "", "", "");
        scenario.update_placeholders([("1Name", "Erin")]);
        let enc = encoder();
        let (text, _) = scenario
            .generate_context(&scenario.prompt, 1024, &enc)
            .unwrap();
        assert_eq!(text, "Hello Erin.");
    }

    #[test]
    fn test_effective_budget_adjustments() {
        let mut scenario = Scenario::from_spec("Hi.", "", "", "");
        assert_eq!(scenario.effective_budget(2048), 2008);

        scenario.settings.parameters.prefix = "6B-v4:aa:bb".to_string();
        assert_eq!(scenario.effective_budget(2048), 1988);

        scenario.settings.trim_responses = true;
        assert_eq!(scenario.effective_budget(2048), 1968);
    }

    #[test]
    fn test_lorebook_force_inherited() {
        let scenario = Scenario::from_json(
            r#"{
                "scenarioVersion": 1,
                "prompt": "P.",
                "context": [{"text": ""}, {"text": ""}],
                "lorebook": {"entries": [{
                    "text": "Pinned lore.",
                    "displayName": "Pinned",
                    "keys": [],
                    "forceActivation": true
                }]}
            }"#,
        )
        .unwrap();
        assert!(scenario.lorebook.entries[0].config.force);

        let enc = encoder();
        let (_, report) = scenario
            .generate_context(&scenario.prompt, 1024, &enc)
            .unwrap();
        assert!(report.iter().any(|e| e.label == "Pinned"));
    }

    #[test]
    fn test_bad_lorebook_key_surfaces() {
        let result = Scenario::from_json(
            r#"{
                "scenarioVersion": 1,
                "prompt": "P.",
                "context": [{"text": ""}, {"text": ""}],
                "lorebook": {"entries": [{"text": "x", "keys": ["(unclosed"]}]}
            }"#,
        );
        assert!(matches!(result, Err(ScenarioError::Context(_))));
    }

    #[test]
    fn test_ai_module_wiring() {
        let scenario = Scenario::from_json(
            r#"{
                "scenarioVersion": 1,
                "prompt": "P.",
                "context": [{"text": ""}, {"text": ""}],
                "settings": {"aiModule": {"id": "6B-v4:abc:def", "name": "Poetry"}}
            }"#,
        )
        .unwrap();
        let module = scenario.settings.ai_module.as_ref().unwrap();
        assert_eq!(module.name, "Poetry");
        assert_eq!(scenario.settings.parameters.prefix, "6B-v4:abc:def");
    }
}
