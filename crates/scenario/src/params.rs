//! Generation parameters and request-time normalization.
//!
//! Parameters carry explicit optional fields so an absent value is
//! distinguishable from zero; `coerce_defaults` folds in the fixed
//! defaults at load time. `normalize` applies the transformations the
//! generator expects and must run exactly once per request.

use serde::{Deserialize, Serialize};
use taleweave_tokenizer::Token;

/// The one model whose repetition penalty is not rescaled.
const REP_PEN_EXEMPT_MODEL: &str = "2.7B";

/// Sampler and penalty settings for a generation request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct GenerateParams {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub label: String,
    pub model: String,
    pub prefix: String,
    pub temperature: Option<f64>,
    pub max_length: Option<u64>,
    pub min_length: Option<u64>,
    pub top_k: Option<u64>,
    pub top_p: Option<f64>,
    pub tail_free_sampling: Option<f64>,
    pub repetition_penalty: Option<f64>,
    pub repetition_penalty_range: Option<u64>,
    pub repetition_penalty_slope: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bad_words_ids: Option<Vec<Vec<Token>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logit_bias: Option<Vec<serde_json::Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rep_whitelist_ids: Option<Vec<Vec<Token>>>,
    pub ban_brackets: Option<bool>,
    pub use_cache: bool,
    pub use_string: bool,
    pub return_full_text: bool,
}

impl GenerateParams {
    /// The fixed defaults applied to fields absent from a scenario.
    pub fn defaults() -> Self {
        Self {
            label: String::new(),
            model: "6B-v4".to_string(),
            prefix: "vanilla".to_string(),
            temperature: Some(0.72),
            max_length: Some(40),
            min_length: Some(1),
            top_k: Some(0),
            top_p: Some(0.725),
            tail_free_sampling: Some(1.0),
            repetition_penalty: Some(3.5),
            repetition_penalty_range: Some(2048),
            repetition_penalty_slope: Some(0.18),
            bad_words_ids: Some(Vec::new()),
            logit_bias: None,
            rep_whitelist_ids: None,
            ban_brackets: Some(true),
            use_cache: false,
            use_string: false,
            return_full_text: false,
        }
    }

    /// Fill absent fields from `other`.
    pub fn coerce_null_values(&mut self, other: &GenerateParams) {
        if self.label.is_empty() {
            self.label = other.label.clone();
        }
        if self.model.is_empty() {
            self.model = other.model.clone();
        }
        if self.prefix.is_empty() {
            self.prefix = other.prefix.clone();
        }
        if self.temperature.is_none() {
            self.temperature = other.temperature;
        }
        if self.max_length.is_none() {
            self.max_length = other.max_length;
        }
        if self.min_length.is_none() {
            self.min_length = other.min_length;
        }
        if self.top_k.is_none() {
            self.top_k = other.top_k;
        }
        if self.top_p.is_none() {
            self.top_p = other.top_p;
        }
        if self.tail_free_sampling.is_none() {
            self.tail_free_sampling = other.tail_free_sampling;
        }
        if self.repetition_penalty.is_none() {
            self.repetition_penalty = other.repetition_penalty;
        }
        if self.repetition_penalty_range.is_none() {
            self.repetition_penalty_range = other.repetition_penalty_range;
        }
        if self.repetition_penalty_slope.is_none() {
            self.repetition_penalty_slope = other.repetition_penalty_slope;
        }
        if self.bad_words_ids.is_none() {
            self.bad_words_ids = other.bad_words_ids.clone();
        }
        if self.ban_brackets.is_none() {
            self.ban_brackets = other.ban_brackets;
        }
    }

    /// Fill absent fields from the fixed defaults.
    pub fn coerce_defaults(&mut self) {
        let defaults = Self::defaults();
        self.coerce_null_values(&defaults);
    }

    /// Normalize for submission. Applied once per request; callers must
    /// not re-apply it to already-normalized parameters.
    ///
    /// - Rescales the repetition penalty for every model except `2.7B`.
    /// - Substitutes 1.0 for absent or zero `top_p` / `tail_free_sampling`.
    /// - Prepends the banned bracket sequences when `ban_brackets` is set.
    /// - Nulls out empty token-sequence lists so they serialize as absent.
    pub fn normalize(&mut self) {
        if self.model != REP_PEN_EXEMPT_MODEL {
            if let Some(penalty) = self.repetition_penalty.as_mut() {
                const OLD_RANGE: f64 = 1.0 - 8.0;
                const NEW_RANGE: f64 = 1.0 - 1.525;
                *penalty = ((*penalty - 1.0) * NEW_RANGE) / OLD_RANGE + 1.0;
            }
        }

        if self.top_p.map_or(true, |v| v == 0.0) {
            self.top_p = Some(1.0);
        }
        if self.tail_free_sampling.map_or(true, |v| v == 0.0) {
            self.tail_free_sampling = Some(1.0);
        }

        if self.ban_brackets.unwrap_or(false) {
            let mut merged = banned_brackets();
            if let Some(existing) = self.bad_words_ids.take() {
                merged.extend(existing);
            }
            self.bad_words_ids = Some(merged);
        }

        if self.bad_words_ids.as_ref().is_some_and(Vec::is_empty) {
            self.bad_words_ids = None;
        }
        if self.logit_bias.as_ref().is_some_and(Vec::is_empty) {
            self.logit_bias = None;
        }
        if self.rep_whitelist_ids.as_ref().is_some_and(Vec::is_empty) {
            self.rep_whitelist_ids = None;
        }
    }
}

/// Token sequences banned from generation when bracket banning is on.
pub fn banned_brackets() -> Vec<Vec<Token>> {
    let singles: &[Token] = &[
        58, 60, 90, 92, 685, 1391, 1782, 2361, 3693, 4083, 4357, 4895, 5512, 5974, 7131, 8183,
        8351, 8762, 8964, 8973, 9063, 11208, 11709, 11907, 11919, 12878, 12962, 13018, 13412,
        14631, 14692, 14980, 15090, 15437, 16151, 16410, 16589, 17241, 17414, 17635, 17816, 17912,
        18083, 18161, 18477, 19629, 19779, 19953, 20520, 20598, 20662, 20740, 21476, 21737, 22133,
        22241, 22345, 22935, 23330, 23785, 23834, 23884, 25295, 25597, 25719, 25787, 25915, 26076,
        26358, 26398, 26894, 26933, 27007, 27422, 28013, 29164, 29225, 29342, 29565, 29795, 30072,
        30109, 30138, 30866, 31161, 31478, 32092, 32239, 32509, 33116, 33250, 33761, 34171, 34758,
        34949, 35944, 36338, 36463, 36563, 36786, 36796, 36937, 37250, 37913, 37981, 38165, 38362,
        38381, 38430, 38892, 39850, 39893, 41832, 41888, 42535, 42669, 42785, 42924, 43839, 44438,
        44587, 44926, 45144, 45297, 46110, 46570, 46581, 46956, 47175, 47182, 47527, 47715, 48600,
        48683, 48688, 48874, 48999, 49074, 49082, 49146, 49946, 10221, 4841, 1427,
    ];
    let mut banned: Vec<Vec<Token>> = singles.iter().map(|&token| vec![token]).collect();
    banned.push(vec![2602, 834]);
    banned.extend([29343, 37405, 35780, 2602, 17202, 8162].map(|token| vec![token]));
    banned
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coerce_defaults_fills_absent() {
        let mut params = GenerateParams {
            temperature: Some(1.1),
            ..GenerateParams::default()
        };
        params.coerce_defaults();
        assert_eq!(params.temperature, Some(1.1));
        assert_eq!(params.model, "6B-v4");
        assert_eq!(params.max_length, Some(40));
        assert_eq!(params.min_length, Some(1));
        assert_eq!(params.top_p, Some(0.725));
        assert_eq!(params.ban_brackets, Some(true));
    }

    #[test]
    fn test_rep_pen_rescaled_once() {
        let mut params = GenerateParams::defaults();
        params.ban_brackets = Some(false);
        params.normalize();
        let expected = ((3.5 - 1.0) * (1.0 - 1.525)) / (1.0 - 8.0) + 1.0;
        let actual = params.repetition_penalty.unwrap();
        assert!((actual - expected).abs() < 1e-12);
    }

    #[test]
    fn test_rep_pen_exempt_model() {
        let mut params = GenerateParams::defaults();
        params.model = "2.7B".to_string();
        params.ban_brackets = Some(false);
        params.normalize();
        assert_eq!(params.repetition_penalty, Some(3.5));
    }

    #[test]
    fn test_zero_samplers_become_one() {
        let mut params = GenerateParams::defaults();
        params.top_p = Some(0.0);
        params.tail_free_sampling = None;
        params.ban_brackets = Some(false);
        params.normalize();
        assert_eq!(params.top_p, Some(1.0));
        assert_eq!(params.tail_free_sampling, Some(1.0));
    }

    #[test]
    fn test_ban_brackets_prepends() {
        let mut params = GenerateParams::defaults();
        params.bad_words_ids = Some(vec![vec![42]]);
        params.normalize();
        let bad_words = params.bad_words_ids.unwrap();
        assert_eq!(bad_words.first(), Some(&vec![58u16]));
        assert_eq!(bad_words.last(), Some(&vec![42u16]));
        assert_eq!(bad_words.len(), banned_brackets().len() + 1);
    }

    #[test]
    fn test_empty_lists_serialize_absent() {
        let mut params = GenerateParams::defaults();
        params.ban_brackets = Some(false);
        params.logit_bias = Some(Vec::new());
        params.rep_whitelist_ids = Some(Vec::new());
        params.normalize();

        let json = serde_json::to_string(&params).unwrap();
        assert!(!json.contains("bad_words_ids"));
        assert!(!json.contains("logit_bias"));
        assert!(!json.contains("rep_whitelist_ids"));
    }

    #[test]
    fn test_banned_brackets_shape() {
        let banned = banned_brackets();
        assert_eq!(banned.len(), 151);
        assert!(banned.iter().any(|seq| seq == &vec![2602, 834]));
    }
}
