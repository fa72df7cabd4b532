//! Permutation dimensions for parameter sweeps.
//!
//! A permutation spec lists candidate values per parameter; `expand`
//! multiplies a base parameter set into the cartesian product. The
//! dimensions are an explicit catalogue: each knows how to read its
//! value list and write one value onto a `GenerateParams`, so adding a
//! dimension is one entry here, with no introspection involved.

use crate::params::GenerateParams;
use serde::Deserialize;

/// Candidate values per permutable parameter. Empty lists leave the base
/// value untouched; a single value overrides it; multiple values fan out.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PermutationSpec {
    pub model: Vec<String>,
    pub prefix: Vec<String>,
    pub temperature: Vec<f64>,
    pub max_length: Vec<u64>,
    pub min_length: Vec<u64>,
    pub top_k: Vec<u64>,
    pub top_p: Vec<f64>,
    pub tail_free_sampling: Vec<f64>,
    pub repetition_penalty: Vec<f64>,
    pub repetition_penalty_range: Vec<u64>,
    pub repetition_penalty_slope: Vec<f64>,
}

/// One permutable field: its arity within a spec and a writer for a
/// single candidate value.
struct Dimension {
    len: fn(&PermutationSpec) -> usize,
    apply: fn(&mut GenerateParams, &PermutationSpec, usize),
}

fn dimensions() -> Vec<Dimension> {
    vec![
        Dimension {
            len: |s| s.model.len(),
            apply: |p, s, i| p.model = s.model[i].clone(),
        },
        Dimension {
            len: |s| s.prefix.len(),
            apply: |p, s, i| p.prefix = s.prefix[i].clone(),
        },
        Dimension {
            len: |s| s.temperature.len(),
            apply: |p, s, i| p.temperature = Some(s.temperature[i]),
        },
        Dimension {
            len: |s| s.max_length.len(),
            apply: |p, s, i| p.max_length = Some(s.max_length[i]),
        },
        Dimension {
            len: |s| s.min_length.len(),
            apply: |p, s, i| p.min_length = Some(s.min_length[i]),
        },
        Dimension {
            len: |s| s.top_k.len(),
            apply: |p, s, i| p.top_k = Some(s.top_k[i]),
        },
        Dimension {
            len: |s| s.top_p.len(),
            apply: |p, s, i| p.top_p = Some(s.top_p[i]),
        },
        Dimension {
            len: |s| s.tail_free_sampling.len(),
            apply: |p, s, i| p.tail_free_sampling = Some(s.tail_free_sampling[i]),
        },
        Dimension {
            len: |s| s.repetition_penalty.len(),
            apply: |p, s, i| p.repetition_penalty = Some(s.repetition_penalty[i]),
        },
        Dimension {
            len: |s| s.repetition_penalty_range.len(),
            apply: |p, s, i| p.repetition_penalty_range = Some(s.repetition_penalty_range[i]),
        },
        Dimension {
            len: |s| s.repetition_penalty_slope.len(),
            apply: |p, s, i| p.repetition_penalty_slope = Some(s.repetition_penalty_slope[i]),
        },
    ]
}

impl PermutationSpec {
    /// Expand a base parameter set into the cartesian product of every
    /// populated dimension.
    pub fn expand(&self, base: &GenerateParams) -> Vec<GenerateParams> {
        let mut permutations = vec![base.clone()];
        for dimension in dimensions() {
            let arity = (dimension.len)(self);
            if arity == 0 {
                continue;
            }
            let mut next = Vec::with_capacity(permutations.len() * arity);
            for current in &permutations {
                for value_idx in 0..arity {
                    let mut params = current.clone();
                    (dimension.apply)(&mut params, self, value_idx);
                    next.push(params);
                }
            }
            permutations = next;
        }
        permutations
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_spec_yields_base() {
        let spec = PermutationSpec::default();
        let expanded = spec.expand(&GenerateParams::defaults());
        assert_eq!(expanded.len(), 1);
        assert_eq!(expanded[0].model, "6B-v4");
    }

    #[test]
    fn test_cartesian_product() {
        let spec = PermutationSpec {
            temperature: vec![0.5, 0.72, 1.0],
            top_p: vec![0.7, 0.9],
            ..PermutationSpec::default()
        };
        let expanded = spec.expand(&GenerateParams::defaults());
        assert_eq!(expanded.len(), 6);
        // Every combination appears exactly once.
        let mut seen: Vec<(u64, u64)> = expanded
            .iter()
            .map(|p| {
                (
                    (p.temperature.unwrap() * 100.0) as u64,
                    (p.top_p.unwrap() * 100.0) as u64,
                )
            })
            .collect();
        seen.sort_unstable();
        seen.dedup();
        assert_eq!(seen.len(), 6);
    }

    #[test]
    fn test_single_value_overrides() {
        let spec = PermutationSpec {
            model: vec!["2.7B".to_string()],
            ..PermutationSpec::default()
        };
        let expanded = spec.expand(&GenerateParams::defaults());
        assert_eq!(expanded.len(), 1);
        assert_eq!(expanded[0].model, "2.7B");
    }

    #[test]
    fn test_deserialize_spec() {
        let spec: PermutationSpec = serde_json::from_str(
            r#"{"temperature": [0.6, 0.8], "repetition_penalty": [2.0]}"#,
        )
        .unwrap();
        let expanded = spec.expand(&GenerateParams::defaults());
        assert_eq!(expanded.len(), 2);
        assert!(expanded.iter().all(|p| p.repetition_penalty == Some(2.0)));
    }
}
