//! Run command implementation.
//!
//! A content test points at a scenario, fixes iteration and generation
//! counts, and optionally fans the base parameters out across
//! permutation dimensions. Each resulting test instance runs its
//! iterations against the generation service and reports through the
//! console, JSON, and text channels.

use clap::Parser;

/// Run command arguments.
#[derive(Parser)]
pub struct RunCommand {
    /// Directory holding vocab.json and merges.txt
    #[arg(short, long)]
    pub tokenizer: String,

    /// Path to the content-test JSON file
    #[arg(short = 'c', long)]
    pub test: String,

    /// Run permutations on a worker pool (file reporters only)
    #[arg(long)]
    pub parallel: bool,
}

use crate::reporters::{ConsoleReporter, EncodedIterationResult, IterationResult, JsonReporter, TextReporter};
use anyhow::{Context as AnyhowContext, Result as AnyhowResult};
use rayon::prelude::*;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use taleweave_client::{AccessKeys, GeneratorClient};
use taleweave_scenario::{GenerateParams, PermutationSpec, Scenario};
use taleweave_tokenizer::Encoder;

const CONTEXT_WINDOW: i64 = 2048;
const GENERATION_THROTTLE: Duration = Duration::from_millis(1100);

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct ContentTestDoc {
    scenario_filename: String,
    output_prefix: String,
    iterations: usize,
    generations: usize,
    parameters: Option<GenerateParams>,
    permutations: PermutationSpec,
}

pub fn run(cmd: RunCommand) -> AnyhowResult<()> {
    let encoder = Encoder::from_dir(Path::new(&cmd.tokenizer))?;
    let test_path = PathBuf::from(&cmd.test);
    let working_dir = test_path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));

    let raw = std::fs::read_to_string(&test_path)
        .with_context(|| format!("reading content test {}", test_path.display()))?;
    let doc: ContentTestDoc = serde_json::from_str(&raw)?;
    if doc.scenario_filename.is_empty() {
        anyhow::bail!("content test must name a scenarioFilename");
    }

    let scenario = Scenario::from_file(&working_dir.join(&doc.scenario_filename))?;

    let mut base = doc
        .parameters
        .clone()
        .unwrap_or_else(|| scenario.settings.parameters.clone());
    base.coerce_defaults();
    let permutations = doc.permutations.expand(&base);
    println!(
        "== {} test instances generated from {} ==",
        permutations.len(),
        test_path.display()
    );

    let keys = AccessKeys::from_env()?;
    let client = GeneratorClient::new(keys)?;

    if cmd.parallel {
        permutations
            .par_iter()
            .enumerate()
            .try_for_each(|(instance, params)| {
                perform_test(
                    &scenario, params, &encoder, &client, &doc, &working_dir, instance, false,
                )
            })
    } else {
        permutations
            .iter()
            .enumerate()
            .try_for_each(|(instance, params)| {
                println!(
                    "== Performing test {} / {} ==",
                    instance + 1,
                    permutations.len()
                );
                perform_test(
                    &scenario, params, &encoder, &client, &doc, &working_dir, instance, true,
                )
            })
    }
}

#[allow(clippy::too_many_arguments)]
fn perform_test(
    scenario: &Scenario,
    params: &GenerateParams,
    encoder: &Encoder,
    client: &GeneratorClient,
    doc: &ContentTestDoc,
    working_dir: &Path,
    instance: usize,
    console: bool,
) -> AnyhowResult<()> {
    // Each instance sees the scenario with its own parameter set so the
    // effective budget tracks the permuted max_length and prefix.
    let mut scenario = scenario.clone();
    scenario.settings.parameters = params.clone();
    let budget = scenario.effective_budget(CONTEXT_WINDOW);

    let output_path = output_path(working_dir, &doc.output_prefix, params, instance);
    let console_reporter =
        console.then(|| ConsoleReporter::new(params, &scenario, doc.iterations));
    let mut json_reporter = JsonReporter::create(&output_path.with_extension("json"))?;
    let mut text_reporter =
        TextReporter::create(&output_path.with_extension("txt"), params, &scenario)?;

    for iteration in 0..doc.iterations {
        let (context, _report) = scenario.generate_context(&scenario.prompt, budget, encoder)?;
        if let Some(reporter) = &console_reporter {
            reporter.report_iteration(iteration, &context);
        }
        text_reporter.report_iteration(iteration)?;

        let mut working = context.clone();
        let mut result = IterationResult {
            parameters: params.clone(),
            prompt: context,
            result: String::new(),
            responses: Vec::new(),
            encoded: EncodedIterationResult::default(),
        };

        for generation in 0..doc.generations {
            let outcome = client.generate(encoder, &working, params.clone())?;
            if generation == 0 {
                result.encoded.prompt = outcome.encoded_request.clone();
            }

            let mut response = outcome.response_text.clone();
            if scenario.settings.trim_responses {
                let trimmed = encoder.trim_incomplete_sentence(&encoder.encode(&response))?;
                response = encoder.decode(&trimmed);
            }

            if let Some(reporter) = &console_reporter {
                reporter.report_generation(&response);
            }
            text_reporter.report_generation(&response)?;

            result.encoded.responses.push(outcome.encoded_response);
            result.responses.push(response.clone());
            working.push_str(&response);
            std::thread::sleep(GENERATION_THROTTLE);
        }

        result.result = result.responses.concat();
        json_reporter.serialize_iteration(&result)?;
    }

    json_reporter.close()?;
    if let Some(reporter) = &console_reporter {
        reporter.close();
    }
    Ok(())
}

fn output_path(
    working_dir: &Path,
    prefix: &str,
    params: &GenerateParams,
    instance: usize,
) -> PathBuf {
    let stamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    let prefix = if prefix.is_empty() { "run" } else { prefix };
    working_dir.join(format!(
        "{}-{}-{}-{}-{}",
        prefix, params.model, params.prefix, stamp, instance
    ))
}
