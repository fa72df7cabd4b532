//! Assemble command implementation.
//!
//! Loads a scenario, assembles the generation input for its prompt (or a
//! story file), prints the result, and optionally writes the context
//! report as JSON.

use clap::Parser;

/// Assemble command arguments.
#[derive(Parser)]
pub struct AssembleCommand {
    /// Directory holding vocab.json and merges.txt
    #[arg(short, long)]
    pub tokenizer: String,

    /// Path to the scenario JSON file
    #[arg(short, long)]
    pub scenario: String,

    /// Story text file; the scenario prompt is used when absent
    #[arg(long)]
    pub story: Option<String>,

    /// Token budget; the scenario's effective budget for a 2048-token
    /// window is used when absent
    #[arg(short, long)]
    pub budget: Option<i64>,

    /// Write the context report JSON to this path
    #[arg(short, long)]
    pub report: Option<String>,
}

use anyhow::Result as AnyhowResult;
use std::path::Path;
use taleweave_context::report;
use taleweave_scenario::Scenario;
use taleweave_tokenizer::Encoder;

const CONTEXT_WINDOW: i64 = 2048;

pub fn run(cmd: AssembleCommand) -> AnyhowResult<()> {
    let encoder = Encoder::from_dir(Path::new(&cmd.tokenizer))?;
    let scenario = Scenario::from_file(Path::new(&cmd.scenario))?;

    let story = match &cmd.story {
        Some(path) => std::fs::read_to_string(path)?,
        None => scenario.prompt.clone(),
    };
    let budget = cmd
        .budget
        .unwrap_or_else(|| scenario.effective_budget(CONTEXT_WINDOW));

    let (text, context_report) = scenario.generate_context(&story, budget, &encoder)?;

    println!("{}", text);
    if let Some(path) = &cmd.report {
        std::fs::write(path, report::to_json(&context_report)?)?;
        eprintln!(
            "Wrote report with {} entries to {}",
            context_report.len(),
            path
        );
    }

    Ok(())
}
