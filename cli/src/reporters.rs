//! Test-run reporters.
//!
//! A run emits through three channels: a colored console stream for the
//! operator, a JSON array file for downstream analysis, and a plain-text
//! transcript. The JSON and text reporters buffer nothing: every
//! iteration is flushed as it completes so an interrupted run keeps its
//! partial output.

use anyhow::Result as AnyhowResult;
use colored::Colorize;
use serde::Serialize;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use taleweave_scenario::{GenerateParams, Scenario};

/// Encoded request/response forms of one iteration.
#[derive(Debug, Clone, Default, Serialize)]
pub struct EncodedIterationResult {
    pub prompt: String,
    pub responses: Vec<String>,
}

/// One iteration's inputs and outputs.
#[derive(Debug, Clone, Serialize)]
pub struct IterationResult {
    #[serde(rename = "settings")]
    pub parameters: GenerateParams,
    pub prompt: String,
    pub result: String,
    pub responses: Vec<String>,
    pub encoded: EncodedIterationResult,
}

/// Colored progress output for the operator.
pub struct ConsoleReporter {
    iterations: usize,
}

impl ConsoleReporter {
    pub fn new(parameters: &GenerateParams, scenario: &Scenario, iterations: usize) -> Self {
        println!("{}", "Parameters:".white().on_blue());
        match serde_json::to_string_pretty(parameters) {
            Ok(rendered) => println!("{}", rendered),
            Err(_) => println!("{:?}", parameters),
        }
        if !scenario.placeholder_map.is_empty() {
            println!("{}", "Placeholders:".white().on_blue());
            for placeholder in scenario.placeholder_map.sorted() {
                println!("{:>25}: \"{}\"", placeholder.variable, placeholder.value);
            }
        }
        Self { iterations }
    }

    pub fn report_iteration(&self, iteration: usize, prompt: &str) {
        let marker = "\\n".white().on_blue().to_string() + "\n";
        println!(
            "{} {} / {}",
            "Iteration:".white().on_blue(),
            iteration + 1,
            self.iterations
        );
        println!(
            "{}{}",
            "<=".white().on_blue(),
            prompt.replace('\n', &marker)
        );
    }

    pub fn report_generation(&self, response: &str) {
        let marker = "\\n".white().on_green().to_string() + "\n";
        println!(
            "{}{}",
            "=>".white().on_green(),
            response.replace('\n', &marker)
        );
    }

    pub fn close(&self) {
        println!("{}", "== Test Instance Complete ==".white().on_blue());
    }
}

/// Serializes iteration results into a JSON array file.
pub struct JsonReporter {
    file: File,
    iteration: usize,
}

impl JsonReporter {
    pub fn create(path: &Path) -> AnyhowResult<Self> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        let mut file = File::create(path)?;
        file.write_all(b"[")?;
        Ok(Self { file, iteration: 0 })
    }

    pub fn serialize_iteration(&mut self, result: &IterationResult) -> AnyhowResult<()> {
        if self.iteration != 0 {
            self.file.write_all(b",\n")?;
        }
        self.iteration += 1;
        let serialized = serde_json::to_string_pretty(result)?;
        self.file.write_all(serialized.as_bytes())?;
        self.file.flush()?;
        Ok(())
    }

    pub fn close(&mut self) -> AnyhowResult<()> {
        self.file.write_all(b"]")?;
        Ok(())
    }
}

/// Plain-text transcript of a run.
pub struct TextReporter {
    file: File,
}

impl TextReporter {
    pub fn create(
        path: &Path,
        parameters: &GenerateParams,
        scenario: &Scenario,
    ) -> AnyhowResult<Self> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        let mut file = File::create(path)?;

        writeln!(file, "=== Parameters ====================================")?;
        writeln!(file, "{}", serde_json::to_string_pretty(parameters)?)?;
        writeln!(file, "=== Placeholders ==================================")?;
        for placeholder in scenario.placeholder_map.sorted() {
            writeln!(file, "{}:\"{}\"", placeholder.variable, placeholder.value)?;
        }
        writeln!(file, "=== Prompt ========================================")?;
        write!(file, "{}", scenario.prompt)?;
        let memory = &scenario.context[0].text;
        if !memory.is_empty() {
            writeln!(file, "\n=== Memory ========================================")?;
            write!(file, "{}", memory)?;
        }
        let authors_note = &scenario.context[1].text;
        if !authors_note.is_empty() {
            writeln!(file, "\n=== Author's Note =================================")?;
            write!(file, "{}", authors_note)?;
        }
        Ok(Self { file })
    }

    pub fn report_iteration(&mut self, iteration: usize) -> AnyhowResult<()> {
        writeln!(
            self.file,
            "\n\n=== Iteration {:<5} ==============================",
            iteration
        )?;
        self.file.flush()?;
        Ok(())
    }

    pub fn report_generation(&mut self, response: &str) -> AnyhowResult<()> {
        write!(self.file, "{}", response)?;
        self.file.flush()?;
        Ok(())
    }
}
