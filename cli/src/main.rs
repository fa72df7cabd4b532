//! Taleweave CLI - command-line interface for the research harness.
//!
//! This is the main entry point for the `taleweave` command-line tool.

mod commands;
mod reporters;

use clap::{Parser, Subcommand};
use commands::{AssembleCommand, DecodeCommand, EncodeCommand, RunCommand};

#[derive(Parser)]
#[command(name = "taleweave")]
#[command(about = "Research harness for a remote text-generation service", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Encode text to token IDs
    Encode(EncodeCommand),
    /// Decode token IDs back to text
    Decode(DecodeCommand),
    /// Assemble a scenario into a generation input and report
    Assemble(AssembleCommand),
    /// Run a content test against the generation service
    Run(RunCommand),
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Encode(cmd) => commands::encode::run(cmd)?,
        Commands::Decode(cmd) => commands::decode::run(cmd)?,
        Commands::Assemble(cmd) => commands::assemble::run(cmd)?,
        Commands::Run(cmd) => commands::run::run(cmd)?,
    }

    Ok(())
}
