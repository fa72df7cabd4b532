//! Encode command implementation.

use clap::Parser;

/// Encode command arguments.
#[derive(Parser)]
pub struct EncodeCommand {
    /// Directory holding vocab.json and merges.txt
    #[arg(short, long)]
    pub tokenizer: String,

    /// Text to encode ("-" reads stdin)
    #[arg(short, long)]
    pub input: String,

    /// Write little-endian binary tokens to this file instead of printing
    #[arg(short, long)]
    pub output: Option<String>,
}

use anyhow::Result as AnyhowResult;
use std::path::Path;
use taleweave_tokenizer::{tokens_to_bin, Encoder};

pub fn run(cmd: EncodeCommand) -> AnyhowResult<()> {
    let encoder = Encoder::from_dir(Path::new(&cmd.tokenizer))?;

    let input_text = if cmd.input == "-" {
        use std::io::Read;
        let mut buffer = String::new();
        std::io::stdin().read_to_string(&mut buffer)?;
        buffer
    } else {
        cmd.input
    };

    let tokens = encoder.encode(&input_text);

    match &cmd.output {
        Some(path) => {
            std::fs::write(path, tokens_to_bin(&tokens))?;
            println!("Encoded {} tokens to {}", tokens.len(), path);
        }
        None => {
            let ids: Vec<String> = tokens.iter().map(|id| id.to_string()).collect();
            println!("{}", ids.join(" "));
        }
    }

    Ok(())
}
