//! Decode command implementation.

use clap::Parser;

/// Decode command arguments.
#[derive(Parser)]
pub struct DecodeCommand {
    /// Directory holding vocab.json and merges.txt
    #[arg(short, long)]
    pub tokenizer: String,

    /// Space-separated token IDs ("-" reads stdin)
    #[arg(short, long, conflicts_with = "binary")]
    pub input: Option<String>,

    /// Read little-endian binary tokens from this file
    #[arg(short, long)]
    pub binary: Option<String>,
}

use anyhow::{bail, Result as AnyhowResult};
use std::path::Path;
use taleweave_tokenizer::{tokens_from_bin, Encoder, Token, TokenSequence};

pub fn run(cmd: DecodeCommand) -> AnyhowResult<()> {
    let encoder = Encoder::from_dir(Path::new(&cmd.tokenizer))?;

    let tokens: TokenSequence = match (&cmd.input, &cmd.binary) {
        (_, Some(path)) => tokens_from_bin(&std::fs::read(path)?),
        (Some(input), None) => {
            let raw = if input == "-" {
                use std::io::Read;
                let mut buffer = String::new();
                std::io::stdin().read_to_string(&mut buffer)?;
                buffer
            } else {
                input.clone()
            };
            raw.split_whitespace()
                .map(|id| id.parse::<Token>())
                .collect::<Result<_, _>>()?
        }
        (None, None) => bail!("either --input or --binary is required"),
    };

    println!("{}", encoder.decode(&tokens));
    Ok(())
}
