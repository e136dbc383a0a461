//! Shell completions generator

use anyhow::{Context, Result};
use clap::{Args, CommandFactory};
use clap_complete::{generate, Shell};
use std::io::{self, Write};
use std::path::PathBuf;

use crate::args::Args as CliArgs;

/// Completions command arguments
#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,

    /// Write to a file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

/// Execute completions command
pub fn execute(args: CompletionsArgs) -> Result<()> {
    let mut cmd = CliArgs::command();
    let bin = cmd.get_name().to_string();

    match args.output {
        Some(path) => {
            let mut file = std::fs::File::create(&path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            generate(args.shell, &mut cmd, bin, &mut file);
            file.flush()?;
        }
        None => generate(args.shell, &mut cmd, bin, &mut io::stdout()),
    }

    Ok(())
}
