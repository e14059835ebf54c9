//! Writes a `CITATION.cff` file from a `codemeta.json` file.

use std::{path::PathBuf, process::ExitCode};

use anyhow::Context;
use clap::Parser;
use datatools::{cli, codemeta::convert_file};

/// Generates a Citation File Format document from CodeMeta metadata.
///
/// # Examples
///
/// ```bash
/// codemeta2cff                                # codemeta.json -> CITATION.cff
/// codemeta2cff ../codemeta.json ../CITATION.cff
/// ```
#[derive(Parser)]
#[command(name = "codemeta2cff", version, about = "Convert codemeta.json to CITATION.cff")]
struct Cli {
    /// CodeMeta file to read
    #[arg(default_value = "codemeta.json")]
    codemeta: PathBuf,

    /// Citation file to write
    #[arg(default_value = "CITATION.cff")]
    citation: PathBuf,

    /// Display the license and exit
    #[arg(long)]
    license: bool,
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    if cli.license {
        println!("{}", cli::license_text("codemeta2cff"));
        return Ok(());
    }
    convert_file(&cli.codemeta, &cli.citation).with_context(|| {
        format!(
            "unable to convert {} to {}",
            cli.codemeta.display(),
            cli.citation.display()
        )
    })
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    cli::init_logging();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
