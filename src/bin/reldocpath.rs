//! Prints the path of one document relative to another.

use std::{
    io::{self, Write},
    process::ExitCode,
};

use anyhow::{Context, bail};
use clap::Parser;
use datatools::{cli, path::relative_doc_path};

/// Computes the link from SOURCE to TARGET, both relative to the same base
/// directory.
///
/// # Examples
///
/// ```bash
/// reldocpath chapter-01/lesson-03.html css/site.css   # ../css/site.css
/// ```
#[derive(Parser)]
#[command(name = "reldocpath", version, about = "Relative path between two documents")]
struct Cli {
    /// Document the link is written in
    source: Option<String>,

    /// Document the link points to
    target: Option<String>,

    /// Display the license and exit
    #[arg(long)]
    license: bool,
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    if cli.license {
        println!("{}", cli::license_text("reldocpath"));
        return Ok(());
    }
    let (Some(source), Some(target)) = (&cli.source, &cli.target) else {
        bail!("expected a SOURCE and a TARGET path");
    };
    let relative = relative_doc_path(source, target)?;
    let mut stdout = io::stdout().lock();
    write!(stdout, "{relative}").context("unable to write to stdout")?;
    stdout.flush()?;
    Ok(())
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
