//! Converts tab separated values to comma separated values.

use std::process::ExitCode;

use clap::Parser;
use datatools::{
    cli::{self, ReaderArgs},
    item::delimited::Encoding,
};

/// Reads tab separated values from standard input and writes CSV to
/// standard output, quoting fields only where needed.
#[derive(Parser)]
#[command(name = "tab2csv", version, about = "Convert tab separated values to CSV")]
struct Cli {
    #[command(flatten)]
    args: ReaderArgs,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    cli::init_logging();

    match cli::run("tab2csv", &cli.args, b'\t', Encoding::csv()) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
