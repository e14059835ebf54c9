//! Converts comma separated values to tab separated values.

use std::process::ExitCode;

use clap::Parser;
use datatools::{
    cli::{self, ReaderArgs},
    item::delimited::Encoding,
};

/// Reads CSV from standard input and writes tab separated values to
/// standard output.
///
/// Records that cannot be decoded are reported on standard error and
/// skipped; the exit status is 1 when any record failed.
///
/// # Examples
///
/// ```bash
/// csv2tab < people.csv > people.tab
/// csv2tab --fields-per-record -1 -i ragged.csv
/// ```
#[derive(Parser)]
#[command(name = "csv2tab", version, about = "Convert CSV to tab separated values")]
struct Cli {
    #[command(flatten)]
    args: ReaderArgs,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    cli::init_logging();

    match cli::run("csv2tab", &cli.args, b',', Encoding::tsv()) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
