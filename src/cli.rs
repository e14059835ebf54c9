//! Flags and run loop shared by `csv2tab` and `tab2csv`.

use std::{
    fs::File,
    io::{self, Read, Write},
    path::PathBuf,
    process::ExitCode,
};

use anyhow::Context;
use clap::Args;
use log::debug;

use crate::{
    config::{FieldsPerRecord, TranscoderConfig},
    core::step::{StepBuilder, StepExecution},
    error::TranscodeError,
    item::delimited::{DelimitedItemReaderBuilder, DelimitedItemWriterBuilder, Encoding},
};

/// Decoder and step options, flattened into each transcoding binary.
#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct ReaderArgs {
    /// Expected number of fields per record: 0 takes it from the first
    /// record, -1 turns the check off
    #[arg(
        long,
        value_name = "N",
        default_value_t = 0,
        allow_hyphen_values = true
    )]
    pub fields_per_record: i64,

    /// Keep quotes that appear in unquoted fields or are not doubled
    #[arg(long = "use-lazy-quotes")]
    pub lazy_quotes: bool,

    /// Drop whitespace at the start of each field
    #[arg(long)]
    pub trim_leading_space: bool,

    /// Reuse record allocations between reads
    #[arg(long)]
    pub reuse_record: bool,

    /// Stop at the first malformed record instead of skipping it
    #[arg(long)]
    pub strict: bool,

    /// Lines starting with this character are skipped
    #[arg(long, value_name = "CHAR", default_value_t = '#')]
    pub comment: char,

    /// Treat no line as a comment
    #[arg(long, conflicts_with = "comment")]
    pub no_comment: bool,

    /// Read from this file instead of standard input
    #[arg(short, long, value_name = "PATH")]
    pub input: Option<PathBuf>,

    /// Write to this file instead of standard output
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Display the license and exit
    #[arg(long)]
    pub license: bool,
}

impl ReaderArgs {
    /// Decoder configuration for input separated by `delimiter`.
    pub fn to_config(&self, delimiter: u8) -> Result<TranscoderConfig, TranscodeError> {
        let comment = if self.no_comment {
            None
        } else {
            let byte = u8::try_from(self.comment)
                .ok()
                .filter(u8::is_ascii)
                .ok_or_else(|| {
                    TranscodeError::InvalidConfig(format!(
                        "comment character must be ASCII, got {:?}",
                        self.comment
                    ))
                })?;
            Some(byte)
        };

        let config = TranscoderConfig {
            delimiter,
            comment,
            fields_per_record: FieldsPerRecord::try_from(self.fields_per_record)?,
            lazy_quotes: self.lazy_quotes,
            trim_leading_space: self.trim_leading_space,
            reuse_record: self.reuse_record,
        };
        config.validate()?;
        Ok(config)
    }
}

/// Decodes `input` with `config`, re-encodes every record with `encoding`
/// into `output` and reports each failed record on `errors`.
pub fn transcode<R: Read, W: Write, E: Write>(
    name: &str,
    config: TranscoderConfig,
    encoding: Encoding,
    strict: bool,
    input: R,
    output: W,
    errors: E,
) -> Result<StepExecution, TranscodeError> {
    let reader = DelimitedItemReaderBuilder::new()
        .config(config)
        .from_reader(input)?;
    let writer = DelimitedItemWriterBuilder::new()
        .encoding(encoding)
        .from_writer(output)?;

    let execution = StepBuilder::new(name)
        .reader(&reader)
        .writer(&writer)
        .strict(strict)
        .report_errors_to(errors)
        .build()
        .execute();

    Ok(execution)
}

/// Runs a transcoding binary against its files or standard streams.
pub fn run(
    name: &str,
    args: &ReaderArgs,
    source_delimiter: u8,
    encoding: Encoding,
) -> anyhow::Result<ExitCode> {
    if args.license {
        println!("{}", license_text(name));
        return Ok(ExitCode::SUCCESS);
    }

    let config = args.to_config(source_delimiter)?;
    debug!("{name} configuration: {config:?}, {encoding:?}");

    let input: Box<dyn Read> = match &args.input {
        Some(path) => Box::new(
            File::open(path).with_context(|| format!("unable to open {}", path.display()))?,
        ),
        None => Box::new(io::stdin().lock()),
    };
    let output: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(
            File::create(path).with_context(|| format!("unable to create {}", path.display()))?,
        ),
        None => Box::new(io::stdout().lock()),
    };

    let execution = transcode(
        name,
        config,
        encoding,
        args.strict,
        input,
        output,
        io::stderr(),
    )?;
    Ok(ExitCode::from(execution.exit_code()))
}

/// Logs go to stderr; `RUST_LOG` overrides the `warn` default.
pub fn init_logging() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .try_init();
}

pub fn license_text(app_name: &str) -> String {
    format!(
        "{app_name} {version}

Licensed under either of

 * Apache License, Version 2.0 (http://www.apache.org/licenses/LICENSE-2.0)
 * MIT license (http://opensource.org/licenses/MIT)

at your option.",
        version = env!("CARGO_PKG_VERSION")
    )
}
