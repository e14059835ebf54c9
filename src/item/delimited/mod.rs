//! Delimited text (CSV, TSV) support, written from first principles.
//!
//! The module is split along the transcoding pipeline:
//!
//! 1. [`decode`] turns a byte stream into a lazy sequence of [`Record`]s with
//!    a small state machine (field start, unquoted field, quoted field,
//!    quote inside quoted field, end of record).
//! 2. [`encode`] serializes a record for a target [`Encoding`]. It never
//!    fails.
//! 3. [`DelimitedItemReader`] and [`DelimitedItemWriter`] adapt both ends to
//!    the `ItemReader` / `ItemWriter` traits so a step can drive them.
//!
//! # Converting CSV to TSV
//!
//! ```
//! use datatools::config::TranscoderConfig;
//! use datatools::item::delimited::{decode, encode, Encoding};
//!
//! let input = "name,email,age\n\"Doe, Jane\",\"jane.doe@example.org\",42\n";
//!
//! let mut output = Vec::new();
//! for record in decode(input.as_bytes(), TranscoderConfig::csv()).unwrap() {
//!     output.extend(encode(&record.unwrap(), &Encoding::tsv()));
//! }
//!
//! assert_eq!(
//!     String::from_utf8(output).unwrap(),
//!     "name\temail\tage\nDoe, Jane\tjane.doe@example.org\t42\n"
//! );
//! ```
mod decoder;
mod encoder;
mod reader;
mod record;
mod writer;

pub use decoder::{Decoder, decode};
pub use encoder::{Encoding, QuoteStyle, encode, encode_into};
pub use reader::{DelimitedItemReader, DelimitedItemReaderBuilder};
pub use record::Record;
pub use writer::{DelimitedItemWriter, DelimitedItemWriterBuilder};
