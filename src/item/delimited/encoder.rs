use crate::{config::is_valid_delimiter, error::TranscodeError};

use super::record::Record;

const QUOTE: u8 = b'"';
const DEFAULT_COMMENT: u8 = b'#';

/// When fields are wrapped in quotes on output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QuoteStyle {
    /// Only fields containing the delimiter, a quote or a line terminator.
    #[default]
    Necessary,
    /// Every field.
    Always,
}

/// Target serialization: delimiter plus quoting rule.
///
/// Embedded quotes are always escaped by doubling. A first field starting
/// with the comment byte (`#` unless changed) is quoted so that the record
/// is not read back as a comment line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Encoding {
    delimiter: u8,
    quote_style: QuoteStyle,
    comment: Option<u8>,
}

impl Default for Encoding {
    fn default() -> Self {
        Self::csv()
    }
}

impl Encoding {
    pub fn new(delimiter: u8, quote_style: QuoteStyle) -> Result<Self, TranscodeError> {
        if !is_valid_delimiter(delimiter) {
            return Err(TranscodeError::InvalidConfig(format!(
                "invalid output delimiter {:?}",
                delimiter as char
            )));
        }
        Ok(Self {
            delimiter,
            quote_style,
            comment: Some(DEFAULT_COMMENT),
        })
    }

    pub fn csv() -> Self {
        Self {
            delimiter: b',',
            quote_style: QuoteStyle::Necessary,
            comment: Some(DEFAULT_COMMENT),
        }
    }

    pub fn tsv() -> Self {
        Self {
            delimiter: b'\t',
            quote_style: QuoteStyle::Necessary,
            comment: Some(DEFAULT_COMMENT),
        }
    }

    /// Comment byte of the reader the output is meant for. `None` leaves
    /// leading comment bytes unquoted.
    pub fn with_comment(mut self, comment: Option<u8>) -> Self {
        self.comment = comment;
        self
    }

    pub fn delimiter(&self) -> u8 {
        self.delimiter
    }

    pub fn quote_style(&self) -> QuoteStyle {
        self.quote_style
    }

    pub fn comment(&self) -> Option<u8> {
        self.comment
    }

    fn needs_quotes(&self, field: &str) -> bool {
        match self.quote_style {
            QuoteStyle::Always => true,
            QuoteStyle::Necessary => field
                .bytes()
                .any(|b| b == self.delimiter || b == QUOTE || b == b'\n' || b == b'\r'),
        }
    }
}

/// Serializes one record, line terminator included.
///
/// Every record with at least one field decodes back to itself. A record
/// with no fields is written as an empty line, which decoders skip, so it
/// does not survive a round trip.
///
/// # Examples
///
/// ```
/// use datatools::item::delimited::{encode, Encoding, Record};
///
/// let record = Record::from(vec!["Doe, Jane", "jane.doe@example.org", "42"]);
///
/// assert_eq!(encode(&record, &Encoding::csv()), b"\"Doe, Jane\",jane.doe@example.org,42\n");
/// assert_eq!(encode(&record, &Encoding::tsv()), b"Doe, Jane\tjane.doe@example.org\t42\n");
/// ```
pub fn encode(record: &Record, encoding: &Encoding) -> Vec<u8> {
    let mut out = Vec::with_capacity(record.iter().map(|f| f.len() + 1).sum::<usize>() + 1);
    encode_into(record, encoding, &mut out);
    out
}

/// Appends the serialized record to `out`.
pub fn encode_into(record: &Record, encoding: &Encoding, out: &mut Vec<u8>) {
    // A lone empty field would read back as a skipped blank line.
    if record.len() == 1 && record[0].is_empty() {
        out.extend_from_slice(b"\"\"\n");
        return;
    }

    for (index, field) in record.iter().enumerate() {
        let leading_comment = index == 0
            && encoding
                .comment
                .is_some_and(|comment| field.as_bytes().first() == Some(&comment));
        if index > 0 {
            out.push(encoding.delimiter);
        }
        if leading_comment || encoding.needs_quotes(field) {
            out.push(QUOTE);
            for &b in field.as_bytes() {
                if b == QUOTE {
                    out.push(QUOTE);
                }
                out.push(b);
            }
            out.push(QUOTE);
        } else {
            out.extend_from_slice(field.as_bytes());
        }
    }
    out.push(b'\n');
}
