use std::fmt;

use crate::error::TranscodeError;

/// Field-count policy applied to every decoded record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FieldsPerRecord {
    /// The first decoded record fixes the expected count.
    #[default]
    Infer,
    /// No check is performed.
    Unchecked,
    /// Every record, the first included, must have exactly this many fields.
    Exact(usize),
}

impl TryFrom<i64> for FieldsPerRecord {
    type Error = TranscodeError;

    /// Maps the command line convention (`0` infer, `-1` off, `n > 0` exact).
    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(FieldsPerRecord::Infer),
            -1 => Ok(FieldsPerRecord::Unchecked),
            n if n > 0 => Ok(FieldsPerRecord::Exact(n as usize)),
            n => Err(TranscodeError::InvalidConfig(format!(
                "fields per record must be -1, 0 or positive, got {n}"
            ))),
        }
    }
}

impl fmt::Display for FieldsPerRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldsPerRecord::Infer => write!(f, "0"),
            FieldsPerRecord::Unchecked => write!(f, "-1"),
            FieldsPerRecord::Exact(n) => write!(f, "{n}"),
        }
    }
}

/// Immutable decoding configuration.
///
/// Built once per run (usually from command line flags) and handed by value
/// to the decoder. Nothing in the crate reads options from global state.
///
/// # Examples
///
/// ```
/// use datatools::config::{FieldsPerRecord, TranscoderConfig};
///
/// let config = TranscoderConfig::tsv();
/// assert_eq!(config.delimiter, b'\t');
/// assert_eq!(config.comment, Some(b'#'));
/// assert_eq!(config.fields_per_record, FieldsPerRecord::Infer);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscoderConfig {
    /// Source field delimiter.
    pub delimiter: u8,
    /// Lines starting with this byte are skipped.
    pub comment: Option<u8>,
    pub fields_per_record: FieldsPerRecord,
    /// Tolerate quotes that break the doubling rule.
    pub lazy_quotes: bool,
    /// Drop whitespace at the start of unquoted fields.
    pub trim_leading_space: bool,
    /// Reuse the allocations of recycled records. Never changes output.
    pub reuse_record: bool,
}

impl Default for TranscoderConfig {
    fn default() -> Self {
        Self {
            delimiter: b',',
            comment: Some(b'#'),
            fields_per_record: FieldsPerRecord::Infer,
            lazy_quotes: false,
            trim_leading_space: false,
            reuse_record: false,
        }
    }
}

impl TranscoderConfig {
    /// Comma separated input.
    pub fn csv() -> Self {
        Self::default()
    }

    /// Tab separated input.
    pub fn tsv() -> Self {
        Self {
            delimiter: b'\t',
            ..Self::default()
        }
    }

    /// Checks that the delimiter and comment bytes can be told apart from
    /// quotes, line terminators and each other.
    pub fn validate(&self) -> Result<(), TranscodeError> {
        if !is_valid_delimiter(self.delimiter) {
            return Err(TranscodeError::InvalidConfig(format!(
                "invalid field delimiter {:?}",
                self.delimiter as char
            )));
        }
        if let Some(comment) = self.comment {
            if comment == self.delimiter || !is_valid_delimiter(comment) {
                return Err(TranscodeError::InvalidConfig(format!(
                    "invalid comment character {:?}",
                    comment as char
                )));
            }
        }
        Ok(())
    }
}

pub(crate) fn is_valid_delimiter(byte: u8) -> bool {
    byte.is_ascii() && byte != b'"' && byte != b'\r' && byte != b'\n'
}
