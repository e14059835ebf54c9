use std::io;

use thiserror::Error;

#[derive(Error, Debug)]
/// Transcode error
pub enum TranscodeError {
    #[error("record on line {line}: wrong number of fields (expected {expected}, found {found})")]
    FieldCountMismatch {
        line: u64,
        expected: usize,
        found: usize,
    },

    #[error("parse error on line {line}, column {column}: bare \" in non-quoted field or extraneous \" in field")]
    MalformedQuoting { line: u64, column: usize },

    #[error("record on line {line}: invalid UTF-8 at byte {offset}")]
    InvalidUtf8 { line: u64, offset: usize },

    #[error("record starting on line {line}: unexpected end of input inside quoted field")]
    UnexpectedEndOfInput { line: u64 },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("ItemWriter from: {0}")]
    ItemWriter(String),
}

impl TranscodeError {
    /// Returns `true` when the error only concerns the record in flight and
    /// decoding can resume at the next record boundary.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            TranscodeError::FieldCountMismatch { .. }
                | TranscodeError::MalformedQuoting { .. }
                | TranscodeError::InvalidUtf8 { .. }
        )
    }
}
