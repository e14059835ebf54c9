use std::io::{self, BufRead, BufReader, Read};

use log::debug;

use crate::{
    config::{FieldsPerRecord, TranscoderConfig},
    error::TranscodeError,
};

use super::record::Record;

const QUOTE: u8 = b'"';

/// Position of the decoder inside the record in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    FieldStart,
    InUnquotedField,
    InQuotedField,
    QuoteInQuotedField,
    AfterRecord,
}

/// Lazy, forward-only sequence of records decoded from a byte stream.
///
/// Input is consumed one physical line at a time; a quoted field that
/// contains line terminators pulls further lines until its closing quote.
/// Memory use is bounded by the largest record.
///
/// After a per-record error (`FieldCountMismatch`, `MalformedQuoting`,
/// `InvalidUtf8`) the rest of the offending line is dropped and decoding
/// resumes on the next line. After a terminal error (`Io`, `UnexpectedEndOfInput`) the sequence
/// ends.
///
/// # Examples
///
/// ```
/// use datatools::config::TranscoderConfig;
/// use datatools::item::delimited::decode;
///
/// let input = "name,email\n\"Doe, Jane\",jane.doe@example.org\n";
/// let records = decode(input.as_bytes(), TranscoderConfig::csv())
///     .unwrap()
///     .collect::<Result<Vec<_>, _>>()
///     .unwrap();
///
/// assert_eq!(records.len(), 2);
/// assert_eq!(records[1], vec!["Doe, Jane", "jane.doe@example.org"]);
/// ```
pub struct Decoder<R> {
    input: R,
    config: TranscoderConfig,
    /// Current physical line, `\r\n` normalised to `\n`.
    line: Vec<u8>,
    line_number: u64,
    /// Unescaped bytes of the record in flight.
    buffer: Vec<u8>,
    /// End offset in `buffer` of every completed field.
    ends: Vec<usize>,
    /// Input bytes of the open quoted field, opening quote included.
    raw: Vec<u8>,
    expected_fields: Option<usize>,
    spare: Option<Record>,
    finished: bool,
}

/// Decodes delimited records from `input` according to `config`.
pub fn decode<R: Read>(
    input: R,
    config: TranscoderConfig,
) -> Result<Decoder<BufReader<R>>, TranscodeError> {
    Decoder::new(BufReader::new(input), config)
}

impl<R: BufRead> Decoder<R> {
    pub fn new(input: R, config: TranscoderConfig) -> Result<Self, TranscodeError> {
        config.validate()?;
        let expected_fields = match config.fields_per_record {
            FieldsPerRecord::Exact(n) => Some(n),
            FieldsPerRecord::Infer | FieldsPerRecord::Unchecked => None,
        };
        Ok(Self {
            input,
            config,
            line: Vec::new(),
            line_number: 0,
            buffer: Vec::new(),
            ends: Vec::new(),
            raw: Vec::new(),
            expected_fields,
            spare: None,
            finished: false,
        })
    }

    pub fn config(&self) -> &TranscoderConfig {
        &self.config
    }

    /// Number of physical lines consumed so far.
    pub fn line_number(&self) -> u64 {
        self.line_number
    }

    /// Gives a consumed record back to the decoder. Its allocations are
    /// reused for the next record when `reuse_record` is set.
    pub fn recycle(&mut self, record: Record) {
        if self.config.reuse_record {
            self.spare = Some(record);
        }
    }

    /// Decodes the next record.
    ///
    /// Returns `None` once the input is exhausted or a terminal error has
    /// been reported.
    pub fn decode_record(&mut self) -> Option<Result<Record, TranscodeError>> {
        if self.finished {
            return None;
        }

        match self.decode_next() {
            Ok(Some(record)) => Some(Ok(record)),
            Ok(None) => {
                debug!("End of input after {} lines", self.line_number);
                self.finished = true;
                None
            }
            Err(error) => {
                if !error.is_recoverable() {
                    self.finished = true;
                }
                Some(Err(error))
            }
        }
    }

    fn decode_next(&mut self) -> Result<Option<Record>, TranscodeError> {
        loop {
            if !self.read_line()? {
                return Ok(None);
            }
            if self.is_comment() || self.line.is_empty() || self.line == b"\n" {
                continue;
            }
            break;
        }

        let record_line = self.line_number;
        let delimiter = self.config.delimiter;
        let lazy = self.config.lazy_quotes;
        self.buffer.clear();
        self.ends.clear();

        let mut state = State::FieldStart;
        let mut pos = 0;
        let mut field_start = 0;
        let mut spanned = false;

        while state != State::AfterRecord {
            let byte = self.line.get(pos).copied();
            state = match state {
                State::FieldStart => match byte {
                    Some(b)
                        if self.config.trim_leading_space
                            && b != delimiter
                            && b != b'\n'
                            && b.is_ascii_whitespace() =>
                    {
                        pos += 1;
                        State::FieldStart
                    }
                    Some(QUOTE) => {
                        field_start = self.buffer.len();
                        spanned = false;
                        self.raw.clear();
                        self.raw.push(QUOTE);
                        pos += 1;
                        State::InQuotedField
                    }
                    Some(b) if b == delimiter => {
                        self.ends.push(self.buffer.len());
                        pos += 1;
                        State::FieldStart
                    }
                    Some(b'\n') | None => {
                        self.ends.push(self.buffer.len());
                        State::AfterRecord
                    }
                    Some(_) => State::InUnquotedField,
                },
                State::InUnquotedField => match byte {
                    Some(b) if b == delimiter => {
                        self.ends.push(self.buffer.len());
                        pos += 1;
                        State::FieldStart
                    }
                    Some(b'\n') | None => {
                        self.ends.push(self.buffer.len());
                        State::AfterRecord
                    }
                    Some(QUOTE) if !lazy => {
                        return Err(TranscodeError::MalformedQuoting {
                            line: self.line_number,
                            column: pos + 1,
                        });
                    }
                    Some(b) => {
                        self.buffer.push(b);
                        pos += 1;
                        State::InUnquotedField
                    }
                },
                State::InQuotedField => match byte {
                    Some(QUOTE) => {
                        self.raw.push(QUOTE);
                        pos += 1;
                        State::QuoteInQuotedField
                    }
                    Some(b) => {
                        self.buffer.push(b);
                        self.raw.push(b);
                        pos += 1;
                        State::InQuotedField
                    }
                    None => {
                        // The closing quote is on a later line, if anywhere.
                        let column = self.line.len() + 1;
                        if !self.read_line()? {
                            return self.end_of_input_in_quotes(
                                record_line,
                                field_start,
                                spanned,
                                column,
                            );
                        }
                        spanned = true;
                        pos = 0;
                        State::InQuotedField
                    }
                },
                State::QuoteInQuotedField => match byte {
                    Some(QUOTE) => {
                        self.buffer.push(QUOTE);
                        self.raw.push(QUOTE);
                        pos += 1;
                        State::InQuotedField
                    }
                    Some(b) if b == delimiter => {
                        self.ends.push(self.buffer.len());
                        pos += 1;
                        State::FieldStart
                    }
                    Some(b'\n') | None => {
                        self.ends.push(self.buffer.len());
                        State::AfterRecord
                    }
                    Some(_) if lazy => {
                        self.buffer.push(QUOTE);
                        State::InQuotedField
                    }
                    Some(_) => {
                        return Err(TranscodeError::MalformedQuoting {
                            line: self.line_number,
                            column: pos,
                        });
                    }
                },
                State::AfterRecord => State::AfterRecord,
            };
        }

        self.complete_record(record_line).map(Some)
    }

    /// The input ended while a quoted field was still open.
    fn end_of_input_in_quotes(
        &mut self,
        record_line: u64,
        field_start: usize,
        spanned: bool,
        column: usize,
    ) -> Result<Option<Record>, TranscodeError> {
        if self.config.lazy_quotes {
            // Keep the field exactly as written, minus the record terminator.
            if self.raw.last() == Some(&b'\n') {
                self.raw.pop();
            }
            self.buffer.truncate(field_start);
            self.buffer.extend_from_slice(&self.raw);
            self.ends.push(self.buffer.len());
            return self.complete_record(record_line).map(Some);
        }

        if spanned {
            Err(TranscodeError::UnexpectedEndOfInput { line: record_line })
        } else {
            Err(TranscodeError::MalformedQuoting {
                line: record_line,
                column,
            })
        }
    }

    fn complete_record(&mut self, record_line: u64) -> Result<Record, TranscodeError> {
        let text = std::str::from_utf8(&self.buffer).map_err(|error| {
            TranscodeError::InvalidUtf8 {
                line: record_line,
                offset: error.valid_up_to(),
            }
        })?;

        let found = self.ends.len();
        match (self.config.fields_per_record, self.expected_fields) {
            (FieldsPerRecord::Unchecked, _) => {}
            (_, Some(expected)) if expected != found => {
                return Err(TranscodeError::FieldCountMismatch {
                    line: record_line,
                    expected,
                    found,
                });
            }
            (_, Some(_)) => {}
            (_, None) => {
                debug!("Expecting {found} fields per record");
                self.expected_fields = Some(found);
            }
        }

        let mut record = if self.config.reuse_record {
            self.spare.take().unwrap_or_default()
        } else {
            Record::new()
        };
        record.fill(record_line, text, &self.ends);
        Ok(record)
    }

    fn is_comment(&self) -> bool {
        matches!(
            (self.config.comment, self.line.first()),
            (Some(comment), Some(&first)) if comment == first
        )
    }

    /// Reads the next physical line into `self.line`. Returns `false` at end
    /// of input.
    fn read_line(&mut self) -> io::Result<bool> {
        self.line.clear();
        let read = self.input.read_until(b'\n', &mut self.line)?;
        if read == 0 {
            return Ok(false);
        }
        self.line_number += 1;

        let len = self.line.len();
        if self.line.ends_with(b"\r\n") {
            self.line.truncate(len - 2);
            self.line.push(b'\n');
        } else if self.line.last() == Some(&b'\r') {
            // A lone `\r` right before end of input is dropped.
            self.line.pop();
        }
        Ok(true)
    }
}

impl<R: BufRead> Iterator for Decoder<R> {
    type Item = Result<Record, TranscodeError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.decode_record()
    }
}
