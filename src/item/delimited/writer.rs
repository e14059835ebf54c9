use std::{
    cell::RefCell,
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use crate::{
    core::item::{ItemWriter, ItemWriterResult},
    error::TranscodeError,
};

use super::{
    encoder::{Encoding, QuoteStyle, encode_into},
    record::Record,
};

/// A delimited item writer that implements the `ItemWriter` trait.
///
/// Every record is encoded into a scratch buffer and handed to a
/// `BufWriter` over the sink.
pub struct DelimitedItemWriter<W: Write> {
    wrapper: RefCell<BufWriter<W>>,
    scratch: RefCell<Vec<u8>>,
    encoding: Encoding,
}

impl<W: Write> ItemWriter<Record> for DelimitedItemWriter<W> {
    fn write(&self, item: &Record) -> ItemWriterResult {
        let mut scratch = self.scratch.borrow_mut();
        scratch.clear();
        encode_into(item, &self.encoding, &mut scratch);

        self.wrapper
            .borrow_mut()
            .write_all(&scratch)
            .map_err(|error| TranscodeError::ItemWriter(error.to_string()))
    }

    /// Flush the contents of the internal buffer to the underlying writer.
    ///
    /// Note that this also flushes the underlying writer.
    fn flush(&self) -> ItemWriterResult {
        self.wrapper
            .borrow_mut()
            .flush()
            .map_err(|error| TranscodeError::ItemWriter(error.to_string()))
    }
}

impl<W: Write> DelimitedItemWriter<W> {
    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    /// Flushes and returns the underlying sink.
    pub fn into_inner(self) -> Result<W, TranscodeError> {
        self.wrapper
            .into_inner()
            .into_inner()
            .map_err(|error| TranscodeError::ItemWriter(error.error().to_string()))
    }
}

/// A builder for configuring delimited item writing.
///
/// Defaults to comma separated output, quoting only when necessary.
pub struct DelimitedItemWriterBuilder {
    delimiter: u8,
    quote_style: QuoteStyle,
    comment: Option<u8>,
}

impl Default for DelimitedItemWriterBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl DelimitedItemWriterBuilder {
    pub fn new() -> DelimitedItemWriterBuilder {
        let encoding = Encoding::csv();
        DelimitedItemWriterBuilder {
            delimiter: encoding.delimiter(),
            quote_style: encoding.quote_style(),
            comment: encoding.comment(),
        }
    }

    pub fn delimiter(mut self, delimiter: u8) -> DelimitedItemWriterBuilder {
        self.delimiter = delimiter;
        self
    }

    pub fn quote_style(mut self, quote_style: QuoteStyle) -> DelimitedItemWriterBuilder {
        self.quote_style = quote_style;
        self
    }

    /// Comment byte of the reader that will consume the output.
    pub fn comment(mut self, comment: Option<u8>) -> DelimitedItemWriterBuilder {
        self.comment = comment;
        self
    }

    pub fn encoding(self, encoding: Encoding) -> DelimitedItemWriterBuilder {
        self.delimiter(encoding.delimiter())
            .quote_style(encoding.quote_style())
            .comment(encoding.comment())
    }

    pub fn from_writer<W: Write>(self, wtr: W) -> Result<DelimitedItemWriter<W>, TranscodeError> {
        let encoding = Encoding::new(self.delimiter, self.quote_style)?.with_comment(self.comment);
        Ok(DelimitedItemWriter {
            wrapper: RefCell::new(BufWriter::new(wtr)),
            scratch: RefCell::new(Vec::new()),
            encoding,
        })
    }

    pub fn from_path<P: AsRef<Path>>(
        self,
        path: P,
    ) -> Result<DelimitedItemWriter<File>, TranscodeError> {
        let file = File::create(path)?;
        self.from_writer(file)
    }
}
