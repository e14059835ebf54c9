use std::{
    cell::RefCell,
    fs::File,
    io::{BufReader, Read},
    path::Path,
};

use crate::{
    config::{FieldsPerRecord, TranscoderConfig},
    core::item::{ItemReader, ItemReaderResult},
    error::TranscodeError,
};

use super::{decoder::Decoder, record::Record};

/// A delimited item reader that implements the `ItemReader` trait.
///
/// Wraps a [`Decoder`] so a step can pull records through a shared
/// reference.
///
/// # Examples
///
/// ```
/// use datatools::core::item::ItemReader;
/// use datatools::item::delimited::DelimitedItemReaderBuilder;
///
/// let reader = DelimitedItemReaderBuilder::new()
///     .delimiter(b'\t')
///     .from_reader("name\tage\nAlice\t30\n".as_bytes())
///     .unwrap();
///
/// let header = reader.read().unwrap().unwrap();
/// assert_eq!(header, vec!["name", "age"]);
/// let row = reader.read().unwrap().unwrap();
/// assert_eq!(row, vec!["Alice", "30"]);
/// assert!(reader.read().unwrap().is_none());
/// ```
pub struct DelimitedItemReader<R> {
    decoder: RefCell<Decoder<BufReader<R>>>,
}

impl<R: Read> DelimitedItemReader<R> {
    pub fn config(&self) -> TranscoderConfig {
        self.decoder.borrow().config().clone()
    }
}

impl<R: Read> ItemReader<Record> for DelimitedItemReader<R> {
    fn read(&self) -> ItemReaderResult<Record> {
        self.decoder.borrow_mut().decode_record().transpose()
    }

    fn recycle(&self, item: Record) {
        self.decoder.borrow_mut().recycle(item);
    }
}

/// A builder for configuring delimited item reading.
///
/// Defaults to comma separated input with `#` comments and the field count
/// inferred from the first record.
#[derive(Default)]
pub struct DelimitedItemReaderBuilder {
    config: TranscoderConfig,
}

impl DelimitedItemReaderBuilder {
    pub fn new() -> Self {
        Self {
            config: TranscoderConfig::default(),
        }
    }

    /// Replaces the whole configuration.
    pub fn config(mut self, config: TranscoderConfig) -> Self {
        self.config = config;
        self
    }

    pub fn delimiter(mut self, delimiter: u8) -> Self {
        self.config.delimiter = delimiter;
        self
    }

    /// Sets the comment prefix. `None` disables comment skipping.
    pub fn comment(mut self, comment: Option<u8>) -> Self {
        self.config.comment = comment;
        self
    }

    pub fn fields_per_record(mut self, fields_per_record: FieldsPerRecord) -> Self {
        self.config.fields_per_record = fields_per_record;
        self
    }

    pub fn lazy_quotes(mut self, yes: bool) -> Self {
        self.config.lazy_quotes = yes;
        self
    }

    pub fn trim_leading_space(mut self, yes: bool) -> Self {
        self.config.trim_leading_space = yes;
        self
    }

    pub fn reuse_record(mut self, yes: bool) -> Self {
        self.config.reuse_record = yes;
        self
    }

    /// Creates a `DelimitedItemReader` from any `Read` source.
    ///
    /// Fails with `InvalidConfig` when the delimiter or comment byte is
    /// unusable.
    pub fn from_reader<R: Read>(self, rdr: R) -> Result<DelimitedItemReader<R>, TranscodeError> {
        let decoder = Decoder::new(BufReader::new(rdr), self.config)?;
        Ok(DelimitedItemReader {
            decoder: RefCell::new(decoder),
        })
    }

    /// Creates a `DelimitedItemReader` reading the file at `path`.
    pub fn from_path<P: AsRef<Path>>(
        self,
        path: P,
    ) -> Result<DelimitedItemReader<File>, TranscodeError> {
        let file = File::open(path)?;
        self.from_reader(file)
    }
}
