use crate::error::TranscodeError;

/// Result of a single `read` call.
///
/// - `Ok(Some(item))`: an item was read
/// - `Ok(None)`: the source is exhausted
/// - `Err(error)`: the item could not be read
pub type ItemReaderResult<R> = Result<Option<R>, TranscodeError>;

/// Result of a `write`, `flush`, `open` or `close` call.
pub type ItemWriterResult = Result<(), TranscodeError>;

/// A forward-only source of items.
///
/// Readers take `&self` and keep their cursor behind interior mutability so
/// that a step can hold plain shared references to them.
pub trait ItemReader<R> {
    /// Reads the next item.
    fn read(&self) -> ItemReaderResult<R>;

    /// Hands a consumed item back so its allocations can be reused.
    ///
    /// This is a hint. Readers that do not pool allocations drop the item.
    fn recycle(&self, _item: R) {}
}

/// A sink for items.
pub trait ItemWriter<W> {
    /// Writes one item.
    fn write(&self, item: &W) -> ItemWriterResult;

    /// Flushes buffered output to the underlying sink.
    fn flush(&self) -> ItemWriterResult;

    fn open(&self) -> ItemWriterResult {
        Ok(())
    }

    fn close(&self) -> ItemWriterResult {
        self.flush()
    }
}
