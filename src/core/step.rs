use std::{
    cell::RefCell,
    io::Write,
    time::{Duration, Instant},
};

use log::{debug, error, info, warn};
use uuid::Uuid;

use crate::error::TranscodeError;

use super::item::{ItemReader, ItemWriter};

/// Outcome of a step execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepStatus {
    /// Every item was read and written.
    Success,
    /// The reader was drained but some items were skipped on error.
    Failed,
    /// The step stopped before the end of the input.
    Aborted,
}

/// Timings and counters of one step run.
#[derive(Debug)]
pub struct StepExecution {
    /// Unique identifier for this run
    pub id: Uuid,
    pub name: String,
    pub status: StepStatus,
    pub start: Instant,
    pub end: Instant,
    pub duration: Duration,
    /// Number of items successfully read
    pub read_count: usize,
    /// Number of items successfully written
    pub write_count: usize,
    /// Number of items that could not be read
    pub read_error_count: usize,
    /// Number of writer failures
    pub write_error_count: usize,
}

impl StepExecution {
    pub fn is_success(&self) -> bool {
        self.status == StepStatus::Success
    }

    /// Process exit status: `0` when no error of any kind occurred.
    pub fn exit_code(&self) -> u8 {
        if self.is_success() { 0 } else { 1 }
    }
}

/// Pulls items from a reader and pushes them to a writer, one at a time.
///
/// Per-item read errors that leave the reader usable are reported and the
/// item is skipped; the step carries on with the next one. Terminal read
/// errors, writer errors and, in strict mode, any read error end the step.
///
/// # Examples
///
/// ```
/// use datatools::core::step::{StepBuilder, StepStatus};
/// use datatools::item::delimited::{DelimitedItemReaderBuilder, DelimitedItemWriterBuilder};
///
/// let reader = DelimitedItemReaderBuilder::new()
///     .from_reader("a,b\nc,d,e\nf,g\n".as_bytes())
///     .unwrap();
/// let writer = DelimitedItemWriterBuilder::new()
///     .delimiter(b'\t')
///     .from_writer(Vec::new())
///     .unwrap();
///
/// let execution = StepBuilder::new("csv2tab")
///     .reader(&reader)
///     .writer(&writer)
///     .build()
///     .execute();
///
/// assert_eq!(execution.status, StepStatus::Failed);
/// assert_eq!(execution.write_count, 2);
/// assert_eq!(execution.read_error_count, 1);
/// assert_eq!(writer.into_inner().unwrap(), b"a\tb\nf\tg\n");
/// ```
pub struct Step<'a, T> {
    id: Uuid,
    name: String,
    reader: &'a dyn ItemReader<T>,
    writer: &'a dyn ItemWriter<T>,
    strict: bool,
    error_sink: Option<RefCell<Box<dyn Write + 'a>>>,
}

impl<T> Step<'_, T> {
    pub fn get_name(&self) -> &str {
        &self.name
    }

    pub fn execute(&self) -> StepExecution {
        let start = Instant::now();
        info!("Start of step: {}, id: {}", self.name, self.id);

        let mut read_count = 0;
        let mut write_count = 0;
        let mut read_error_count = 0;
        let mut write_error_count = 0;

        let mut status = match self.writer.open() {
            Ok(()) => loop {
                match self.reader.read() {
                    Ok(Some(item)) => {
                        read_count += 1;
                        if let Err(err) = self.writer.write(&item) {
                            write_error_count += 1;
                            self.report(&err);
                            break StepStatus::Aborted;
                        }
                        write_count += 1;
                        self.reader.recycle(item);
                    }
                    Ok(None) => {
                        debug!("Reader exhausted");
                        break if read_error_count == 0 {
                            StepStatus::Success
                        } else {
                            StepStatus::Failed
                        };
                    }
                    Err(err) => {
                        read_error_count += 1;
                        self.report(&err);
                        if self.strict || !err.is_recoverable() {
                            break StepStatus::Aborted;
                        }
                    }
                }
            },
            Err(err) => {
                write_error_count += 1;
                self.report(&err);
                StepStatus::Aborted
            }
        };

        if let Err(err) = self.writer.close() {
            write_error_count += 1;
            self.report(&err);
            status = StepStatus::Aborted;
        }

        info!(
            "End of step: {}, id: {}, status: {:?}, read: {}, written: {}, read errors: {}, write errors: {}",
            self.name, self.id, status, read_count, write_count, read_error_count, write_error_count
        );

        StepExecution {
            id: self.id,
            name: self.name.clone(),
            status,
            start,
            end: Instant::now(),
            duration: start.elapsed(),
            read_count,
            write_count,
            read_error_count,
            write_error_count,
        }
    }

    fn report(&self, err: &TranscodeError) {
        error!("{}: {}", self.name, err);
        if let Some(sink) = &self.error_sink {
            let mut sink = sink.borrow_mut();
            if let Err(io_err) = writeln!(sink, "{err}").and_then(|()| sink.flush()) {
                warn!("Unable to report error: {io_err}");
            }
        }
    }
}

/// Builder for a [`Step`].
pub struct StepBuilder<'a, T> {
    name: String,
    reader: Option<&'a dyn ItemReader<T>>,
    writer: Option<&'a dyn ItemWriter<T>>,
    strict: bool,
    error_sink: Option<Box<dyn Write + 'a>>,
}

impl<'a, T> StepBuilder<'a, T> {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            reader: None,
            writer: None,
            strict: false,
            error_sink: None,
        }
    }

    pub fn reader(mut self, reader: &'a impl ItemReader<T>) -> Self {
        self.reader = Some(reader);
        self
    }

    pub fn writer(mut self, writer: &'a impl ItemWriter<T>) -> Self {
        self.writer = Some(writer);
        self
    }

    /// Stop at the first read error instead of skipping the item.
    pub fn strict(mut self, yes: bool) -> Self {
        self.strict = yes;
        self
    }

    /// Every error is also written, one line each, to `sink`.
    pub fn report_errors_to(mut self, sink: impl Write + 'a) -> Self {
        self.error_sink = Some(Box::new(sink));
        self
    }

    /// # Panics
    ///
    /// Panics when the reader or the writer has not been set.
    pub fn build(self) -> Step<'a, T> {
        Step {
            id: Uuid::new_v4(),
            name: self.name,
            reader: self.reader.expect("a step needs a reader"),
            writer: self.writer.expect("a step needs a writer"),
            strict: self.strict,
            error_sink: self.error_sink.map(RefCell::new),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};

    use crate::{
        core::item::{ItemReader, ItemReaderResult, ItemWriter, ItemWriterResult},
        error::TranscodeError,
    };

    use super::{StepBuilder, StepStatus};

    /// Replays a scripted sequence of read results.
    struct ScriptedReader {
        script: RefCell<Vec<ItemReaderResult<u32>>>,
        recycled: Cell<usize>,
    }

    impl ScriptedReader {
        fn new(mut script: Vec<ItemReaderResult<u32>>) -> Self {
            script.reverse();
            Self {
                script: RefCell::new(script),
                recycled: Cell::new(0),
            }
        }
    }

    impl ItemReader<u32> for ScriptedReader {
        fn read(&self) -> ItemReaderResult<u32> {
            self.script.borrow_mut().pop().unwrap_or(Ok(None))
        }

        fn recycle(&self, _item: u32) {
            self.recycled.set(self.recycled.get() + 1);
        }
    }

    #[derive(Default)]
    struct VecWriter {
        items: RefCell<Vec<u32>>,
        fail_on: Option<u32>,
        closed: Cell<bool>,
    }

    impl ItemWriter<u32> for VecWriter {
        fn write(&self, item: &u32) -> ItemWriterResult {
            if self.fail_on == Some(*item) {
                return Err(TranscodeError::ItemWriter("disk full".to_string()));
            }
            self.items.borrow_mut().push(*item);
            Ok(())
        }

        fn flush(&self) -> ItemWriterResult {
            Ok(())
        }

        fn close(&self) -> ItemWriterResult {
            self.closed.set(true);
            Ok(())
        }
    }

    fn mismatch() -> TranscodeError {
        TranscodeError::FieldCountMismatch {
            line: 2,
            expected: 1,
            found: 2,
        }
    }

    #[test]
    fn clean_run_is_a_success() {
        let reader = ScriptedReader::new(vec![Ok(Some(1)), Ok(Some(2))]);
        let writer = VecWriter::default();

        let execution = StepBuilder::new("clean")
            .reader(&reader)
            .writer(&writer)
            .build()
            .execute();

        assert_eq!(execution.status, StepStatus::Success);
        assert_eq!(execution.exit_code(), 0);
        assert_eq!(execution.read_count, 2);
        assert_eq!(execution.write_count, 2);
        assert_eq!(*writer.items.borrow(), vec![1, 2]);
        assert_eq!(reader.recycled.get(), 2);
        assert!(writer.closed.get());
    }

    #[test]
    fn recoverable_errors_are_skipped_and_reported() {
        let reader = ScriptedReader::new(vec![Ok(Some(1)), Err(mismatch()), Ok(Some(3))]);
        let writer = VecWriter::default();
        let mut report = Vec::new();

        let execution = StepBuilder::new("skip")
            .reader(&reader)
            .writer(&writer)
            .report_errors_to(&mut report)
            .build()
            .execute();

        assert_eq!(execution.status, StepStatus::Failed);
        assert_eq!(execution.exit_code(), 1);
        assert_eq!(execution.read_error_count, 1);
        assert_eq!(*writer.items.borrow(), vec![1, 3]);
        assert_eq!(
            String::from_utf8(report).unwrap(),
            "record on line 2: wrong number of fields (expected 1, found 2)\n"
        );
    }

    #[test]
    fn strict_mode_stops_at_first_error() {
        let reader = ScriptedReader::new(vec![Ok(Some(1)), Err(mismatch()), Ok(Some(3))]);
        let writer = VecWriter::default();

        let execution = StepBuilder::new("strict")
            .reader(&reader)
            .writer(&writer)
            .strict(true)
            .build()
            .execute();

        assert_eq!(execution.status, StepStatus::Aborted);
        assert_eq!(*writer.items.borrow(), vec![1]);
        assert!(writer.closed.get());
    }

    #[test]
    fn terminal_read_error_stops_the_step() {
        let reader = ScriptedReader::new(vec![
            Ok(Some(1)),
            Err(TranscodeError::UnexpectedEndOfInput { line: 2 }),
            Ok(Some(3)),
        ]);
        let writer = VecWriter::default();

        let execution = StepBuilder::new("terminal")
            .reader(&reader)
            .writer(&writer)
            .build()
            .execute();

        assert_eq!(execution.status, StepStatus::Aborted);
        assert_eq!(execution.read_count, 1);
        assert_eq!(*writer.items.borrow(), vec![1]);
    }

    #[test]
    fn write_error_stops_the_step() {
        let reader = ScriptedReader::new(vec![Ok(Some(1)), Ok(Some(2)), Ok(Some(3))]);
        let writer = VecWriter {
            fail_on: Some(2),
            ..VecWriter::default()
        };

        let execution = StepBuilder::new("write")
            .reader(&reader)
            .writer(&writer)
            .build()
            .execute();

        assert_eq!(execution.status, StepStatus::Aborted);
        assert_eq!(execution.read_count, 2);
        assert_eq!(execution.write_count, 1);
        assert_eq!(execution.write_error_count, 1);
    }
}
