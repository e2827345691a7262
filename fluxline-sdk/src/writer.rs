//! Buffering writer with at-most-once delivery.
//!
//! Records accumulate in a [`Batch`] until the size threshold is hit or
//! the caller flushes. A flush serializes through the transport and
//! hands the bytes over; any failure goes to the error handler instead
//! of propagating, and the batch is cleared whether or not delivery
//! succeeded. A dropped batch is reported, never retried.

use fluxline_types::{Batch, Record};

use crate::transport::Transport;
use crate::SdkError;

/// Lines of payload shown in the error-handler context.
const PREVIEW_LINES: usize = 5;

/// Callback receiving flush failures together with a diagnostic context.
pub type ErrorHandler = Box<dyn FnMut(&SdkError, &str)>;

/// Buffers records and flushes them through a [`Transport`].
///
/// # Example
///
/// ```rust
/// use fluxline_sdk::{BatchWriter, MemoryTransport};
/// use fluxline_types::{Field, Record};
///
/// let mut writer = BatchWriter::new(MemoryTransport::new()).with_batch_size(2);
/// writer.write(Record::new("a").with_field(Field::new("v", 1i64)?));
/// writer.write(Record::new("b").with_field(Field::new("v", 2i64)?));
///
/// assert_eq!(writer.transport().last_payload().unwrap(), "a v=1i\nb v=2i");
/// # Ok::<(), fluxline_sdk::SdkError>(())
/// ```
pub struct BatchWriter<T: Transport> {
    batch: Batch,
    batch_size: usize,
    transport: T,
    on_error: ErrorHandler,
}

impl<T: Transport> BatchWriter<T> {
    /// Create an unbounded writer: records buffer until an explicit
    /// flush. Failures are logged.
    pub fn new(transport: T) -> Self {
        Self {
            batch: Batch::new(),
            batch_size: 0,
            transport,
            on_error: Box::new(|error, context| {
                tracing::error!(%error, context, "metrics flush failed");
            }),
        }
    }

    /// Set the flush threshold. Zero disables size-based flushing.
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Replace the error handler.
    ///
    /// The handler receives every flush failure with a context string
    /// describing the dropped batch. It must not panic; the writer has
    /// no second channel for reporting.
    pub fn with_error_handler(mut self, handler: impl FnMut(&SdkError, &str) + 'static) -> Self {
        self.on_error = Box::new(handler);
        self
    }

    /// Buffer one record, flushing if the threshold is reached.
    pub fn write(&mut self, record: Record) {
        self.batch.push(record);
        if self.batch_size > 0 && self.batch.len() >= self.batch_size {
            self.flush();
        }
    }

    /// Buffer records one by one; the threshold applies mid-iteration.
    pub fn write_all(&mut self, records: impl IntoIterator<Item = Record>) {
        for record in records {
            self.write(record);
        }
    }

    /// Records currently buffered.
    pub fn pending(&self) -> usize {
        self.batch.len()
    }

    /// The underlying transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Serialize and deliver the buffered batch.
    ///
    /// An empty batch is a no-op. Serialization and delivery failures go
    /// to the error handler; either way the batch is empty afterwards.
    pub fn flush(&mut self) {
        if self.batch.is_empty() {
            return;
        }

        match self.transport.serialize(&self.batch) {
            Ok(payload) => {
                let context = flush_context(self.batch.len(), &payload);
                if let Err(err) = self.transport.send(&payload) {
                    tracing::warn!(%err, records = self.batch.len(), "delivery failed, dropping batch");
                    let err = SdkError::from(err);
                    (self.on_error)(&err, &context);
                } else {
                    tracing::debug!(records = self.batch.len(), "flushed batch");
                }
            }
            Err(err) => {
                tracing::warn!(%err, records = self.batch.len(), "serialization failed, dropping batch");
                let context = format!("{} records, payload not serialized", self.batch.len());
                (self.on_error)(&err, &context);
            }
        }

        self.batch.clear();
    }
}

impl<T: Transport> Drop for BatchWriter<T> {
    fn drop(&mut self) {
        self.flush();
        self.batch.clear();
    }
}

/// Describe a payload for the error handler: record count, payload size,
/// and the first few lines.
fn flush_context(records: usize, payload: &[u8]) -> String {
    let text = String::from_utf8_lossy(payload);
    let preview: Vec<&str> = text.lines().take(PREVIEW_LINES).collect();
    let truncated = text.lines().nth(PREVIEW_LINES).is_some();

    let mut context = format!("{records} records, {}", format_size(payload.len()));
    if !preview.is_empty() {
        context.push('\n');
        context.push_str(&preview.join("\n"));
        if truncated {
            context.push_str("\n...");
        }
    }
    context
}

/// Human-readable byte size.
fn format_size(bytes: usize) -> String {
    const KIB: f64 = 1024.0;
    const MIB: f64 = 1024.0 * 1024.0;
    let bytes_f = bytes as f64;
    if bytes_f >= MIB {
        format!("{:.1} MiB", bytes_f / MIB)
    } else if bytes_f >= KIB {
        format!("{:.1} KiB", bytes_f / KIB)
    } else {
        format!("{bytes} B")
    }
}
