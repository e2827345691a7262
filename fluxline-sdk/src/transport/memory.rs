//! In-memory transport for tests and demos.

use fluxline_types::Precision;

use crate::TransportError;

use super::Transport;

/// Captures payloads instead of sending them anywhere.
///
/// Useful as a writer test double and for inspecting exactly what would
/// go over the wire.
///
/// # Example
///
/// ```rust
/// use fluxline_sdk::{MemoryTransport, Transport};
/// use fluxline_types::{Batch, Field, Record};
///
/// let mut transport = MemoryTransport::new();
/// let mut batch = Batch::new();
/// batch.push(Record::new("m").with_field(Field::new("v", 1i64)?));
///
/// let payload = transport.serialize(&batch)?;
/// transport.send(&payload)?;
///
/// assert_eq!(transport.payloads()[0], b"m v=1i");
/// # Ok::<(), fluxline_sdk::SdkError>(())
/// ```
#[derive(Debug, Default)]
pub struct MemoryTransport {
    precision: Precision,
    payloads: Vec<Vec<u8>>,
}

impl MemoryTransport {
    /// Create a transport capturing at the default precision.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a transport serializing at an explicit precision.
    pub fn with_precision(precision: Precision) -> Self {
        Self {
            precision,
            payloads: Vec::new(),
        }
    }

    /// Every payload sent so far, oldest first.
    pub fn payloads(&self) -> &[Vec<u8>] {
        &self.payloads
    }

    /// The most recent payload, decoded as UTF-8.
    pub fn last_payload(&self) -> Option<String> {
        self.payloads
            .last()
            .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
    }
}

impl Transport for MemoryTransport {
    fn precision(&self) -> Precision {
        self.precision
    }

    fn send(&mut self, payload: &[u8]) -> Result<Option<Vec<u8>>, TransportError> {
        self.payloads.push(payload.to_vec());
        Ok(None)
    }
}
