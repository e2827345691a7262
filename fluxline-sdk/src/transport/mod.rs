//! Delivery transports.
//!
//! A [`Transport`] owns two concerns: turning a [`Batch`] into its wire
//! bytes and delivering those bytes to the backend. The batching and
//! error-funneling logic lives once in the writer; each transport stays
//! a thin serialization-plus-delivery pair.

use fluxline_types::{Batch, Precision};

use crate::line_protocol::encode_batch;
use crate::{SdkError, TransportError};

mod http;
mod json;
mod memory;
mod udp;

pub use http::HttpTransport;
pub use json::JsonTransport;
pub use memory::MemoryTransport;
pub use udp::UdpTransport;

/// Serialization and delivery for one backend protocol.
pub trait Transport {
    /// Timestamp precision this transport serializes with.
    fn precision(&self) -> Precision;

    /// Serialize a batch into the transport's wire format.
    ///
    /// The default renders line protocol at [`Self::precision`];
    /// transports with a different body format override this.
    fn serialize(&self, batch: &Batch) -> Result<Vec<u8>, SdkError> {
        Ok(encode_batch(batch, self.precision())?.into_bytes())
    }

    /// Deliver a serialized payload, returning the response body when
    /// the protocol has one.
    fn send(&mut self, payload: &[u8]) -> Result<Option<Vec<u8>>, TransportError>;
}
