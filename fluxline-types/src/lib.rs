//! # fluxline-types
//!
//! Record model and metric snapshot types for the fluxline InfluxDB
//! reporter. This crate defines the schema shared between the converter,
//! the line-protocol codec, and the batching writer.
//!
//! ## Design Goals
//!
//! - **Validated by construction**: tags and fields reject blank keys and
//!   values at creation time, never at serialization
//! - **Incremental records**: a record can be assembled piece by piece and
//!   is only checked for completeness when it hits the wire
//! - **Optional serialization**: enable the `serde` feature for JSON
//!   interchange of records and snapshots
//!
//! ## Example
//!
//! ```rust
//! use fluxline_types::{Batch, Field, Record, Tag};
//!
//! let record = Record::new("requests")
//!     .with_tag(Tag::new("method", "GET")?)
//!     .with_field(Field::new("count", 42u64)?);
//!
//! let mut batch = Batch::new();
//! batch.push(record);
//! assert_eq!(batch.len(), 1);
//! # Ok::<(), fluxline_types::ModelError>(())
//! ```

mod error;
mod metrics;
mod precision;
mod record;

pub use error::*;
pub use metrics::*;
pub use precision::*;
pub use record::*;
