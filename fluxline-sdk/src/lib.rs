//! # fluxline-sdk
//!
//! Reporting pipeline for exporting metric snapshots to InfluxDB: a
//! line-protocol codec, a snapshot-to-record converter, pluggable name
//! formatting, a batching writer, and thin transports over HTTP, UDP,
//! and JSON.
//!
//! ## Pipeline
//!
//! ```text
//! MetricsSnapshot -> SnapshotConverter -> Record(s)
//!     -> NameFormatter -> BatchWriter -> Transport -> backend
//! ```
//!
//! Delivery is best effort: a failed flush is handed to the writer's
//! error handler and the batch is dropped, never retried.
//!
//! ## Example
//!
//! ```rust
//! use fluxline_sdk::{InfluxReporter, MemoryTransport};
//! use fluxline_types::{GaugeSnapshot, MetricsSnapshot};
//!
//! let mut reporter = InfluxReporter::with_transport(MemoryTransport::new(), 0)?;
//!
//! let snapshot = MetricsSnapshot::builder()
//!     .gauge(GaugeSnapshot {
//!         name: "Queue Depth".to_string(),
//!         tags: vec![],
//!         value: 42.0,
//!     })
//!     .build();
//! reporter.report(&snapshot)?;
//!
//! let payload = reporter.writer().transport().last_payload().unwrap();
//! assert!(payload.starts_with("queue_depth Value=42"));
//! # Ok::<(), fluxline_sdk::SdkError>(())
//! ```

mod config;
mod convert;
mod error;
mod format;
mod reporter;
mod transport;
mod writer;

pub mod line_protocol;

pub use config::{InfluxConfig, InfluxConfigBuilder, DEFAULT_HTTP_PORT, DEFAULT_UDP_PORT};
pub use convert::{SnapshotConverter, HEALTH_MEASUREMENT};
pub use error::{SdkError, TransportError};
pub use format::{default_name_transform, NameFormatter, NameHook};
pub use reporter::{InfluxReporter, InfluxReporterBuilder};
pub use transport::{HttpTransport, JsonTransport, MemoryTransport, Transport, UdpTransport};
pub use writer::{BatchWriter, ErrorHandler};
