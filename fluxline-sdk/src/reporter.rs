//! The reporter facade: snapshot in, wire bytes out.

use fluxline_types::MetricsSnapshot;

use crate::config::InfluxConfig;
use crate::convert::SnapshotConverter;
use crate::format::NameFormatter;
use crate::transport::{HttpTransport, JsonTransport, Transport, UdpTransport};
use crate::writer::BatchWriter;
use crate::SdkError;

/// Drives the full pipeline for one snapshot at a time: convert, format,
/// buffer, flush.
///
/// # Example
///
/// ```rust,no_run
/// use fluxline_sdk::{InfluxConfig, InfluxReporter};
/// use fluxline_types::MetricsSnapshot;
///
/// let config = InfluxConfig::builder()
///     .host("influx.internal")
///     .database("metrics")
///     .batch_size(100)
///     .build()?;
/// let mut reporter = InfluxReporter::http(config)?;
///
/// let snapshot = MetricsSnapshot::builder().build();
/// reporter.report(&snapshot)?;
/// # Ok::<(), fluxline_sdk::SdkError>(())
/// ```
pub struct InfluxReporter<T: Transport> {
    converter: SnapshotConverter,
    formatter: NameFormatter,
    writer: BatchWriter<T>,
}

impl<T: Transport> InfluxReporter<T> {
    /// Start building a reporter from explicit collaborators.
    pub fn builder() -> InfluxReporterBuilder<T> {
        InfluxReporterBuilder {
            converter: None,
            formatter: None,
            writer: None,
        }
    }

    /// Convert, format, and deliver one snapshot.
    ///
    /// The snapshot's timestamp is stamped onto every record. Conversion
    /// and formatting errors propagate; delivery failures go to the
    /// writer's error handler and are not visible here.
    pub fn report(&mut self, snapshot: &MetricsSnapshot) -> Result<(), SdkError> {
        let mut records = self.converter.convert_snapshot(snapshot)?;
        for record in &mut records {
            self.formatter.apply(record)?;
        }
        self.writer.write_all(records);
        self.writer.flush();
        Ok(())
    }

    /// The underlying writer.
    pub fn writer(&self) -> &BatchWriter<T> {
        &self.writer
    }
}

impl InfluxReporter<HttpTransport> {
    /// Reporter delivering line protocol over HTTP.
    pub fn http(config: InfluxConfig) -> Result<Self, SdkError> {
        let batch_size = config.batch_size();
        let transport = HttpTransport::new(config)?;
        Self::with_transport(transport, batch_size)
    }
}

impl InfluxReporter<UdpTransport> {
    /// Reporter delivering line protocol over UDP.
    pub fn udp(config: InfluxConfig) -> Result<Self, SdkError> {
        let batch_size = config.batch_size();
        let transport = UdpTransport::new(&config)?;
        Self::with_transport(transport, batch_size)
    }
}

impl InfluxReporter<JsonTransport> {
    /// Reporter delivering JSON over HTTP.
    pub fn json(config: InfluxConfig) -> Result<Self, SdkError> {
        let batch_size = config.batch_size();
        let transport = JsonTransport::new(config)?;
        Self::with_transport(transport, batch_size)
    }
}

impl<T: Transport> InfluxReporter<T> {
    /// Reporter with default converter and formatter over any transport.
    pub fn with_transport(transport: T, batch_size: usize) -> Result<Self, SdkError> {
        Self::builder()
            .converter(SnapshotConverter::new())
            .formatter(NameFormatter::new())
            .writer(BatchWriter::new(transport).with_batch_size(batch_size))
            .build()
    }
}

/// Builder for [`InfluxReporter`]; all three collaborators are required.
pub struct InfluxReporterBuilder<T: Transport> {
    converter: Option<SnapshotConverter>,
    formatter: Option<NameFormatter>,
    writer: Option<BatchWriter<T>>,
}

impl<T: Transport> InfluxReporterBuilder<T> {
    /// Set the snapshot converter (carries the global tags).
    pub fn converter(mut self, converter: SnapshotConverter) -> Self {
        self.converter = Some(converter);
        self
    }

    /// Set the name formatter.
    pub fn formatter(mut self, formatter: NameFormatter) -> Self {
        self.formatter = Some(formatter);
        self
    }

    /// Set the batching writer.
    pub fn writer(mut self, writer: BatchWriter<T>) -> Self {
        self.writer = Some(writer);
        self
    }

    /// Build, failing if any collaborator is missing.
    pub fn build(self) -> Result<InfluxReporter<T>, SdkError> {
        let converter = self
            .converter
            .ok_or_else(|| SdkError::Config("reporter requires a converter".to_string()))?;
        let formatter = self
            .formatter
            .ok_or_else(|| SdkError::Config("reporter requires a formatter".to_string()))?;
        let writer = self
            .writer
            .ok_or_else(|| SdkError::Config("reporter requires a writer".to_string()))?;
        Ok(InfluxReporter {
            converter,
            formatter,
            writer,
        })
    }
}
