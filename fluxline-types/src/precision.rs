//! Timestamp precision for wire serialization.

use std::time::Duration;

/// Granularity used when a record timestamp is rendered to a wire integer.
///
/// Precision never changes how a timestamp is stored, only how it is
/// serialized. The InfluxDB wire default is nanoseconds; this library
/// defaults to [`Precision::Seconds`] for compactness, since many
/// consumers do not need finer ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Precision {
    /// Nanosecond ticks. Required by the UDP ingestion path.
    Nanoseconds,
    /// Microsecond ticks.
    Microseconds,
    /// Millisecond ticks.
    Milliseconds,
    /// Second ticks. The library default.
    #[default]
    Seconds,
    /// Minute ticks.
    Minutes,
    /// Hour ticks.
    Hours,
}

impl Precision {
    /// Query-string suffix understood by the `/write` endpoint.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Precision::Nanoseconds => "n",
            Precision::Microseconds => "u",
            Precision::Milliseconds => "ms",
            Precision::Seconds => "s",
            Precision::Minutes => "m",
            Precision::Hours => "h",
        }
    }

    /// Convert a duration since the epoch into ticks at this precision.
    pub fn ticks(&self, elapsed: Duration) -> u128 {
        match self {
            Precision::Nanoseconds => elapsed.as_nanos(),
            Precision::Microseconds => elapsed.as_micros(),
            Precision::Milliseconds => elapsed.as_millis(),
            Precision::Seconds => elapsed.as_secs() as u128,
            Precision::Minutes => (elapsed.as_secs() / 60) as u128,
            Precision::Hours => (elapsed.as_secs() / 3600) as u128,
        }
    }
}
