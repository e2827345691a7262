//! Line-protocol delivery over the HTTP write API.

use std::time::Duration;

use fluxline_types::Precision;

use crate::config::InfluxConfig;
use crate::{SdkError, TransportError};

use super::Transport;

/// Default request timeout for writes.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Blocking POST of line-protocol bytes to the `/write` endpoint.
///
/// # Example
///
/// ```rust,no_run
/// use fluxline_sdk::{HttpTransport, InfluxConfig};
///
/// let config = InfluxConfig::builder()
///     .host("influx.internal")
///     .database("metrics")
///     .build()?;
/// let transport = HttpTransport::new(config)?;
/// # Ok::<(), fluxline_sdk::SdkError>(())
/// ```
pub struct HttpTransport {
    url: String,
    precision: Precision,
    client: reqwest::blocking::Client,
}

impl HttpTransport {
    /// Create a transport posting to the config's derived write URL.
    pub fn new(config: InfluxConfig) -> Result<Self, SdkError> {
        Self::with_timeout(config, DEFAULT_TIMEOUT)
    }

    /// Create a transport with an explicit request timeout.
    pub fn with_timeout(config: InfluxConfig, timeout: Duration) -> Result<Self, SdkError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(TransportError::from)?;
        Ok(Self {
            url: config.write_url("http"),
            precision: config.precision(),
            client,
        })
    }

    /// The write endpoint this transport posts to.
    pub fn url(&self) -> &str {
        &self.url
    }
}

impl Transport for HttpTransport {
    fn precision(&self) -> Precision {
        self.precision
    }

    fn send(&mut self, payload: &[u8]) -> Result<Option<Vec<u8>>, TransportError> {
        let response = self
            .client
            .post(&self.url)
            .header(reqwest::header::CONTENT_TYPE, "text/plain; charset=utf-8")
            .body(payload.to_vec())
            .send()?;

        let status = response.status();
        let body = response.bytes()?;
        if !status.is_success() {
            return Err(TransportError::Rejected {
                status: status.as_u16(),
                body: String::from_utf8_lossy(&body).into_owned(),
            });
        }

        tracing::debug!(status = status.as_u16(), bytes = payload.len(), "write accepted");
        if body.is_empty() {
            Ok(None)
        } else {
            Ok(Some(body.to_vec()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fluxline_types::{Batch, Field, Record};

    fn config() -> InfluxConfig {
        InfluxConfig::builder()
            .host("localhost")
            .database("metrics")
            .build()
            .unwrap()
    }

    #[test]
    fn url_is_derived_from_config() {
        let transport = HttpTransport::new(config()).unwrap();
        assert_eq!(
            transport.url(),
            "http://localhost:8086/write?db=metrics&precision=s"
        );
    }

    #[test]
    fn serializes_line_protocol_at_config_precision() {
        let transport = HttpTransport::new(config()).unwrap();
        let mut batch = Batch::new();
        batch.push(Record::new("m").with_field(Field::new("v", 1i64).unwrap()));

        let payload = transport.serialize(&batch).unwrap();
        assert_eq!(payload, b"m v=1i");
    }
}
