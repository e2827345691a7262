//! Line-protocol delivery over UDP.

use std::net::UdpSocket;

use fluxline_types::Precision;

use crate::config::{InfluxConfig, DEFAULT_UDP_PORT};
use crate::{SdkError, TransportError};

use super::Transport;

/// Payloads beyond this size are likely to be dropped on the path.
const DATAGRAM_WARN_BYTES: usize = 64 * 1024;

/// Fire-and-forget datagrams to the UDP listener.
///
/// The UDP listener interprets timestamps as nanoseconds regardless of
/// any server configuration, so this transport always serializes at
/// nanosecond precision and ignores the configured one.
pub struct UdpTransport {
    socket: UdpSocket,
    target: String,
}

impl UdpTransport {
    /// Create a transport sending to the config's host and port.
    pub fn new(config: &InfluxConfig) -> Result<Self, SdkError> {
        let socket = UdpSocket::bind(("0.0.0.0", 0)).map_err(TransportError::from)?;
        let port = config.port().unwrap_or(DEFAULT_UDP_PORT);
        Ok(Self {
            socket,
            target: format!("{}:{}", config.host(), port),
        })
    }

    /// The `host:port` datagrams are sent to.
    pub fn target(&self) -> &str {
        &self.target
    }
}

impl Transport for UdpTransport {
    fn precision(&self) -> Precision {
        Precision::Nanoseconds
    }

    fn send(&mut self, payload: &[u8]) -> Result<Option<Vec<u8>>, TransportError> {
        if payload.len() > DATAGRAM_WARN_BYTES {
            tracing::warn!(
                bytes = payload.len(),
                target = %self.target,
                "datagram exceeds 64KiB and may be dropped"
            );
        }
        self.socket.send_to(payload, &self.target)?;
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;
    use fluxline_types::{Batch, Field, Record};

    fn config(port: u16) -> InfluxConfig {
        InfluxConfig::builder()
            .host("127.0.0.1")
            .port(port)
            .database("metrics")
            .precision(Precision::Seconds)
            .build()
            .unwrap()
    }

    #[test]
    fn default_port_applies_when_unset() {
        let config = InfluxConfig::builder()
            .host("127.0.0.1")
            .database("metrics")
            .build()
            .unwrap();
        let transport = UdpTransport::new(&config).unwrap();
        assert_eq!(transport.target(), "127.0.0.1:8089");
    }

    #[test]
    fn serializes_at_nanosecond_precision_regardless_of_config() {
        let transport = UdpTransport::new(&config(8089)).unwrap();
        let mut batch = Batch::new();
        batch.push(
            Record::new("m")
                .with_field(Field::new("v", 1i64).unwrap())
                .with_timestamp(DateTime::from_timestamp(1483228800, 0).unwrap()),
        );

        let payload = transport.serialize(&batch).unwrap();
        assert_eq!(payload, b"m v=1i 1483228800000000000");
    }

    #[test]
    fn send_delivers_a_datagram() {
        let receiver = UdpSocket::bind(("127.0.0.1", 0)).unwrap();
        receiver
            .set_read_timeout(Some(std::time::Duration::from_secs(5)))
            .unwrap();
        let port = receiver.local_addr().unwrap().port();

        let mut transport = UdpTransport::new(&config(port)).unwrap();
        assert!(transport.send(b"m v=1i").unwrap().is_none());

        let mut buf = [0u8; 64];
        let (len, _) = receiver.recv_from(&mut buf).unwrap();
        assert_eq!(&buf[..len], b"m v=1i");
    }
}
