//! Error types for the reporter pipeline.

use chrono::{DateTime, Utc};
use thiserror::Error;

use fluxline_types::ModelError;

/// Errors raised while delivering a payload to the backend.
#[derive(Debug, Error)]
pub enum TransportError {
    /// HTTP request failed before a response was received.
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// The server answered with a non-success status.
    #[error("server rejected write: {status} {body}")]
    Rejected {
        /// HTTP status code.
        status: u16,
        /// Response body, if any.
        body: String,
    },

    /// Connection failed.
    #[error("connection failed: {0}")]
    Connection(String),

    /// Timeout waiting for a response.
    #[error("request timed out")]
    Timeout,

    /// Socket-level failure (UDP send, bind).
    #[error("socket error: {0}")]
    Socket(#[from] std::io::Error),
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TransportError::Timeout
        } else if err.is_connect() {
            TransportError::Connection(err.to_string())
        } else {
            TransportError::Http(err.to_string())
        }
    }
}

/// Errors raised by the codec, converter, config, or writer.
#[derive(Debug, Error)]
pub enum SdkError {
    /// A model value failed validation.
    #[error(transparent)]
    Model(#[from] ModelError),

    /// A blank string reached the escaping pass.
    #[error("cannot escape a blank string")]
    BlankEscapeInput,

    /// A record reached serialization without a measurement name.
    #[error("record name must not be blank")]
    BlankRecordName,

    /// A record reached serialization with no fields.
    #[error("record `{0}` has no fields")]
    NoFields(String),

    /// A timestamp predates the Unix epoch.
    #[error("timestamp {0} is earlier than the Unix epoch")]
    TimestampOutOfRange(DateTime<Utc>),

    /// Configuration was missing or invalid.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Delivery failed.
    #[error(transparent)]
    Transport(#[from] TransportError),
}
