//! JSON delivery over HTTP.

use std::time::Duration;

use fluxline_types::{Batch, FieldValue, Precision, Record};
use serde_json::{json, Map, Value};

use crate::config::InfluxConfig;
use crate::{SdkError, TransportError};

use super::Transport;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// POSTs the batch as a JSON array of record objects.
///
/// Each record becomes `{"name", "tags", "fields", "timestamp"}` with
/// tags and fields as objects and the timestamp in RFC 3339 form (no
/// precision truncation applies). Records without a timestamp omit the
/// key.
pub struct JsonTransport {
    url: String,
    precision: Precision,
    client: reqwest::blocking::Client,
}

impl JsonTransport {
    /// Create a transport posting to the config's derived write URL.
    pub fn new(config: InfluxConfig) -> Result<Self, SdkError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(DEFAULT_TIMEOUT)
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

fn value_to_json(value: &FieldValue) -> Value {
    match value {
        FieldValue::Integer(v) => json!(v),
        FieldValue::Unsigned(v) => json!(v),
        // Non-finite floats have no JSON representation.
        FieldValue::Float(v) => serde_json::Number::from_f64(*v)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        FieldValue::Boolean(v) => json!(v),
        FieldValue::Text(v) => json!(v),
    }
}

fn record_to_json(record: &Record) -> Result<Value, SdkError> {
    if record.name().trim().is_empty() {
        return Err(SdkError::BlankRecordName);
    }
    if record.fields().is_empty() {
        return Err(SdkError::NoFields(record.name().to_string()));
    }

    let mut tags = Map::new();
    for tag in record.tags() {
        tags.insert(tag.key().to_string(), json!(tag.value()));
    }
    let mut fields = Map::new();
    for field in record.fields() {
        fields.insert(field.key().to_string(), value_to_json(field.value()));
    }

    let mut object = Map::new();
    object.insert("name".to_string(), json!(record.name()));
    object.insert("tags".to_string(), Value::Object(tags));
    object.insert("fields".to_string(), Value::Object(fields));
    if let Some(timestamp) = record.timestamp() {
        object.insert("timestamp".to_string(), json!(timestamp.to_rfc3339()));
    }
    Ok(Value::Object(object))
}

impl Transport for JsonTransport {
    fn precision(&self) -> Precision {
        self.precision
    }

    fn serialize(&self, batch: &Batch) -> Result<Vec<u8>, SdkError> {
        let records: Vec<Value> = batch.iter().map(record_to_json).collect::<Result<_, _>>()?;
        // Vec<Value> serialization cannot fail.
        Ok(serde_json::to_vec(&records).unwrap_or_default())
    }

    fn send(&mut self, payload: &[u8]) -> Result<Option<Vec<u8>>, TransportError> {
        let response = self
            .client
            .post(&self.url)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
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
        if body.is_empty() {
            Ok(None)
        } else {
            Ok(Some(body.to_vec()))
        }
    }
}
