//! Connection configuration for the InfluxDB transports.

use fluxline_types::Precision;

use crate::SdkError;

/// Default InfluxDB HTTP API port.
pub const DEFAULT_HTTP_PORT: u16 = 8086;

/// Default InfluxDB UDP listener port.
pub const DEFAULT_UDP_PORT: u16 = 8089;

/// Connection settings shared by the transports.
///
/// Built through [`InfluxConfig::builder`]; `host` and `database` are
/// required, everything else has a sensible default.
///
/// # Example
///
/// ```rust
/// use fluxline_sdk::InfluxConfig;
/// use fluxline_types::Precision;
///
/// let config = InfluxConfig::builder()
///     .host("influx.internal")
///     .database("metrics")
///     .precision(Precision::Milliseconds)
///     .build()
///     .unwrap();
///
/// assert_eq!(
///     config.write_url("http"),
///     "http://influx.internal:8086/write?db=metrics&precision=ms"
/// );
/// ```
#[derive(Debug, Clone)]
pub struct InfluxConfig {
    host: String,
    port: Option<u16>,
    database: String,
    username: String,
    password: String,
    retention_policy: String,
    precision: Precision,
    batch_size: usize,
}

impl InfluxConfig {
    /// Start building a configuration.
    pub fn builder() -> InfluxConfigBuilder {
        InfluxConfigBuilder::default()
    }

    /// Backend hostname.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Explicit port, if one was set.
    pub fn port(&self) -> Option<u16> {
        self.port
    }

    /// Target database name.
    pub fn database(&self) -> &str {
        &self.database
    }

    /// Timestamp precision for serialized payloads.
    pub fn precision(&self) -> Precision {
        self.precision
    }

    /// Records buffered before the writer flushes. Zero means unbounded.
    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Build the HTTP write endpoint URL for the given scheme.
    ///
    /// Credentials and the retention policy are appended only when set.
    /// The `precision` parameter is omitted for nanoseconds, the server
    /// default.
    pub fn write_url(&self, scheme: &str) -> String {
        let port = self.port.unwrap_or(DEFAULT_HTTP_PORT);
        let mut url = format!(
            "{scheme}://{host}:{port}/write?db={db}",
            host = self.host,
            db = self.database
        );
        if !self.username.is_empty() {
            url.push_str(&format!("&u={}", self.username));
        }
        if !self.password.is_empty() {
            url.push_str(&format!("&p={}", self.password));
        }
        if !self.retention_policy.is_empty() {
            url.push_str(&format!("&rp={}", self.retention_policy));
        }
        if self.precision != Precision::Nanoseconds {
            url.push_str(&format!("&precision={}", self.precision.as_str()));
        }
        url
    }
}

/// Builder for [`InfluxConfig`].
#[derive(Debug, Clone)]
pub struct InfluxConfigBuilder {
    host: String,
    port: Option<u16>,
    database: String,
    username: String,
    password: String,
    retention_policy: String,
    precision: Precision,
    batch_size: usize,
}

impl Default for InfluxConfigBuilder {
    fn default() -> Self {
        Self {
            host: String::new(),
            port: None,
            database: String::new(),
            username: String::new(),
            password: String::new(),
            retention_policy: String::new(),
            precision: Precision::default(),
            batch_size: 0,
        }
    }
}

impl InfluxConfigBuilder {
    /// Set the backend hostname (required).
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Set an explicit port. Defaults to the transport's well-known port.
    pub fn port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Set the target database (required).
    pub fn database(mut self, database: impl Into<String>) -> Self {
        self.database = database.into();
        self
    }

    /// Set the username sent with each write.
    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.username = username.into();
        self
    }

    /// Set the password sent with each write.
    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = password.into();
        self
    }

    /// Set the retention policy to write into.
    pub fn retention_policy(mut self, retention_policy: impl Into<String>) -> Self {
        self.retention_policy = retention_policy.into();
        self
    }

    /// Set the timestamp precision. Defaults to seconds.
    pub fn precision(mut self, precision: Precision) -> Self {
        self.precision = precision;
        self
    }

    /// Set the writer's flush threshold. Zero (the default) never
    /// triggers a size-based flush.
    pub fn batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Validate and build the configuration.
    pub fn build(self) -> Result<InfluxConfig, SdkError> {
        if self.host.trim().is_empty() {
            return Err(SdkError::Config("host must not be blank".to_string()));
        }
        if self.database.trim().is_empty() {
            return Err(SdkError::Config("database must not be blank".to_string()));
        }
        Ok(InfluxConfig {
            host: self.host,
            port: self.port,
            database: self.database,
            username: self.username,
            password: self.password,
            retention_policy: self.retention_policy,
            precision: self.precision,
            batch_size: self.batch_size,
        })
    }
}
