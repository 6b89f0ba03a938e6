//! Configuration sections.

use crate::ConfigError;
use capture_telemetry::{LogConfig, LogFormat};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Root configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CaptureConfig {
    /// HTTP listener and request limits.
    #[serde(default)]
    pub server: ServerConfig,

    /// Entry storage.
    #[serde(default)]
    pub store: StoreConfig,

    /// Basic authentication credentials.
    #[serde(default)]
    pub auth: AuthConfig,

    /// Log output.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl CaptureConfig {
    /// Checks every section, reporting the first invalid value.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] naming the offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.server.validate()?;
        self.store.validate()?;
        self.auth.validate()?;
        self.logging.validate()
    }
}

/// HTTP server settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Interface to bind.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Capture endpoint path segment, without slashes.
    #[serde(default = "default_path")]
    pub path: String,

    /// Upper bound on reading a request body.
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,

    /// Time allowed for in-flight requests after a shutdown signal.
    #[serde(default = "default_shutdown_timeout_secs")]
    pub shutdown_timeout_secs: u64,

    /// Largest accepted request body.
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            path: default_path(),
            request_timeout_ms: default_request_timeout_ms(),
            shutdown_timeout_secs: default_shutdown_timeout_secs(),
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

impl ServerConfig {
    /// `host:port`, ready for binding.
    #[must_use]
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// The capture route, with a single leading slash.
    #[must_use]
    pub fn route(&self) -> String {
        format!("/{}", self.path.trim_matches('/'))
    }

    /// Request timeout as a [`Duration`].
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// Shutdown timeout as a [`Duration`].
    #[must_use]
    pub const fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout_secs)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.host.trim().is_empty() {
            return Err(ConfigError::invalid_value("server.host", "must not be empty"));
        }
        if self.port == 0 {
            return Err(ConfigError::invalid_value("server.port", "must be non-zero"));
        }
        let path = self.path.trim_matches('/');
        if path.is_empty() {
            return Err(ConfigError::invalid_value("server.path", "must not be empty"));
        }
        if path.chars().any(|c| c.is_whitespace() || c == '?' || c == '#') {
            return Err(ConfigError::invalid_value(
                "server.path",
                format!("'{}' is not a usable path segment", self.path),
            ));
        }
        if self.request_timeout_ms == 0 {
            return Err(ConfigError::invalid_value(
                "server.request_timeout_ms",
                "must be non-zero",
            ));
        }
        if self.shutdown_timeout_secs == 0 {
            return Err(ConfigError::invalid_value(
                "server.shutdown_timeout_secs",
                "must be non-zero",
            ));
        }
        if self.max_body_bytes == 0 {
            return Err(ConfigError::invalid_value(
                "server.max_body_bytes",
                "must be non-zero",
            ));
        }
        Ok(())
    }
}

/// Entry storage settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StoreConfig {
    /// Store URL: `sqlite:<path>`, `sqlite::memory:` or `memory:`.
    #[serde(default = "default_store_url")]
    pub url: String,

    /// Table that receives entries.
    #[serde(default = "default_store_table")]
    pub table: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            url: default_store_url(),
            table: default_store_table(),
        }
    }
}

impl StoreConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.url.trim().is_empty() {
            return Err(ConfigError::invalid_value("store.url", "must not be empty"));
        }
        if !is_identifier(&self.table) {
            return Err(ConfigError::invalid_value(
                "store.table",
                format!("'{}' is not a valid table name", self.table),
            ));
        }
        Ok(())
    }
}

/// Basic authentication credentials.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AuthConfig {
    /// Expected username.
    #[serde(default = "default_username")]
    pub username: String,

    /// Expected password.
    #[serde(default = "default_password")]
    pub password: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            username: default_username(),
            password: default_password(),
        }
    }
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl AuthConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.username.is_empty() {
            return Err(ConfigError::invalid_value("auth.username", "must not be empty"));
        }
        if self.username.contains(':') {
            return Err(ConfigError::invalid_value("auth.username", "must not contain ':'"));
        }
        if self.password.is_empty() {
            return Err(ConfigError::invalid_value("auth.password", "must not be empty"));
        }
        Ok(())
    }
}

/// Log output settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Filter directive (`trace`, `debug`, `info`, `warn`, `error`, or a
    /// full `EnvFilter` expression).
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format.
    #[serde(default)]
    pub format: LogFormat,

    /// Include source file and line in events.
    #[serde(default)]
    pub include_location: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
            include_location: false,
        }
    }
}

impl LoggingConfig {
    /// Converts to the telemetry crate's settings.
    #[must_use]
    pub fn to_log_config(&self) -> LogConfig {
        LogConfig {
            file_line_info: self.include_location,
            ..LogConfig::new(self.level.clone(), self.format)
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.level.trim().is_empty() {
            return Err(ConfigError::invalid_value("logging.level", "must not be empty"));
        }
        Ok(())
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

const fn default_port() -> u16 {
    8080
}

fn default_path() -> String {
    "campaign".to_string()
}

const fn default_request_timeout_ms() -> u64 {
    30_000
}

const fn default_shutdown_timeout_secs() -> u64 {
    30
}

const fn default_max_body_bytes() -> usize {
    1024 * 1024
}

fn default_store_url() -> String {
    "sqlite:capture.db".to_string()
}

fn default_store_table() -> String {
    "entry".to_string()
}

fn default_username() -> String {
    "user".to_string()
}

fn default_password() -> String {
    "pass".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CaptureConfig::default();
        assert_eq!(config.server.socket_addr(), "0.0.0.0:8080");
        assert_eq!(config.server.route(), "/campaign");
        assert_eq!(config.server.request_timeout(), Duration::from_secs(30));
        assert_eq!(config.server.max_body_bytes, 1_048_576);
        assert_eq!(config.store.url, "sqlite:capture.db");
        assert_eq!(config.store.table, "entry");
        assert_eq!(config.auth.username, "user");
        assert_eq!(config.auth.password, "pass");
        assert_eq!(config.logging.format, LogFormat::Json);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_route_normalises_slashes() {
        let server = ServerConfig {
            path: "/entries/".to_string(),
            ..ServerConfig::default()
        };
        assert_eq!(server.route(), "/entries");
    }

    #[test]
    fn test_rejects_empty_path() {
        let mut config = CaptureConfig::default();
        config.server.path = "/".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("server.path"));
    }

    #[test]
    fn test_rejects_zero_port_and_limits() {
        let mut config = CaptureConfig::default();
        config.server.port = 0;
        assert!(config.validate().is_err());

        let mut config = CaptureConfig::default();
        config.server.request_timeout_ms = 0;
        assert!(config.validate().is_err());

        let mut config = CaptureConfig::default();
        config.server.max_body_bytes = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_bad_table_name() {
        let mut config = CaptureConfig::default();
        config.store.table = "entry; DROP TABLE entry".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("store.table"));
    }

    #[test]
    fn test_rejects_empty_credentials() {
        let mut config = CaptureConfig::default();
        config.auth.password = String::new();
        assert!(config.validate().is_err());

        let mut config = CaptureConfig::default();
        config.auth.username = "a:b".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_auth_debug_hides_password() {
        let auth = AuthConfig {
            username: "ops".to_string(),
            password: "hunter2".to_string(),
        };
        let debug = format!("{auth:?}");
        assert!(debug.contains("ops"));
        assert!(!debug.contains("hunter2"));
    }

    #[test]
    fn test_logging_conversion() {
        let logging = LoggingConfig {
            level: "debug".to_string(),
            format: LogFormat::Pretty,
            include_location: true,
        };
        let log = logging.to_log_config();
        assert_eq!(log.level, "debug");
        assert_eq!(log.format, LogFormat::Pretty);
        assert!(log.file_line_info);
    }
}
