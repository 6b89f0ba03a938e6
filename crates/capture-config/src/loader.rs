//! Layered configuration loader.

use std::env;
use std::ffi::OsString;
use std::fs;
use std::path::Path;

use capture_telemetry::LogFormat;

use crate::{CaptureConfig, ConfigError};

/// Historical variable names and the keys they set.
const LEGACY_VARS: [(&str, &[&str]); 6] = [
    ("CRSPORT", &["SERVER", "PORT"]),
    ("CRSPATH", &["SERVER", "PATH"]),
    ("CRSDBURL", &["STORE", "URL"]),
    ("CRSDBTBL", &["STORE", "TABLE"]),
    ("CRSUSER", &["AUTH", "USERNAME"]),
    ("CRSPASS", &["AUTH", "PASSWORD"]),
];

/// Builds a [`CaptureConfig`] from defaults, a file and the environment.
///
/// Later layers override earlier ones. Environment overrides are applied
/// by [`load`](Self::load), after every file layer.
///
/// # Example
///
/// ```no_run
/// use capture_config::ConfigLoader;
///
/// # fn main() -> Result<(), capture_config::ConfigError> {
/// let config = ConfigLoader::new()
///     .with_file("capture.toml")?
///     .with_env_prefix("CAPTURE")
///     .load()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ConfigLoader {
    config: CaptureConfig,
    env_prefix: Option<String>,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    /// Creates a loader seeded with the built-in defaults.
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: CaptureConfig::default(),
            env_prefix: None,
        }
    }

    /// Loads a TOML (`.toml`) or JSON (`.json`) file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file is missing, unreadable, has an
    /// unsupported extension, or contains invalid or unknown fields.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::file_not_found(path));
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::read_error(path, e))?;
        let format = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or_default();

        self.config = Self::parse(&content, format)?;
        Ok(self)
    }

    /// Loads a file if it exists.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file exists but cannot be loaded.
    pub fn with_optional_file<P: AsRef<Path>>(self, path: P) -> Result<Self, ConfigError> {
        if path.as_ref().exists() {
            self.with_file(path)
        } else {
            Ok(self)
        }
    }

    /// Loads configuration text in the named format (`toml` or `json`).
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if parsing fails or the format is unknown.
    ///
    /// # Example
    ///
    /// ```
    /// use capture_config::ConfigLoader;
    ///
    /// let config = ConfigLoader::new()
    ///     .with_string("[server]\nport = 9000", "toml")
    ///     .unwrap()
    ///     .load()
    ///     .unwrap();
    ///
    /// assert_eq!(config.server.port, 9000);
    /// ```
    pub fn with_string(mut self, content: &str, format: &str) -> Result<Self, ConfigError> {
        self.config = Self::parse(content, format)?;
        Ok(self)
    }

    /// Enables `PREFIX__SECTION__KEY` overrides and the legacy variables.
    #[must_use]
    pub fn with_env_prefix(mut self, prefix: &str) -> Self {
        self.env_prefix = Some(prefix.to_uppercase());
        self
    }

    /// Loads a `.env` file from the working directory, if present.
    #[must_use]
    pub fn with_dotenv(self) -> Self {
        // A missing .env is not an error.
        dotenvy::dotenv().ok();
        self
    }

    /// Applies environment overrides and validates.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable cannot be parsed or the result
    /// fails validation.
    pub fn load(self) -> Result<CaptureConfig, ConfigError> {
        let config = self.load_unvalidated()?;
        config.validate()?;
        Ok(config)
    }

    /// Applies environment overrides without validating.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable cannot be parsed.
    pub fn load_unvalidated(mut self) -> Result<CaptureConfig, ConfigError> {
        if let Some(prefix) = self.env_prefix.take() {
            self.apply_vars(unicode_vars(env::vars_os()), &prefix)?;
        }
        Ok(self.config)
    }

    fn parse(content: &str, format: &str) -> Result<CaptureConfig, ConfigError> {
        match format.to_lowercase().as_str() {
            "toml" => Ok(toml::from_str(content)?),
            "json" => Ok(serde_json::from_str(content)?),
            other => Err(ConfigError::UnsupportedFormat(other.to_string())),
        }
    }

    /// Applies prefixed variables first, then the legacy names, so that a
    /// legacy variable wins when both are set.
    fn apply_vars<I>(&mut self, vars: I, prefix: &str) -> Result<(), ConfigError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut legacy = Vec::new();
        for (key, value) in vars {
            if LEGACY_VARS.iter().any(|(name, _)| *name == key) {
                legacy.push((key, value));
            } else {
                self.apply_env_var(&key, &value, prefix)?;
            }
        }

        for (name, parts) in LEGACY_VARS {
            if let Some((key, value)) = legacy.iter().find(|(key, _)| key == name) {
                self.set(parts, key, value)?;
            }
        }
        Ok(())
    }

    fn apply_env_var(&mut self, key: &str, value: &str, prefix: &str) -> Result<(), ConfigError> {
        let Some(rest) = key
            .strip_prefix(prefix)
            .and_then(|rest| rest.strip_prefix("__"))
        else {
            return Ok(());
        };
        let parts: Vec<&str> = rest.split("__").collect();
        self.set(&parts, key, value)
    }

    fn set(&mut self, parts: &[&str], key: &str, value: &str) -> Result<(), ConfigError> {
        match parts {
            ["SERVER", "HOST"] => self.config.server.host = value.to_string(),
            ["SERVER", "PORT"] => self.config.server.port = parse_number(key, value)?,
            ["SERVER", "PATH"] => self.config.server.path = value.to_string(),
            ["SERVER", "REQUEST_TIMEOUT_MS"] => {
                self.config.server.request_timeout_ms = parse_number(key, value)?;
            }
            ["SERVER", "SHUTDOWN_TIMEOUT_SECS"] => {
                self.config.server.shutdown_timeout_secs = parse_number(key, value)?;
            }
            ["SERVER", "MAX_BODY_BYTES"] => {
                self.config.server.max_body_bytes = parse_number(key, value)?;
            }

            ["STORE", "URL"] => self.config.store.url = value.to_string(),
            ["STORE", "TABLE"] => self.config.store.table = value.to_string(),

            ["AUTH", "USERNAME"] => self.config.auth.username = value.to_string(),
            ["AUTH", "PASSWORD"] => self.config.auth.password = value.to_string(),

            ["LOGGING", "LEVEL"] => self.config.logging.level = value.to_string(),
            ["LOGGING", "FORMAT"] => {
                self.config.logging.format = LogFormat::parse(value)
                    .ok_or_else(|| ConfigError::env_parse_error(key, "expected 'json' or 'pretty'"))?;
            }
            ["LOGGING", "INCLUDE_LOCATION"] => {
                self.config.logging.include_location = parse_bool(value)
                    .ok_or_else(|| ConfigError::env_parse_error(key, "expected boolean"))?;
            }

            // Unknown key - ignore
            _ => {}
        }
        Ok(())
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::env_parse_error(key, "expected non-negative integer"))
}

/// Parse a boolean from a string.
fn parse_bool(s: &str) -> Option<bool> {
    match s.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Drops variables whose name or value is not valid Unicode.
fn unicode_vars<I>(vars: I) -> impl Iterator<Item = (String, String)>
where
    I: IntoIterator<Item = (OsString, OsString)>,
{
    vars.into_iter()
        .filter_map(|(key, value)| Some((key.into_string().ok()?, value.into_string().ok()?)))
}
