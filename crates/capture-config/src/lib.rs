//! Typed configuration for the capture service.
//!
//! [`CaptureConfig`] is built once in `main` by a [`ConfigLoader`] and then
//! passed by reference into constructors. Nothing past startup reads the
//! environment.
//!
//! Layers, lowest precedence first:
//!
//! 1. Built-in defaults
//! 2. A TOML or JSON file (unknown fields are rejected)
//! 3. A `.env` file and the process environment
//! 4. Command-line flags, applied by the binary
//!
//! # Configuration File Format
//!
//! ```toml
//! [server]
//! host = "0.0.0.0"
//! port = 8080
//! path = "campaign"
//! request_timeout_ms = 30000
//! shutdown_timeout_secs = 30
//! max_body_bytes = 1048576
//!
//! [store]
//! url = "sqlite:capture.db"
//! table = "entry"
//!
//! [auth]
//! username = "user"
//! password = "pass"
//!
//! [logging]
//! level = "info"
//! format = "json"
//! ```
//!
//! # Environment Variables
//!
//! Every key can be set as `CAPTURE__SECTION__KEY`, for example
//! `CAPTURE__SERVER__PORT=9000`. The service's historical variables are
//! also honoured and take precedence over the prefixed form:
//!
//! | Variable | Key |
//! |----------|-----|
//! | `CRSPORT` | `server.port` |
//! | `CRSPATH` | `server.path` |
//! | `CRSDBURL` | `store.url` |
//! | `CRSDBTBL` | `store.table` |
//! | `CRSUSER` | `auth.username` |
//! | `CRSPASS` | `auth.password` |
//!
//! # Example
//!
//! ```no_run
//! use capture_config::ConfigLoader;
//!
//! # fn main() -> Result<(), capture_config::ConfigError> {
//! let config = ConfigLoader::new()
//!     .with_optional_file("capture.toml")?
//!     .with_dotenv()
//!     .with_env_prefix("CAPTURE")
//!     .load()?;
//!
//! println!("listening on {}", config.server.socket_addr());
//! # Ok(())
//! # }
//! ```

#![doc(html_root_url = "https://docs.rs/capture-config/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod config;
mod error;
mod loader;

pub use config::{AuthConfig, CaptureConfig, LoggingConfig, ServerConfig, StoreConfig};
pub use capture_telemetry::LogFormat;
pub use error::ConfigError;
pub use loader::ConfigLoader;
