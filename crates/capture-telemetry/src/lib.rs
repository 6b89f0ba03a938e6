//! Structured logging for the capture service.
//!
//! Logging is initialised once, in `main`, from a [`LogConfig`]. Every crate
//! in the workspace logs through `tracing` macros; this crate only decides
//! where those events go and how they are formatted.
//!
//! ```text
//!   gates / handler / store ── tracing::{debug,warn,error}! ──┐
//!                                                             ▼
//!                                 EnvFilter ── fmt layer (json | pretty) ── stdout
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use capture_telemetry::{init_logging, LogConfig};
//!
//! init_logging(&LogConfig::default())?;
//! tracing::info!(port = 8080, "listening");
//! ```

mod error;
pub mod logging;

pub use error::TelemetryError;
pub use logging::{create_env_filter, init_logging, LogConfig, LogFormat};

/// Result type for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;
