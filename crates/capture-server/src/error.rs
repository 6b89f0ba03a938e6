//! Server error types.

use capture_core::SchemaError;
use thiserror::Error;

/// Errors that stop the server from starting or running.
#[derive(Debug, Error)]
pub enum ServerError {
    /// The configured host and port do not form a socket address.
    #[error("invalid listen address '{0}'")]
    InvalidAddress(String),

    /// Binding the listener failed.
    #[error("failed to bind to {addr}")]
    Bind {
        /// Address that could not be bound.
        addr: String,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The embedded entry schema could not be compiled.
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// I/O error while serving.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bind_error_keeps_source() {
        let err = ServerError::Bind {
            addr: "0.0.0.0:80".to_string(),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert_eq!(err.to_string(), "failed to bind to 0.0.0.0:80");
        assert!(std::error::Error::source(&err).is_some());
    }
}
