//! Error types for the capture service.
//!
//! [`CaptureError`] is the single error type that flows through the request
//! pipeline. Every variant belongs to an [`ErrorCategory`], and the category
//! alone decides the HTTP status written to the client. Messages shown to the
//! client come from [`CaptureError::messages`]; server-side failures never
//! leak their internal detail.
//!
//! | `ErrorCategory` | Status |
//! |---|---|
//! | `BadRequest` | 400 |
//! | `MethodNotAllowed` | 405 |
//! | `Authentication` | 401 |
//! | `NotFound` | 404 |
//! | `Schema` | 400 |
//! | `Validation` | 400 |
//! | `Persistence` | 500 |
//! | `Unexpected` | 500 |

use crate::envelope::ErrorEnvelope;
use crate::store::StoreError;
use http::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias using [`CaptureError`].
pub type CaptureResult<T> = Result<T, CaptureError>;

/// Message returned to clients for every server-side failure.
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal Server Error";

/// Categories of errors for classification and status mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Malformed transport-level input (empty body, unparseable JSON).
    BadRequest,
    /// HTTP method other than POST.
    MethodNotAllowed,
    /// Missing or invalid credentials.
    Authentication,
    /// Unknown request path.
    NotFound,
    /// The body did not conform to the entry schema.
    Schema,
    /// The decoded entry failed semantic validation.
    Validation,
    /// The storage collaborator failed.
    Persistence,
    /// Anything else, including recovered panics.
    Unexpected,
}

impl ErrorCategory {
    /// Returns the HTTP status code for this error category.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest | Self::Schema | Self::Validation => StatusCode::BAD_REQUEST,
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::Authentication => StatusCode::UNAUTHORIZED,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Persistence | Self::Unexpected => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns true for categories caused by the server rather than the client.
    #[must_use]
    pub const fn is_server_error(&self) -> bool {
        matches!(self, Self::Persistence | Self::Unexpected)
    }
}

/// Standard error type for the capture pipeline.
///
/// # Example
///
/// ```
/// use capture_core::{CaptureError, ErrorCategory};
///
/// let err = CaptureError::bad_request("Bad request");
/// assert_eq!(err.category(), ErrorCategory::BadRequest);
/// assert_eq!(err.status_code().as_u16(), 400);
/// assert_eq!(err.messages(), vec!["Bad request".to_string()]);
/// ```
#[derive(Error, Debug)]
pub enum CaptureError {
    /// The request could not be read or was empty.
    #[error("Bad request: {message}")]
    BadRequest {
        /// Client-facing message.
        message: String,
    },

    /// The body was not syntactically valid JSON.
    #[error("Malformed body: {message}")]
    MalformedBody {
        /// Parser message.
        message: String,
    },

    /// The request used a method other than POST.
    #[error("Method not allowed: {method}")]
    MethodNotAllowed {
        /// The offending method.
        method: String,
    },

    /// Credentials were missing, malformed, or wrong.
    #[error("Unauthorized: {reason}")]
    Unauthorized {
        /// Internal reason, logged but never sent to the client.
        reason: &'static str,
    },

    /// No route for the request path.
    #[error("Not found: {path}")]
    NotFound {
        /// The requested path.
        path: String,
    },

    /// The body conformed to the schema but could not be decoded.
    #[error("Decode error: {message}")]
    Decode {
        /// Decoder message.
        message: String,
    },

    /// The body violated the entry schema.
    #[error("Schema violations: {}", violations.join("; "))]
    Schema {
        /// One message per violation.
        violations: Vec<String>,
    },

    /// The decoded entry failed semantic validation.
    #[error("Validation failed: {}", violations.join("; "))]
    Validation {
        /// One message per violation.
        violations: Vec<String>,
    },

    /// The storage collaborator rejected the entry.
    #[error("Persistence error: {message}")]
    Persistence {
        /// Internal message.
        message: String,
        /// The underlying store error.
        #[source]
        source: StoreError,
    },

    /// An unexpected internal failure, including recovered panics.
    #[error("Unexpected error: {message}")]
    Unexpected {
        /// Internal message.
        message: String,
    },
}

impl CaptureError {
    /// Creates a bad request error.
    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
        }
    }

    /// Creates a malformed body error.
    #[must_use]
    pub fn malformed_body(message: impl Into<String>) -> Self {
        Self::MalformedBody {
            message: message.into(),
        }
    }

    /// Creates a method not allowed error.
    #[must_use]
    pub fn method_not_allowed(method: impl Into<String>) -> Self {
        Self::MethodNotAllowed {
            method: method.into(),
        }
    }

    /// Creates an unauthorized error with an internal reason.
    #[must_use]
    pub const fn unauthorized(reason: &'static str) -> Self {
        Self::Unauthorized { reason }
    }

    /// Creates a not found error.
    #[must_use]
    pub fn not_found(path: impl Into<String>) -> Self {
        Self::NotFound { path: path.into() }
    }

    /// Creates a decode error.
    #[must_use]
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    /// Creates a persistence error wrapping a store failure.
    #[must_use]
    pub fn persistence(source: StoreError) -> Self {
        Self::Persistence {
            message: source.to_string(),
            source,
        }
    }

    /// Creates an unexpected error.
    #[must_use]
    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::Unexpected {
            message: message.into(),
        }
    }

    /// Returns the error category.
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::BadRequest { .. } | Self::MalformedBody { .. } | Self::Decode { .. } => {
                ErrorCategory::BadRequest
            }
            Self::MethodNotAllowed { .. } => ErrorCategory::MethodNotAllowed,
            Self::Unauthorized { .. } => ErrorCategory::Authentication,
            Self::NotFound { .. } => ErrorCategory::NotFound,
            Self::Schema { .. } => ErrorCategory::Schema,
            Self::Validation { .. } => ErrorCategory::Validation,
            Self::Persistence { .. } => ErrorCategory::Persistence,
            Self::Unexpected { .. } => ErrorCategory::Unexpected,
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        self.category().status_code()
    }

    /// Returns the messages the client is allowed to see.
    #[must_use]
    pub fn messages(&self) -> Vec<String> {
        match self {
            Self::BadRequest { message }
            | Self::MalformedBody { message }
            | Self::Decode { message } => vec![message.clone()],
            Self::MethodNotAllowed { .. } => vec!["Method not allowed".to_string()],
            Self::Unauthorized { .. } => vec!["Unauthorized".to_string()],
            Self::NotFound { .. } => vec!["Not found".to_string()],
            Self::Schema { violations } | Self::Validation { violations } => violations.clone(),
            Self::Persistence { .. } | Self::Unexpected { .. } => {
                vec![INTERNAL_ERROR_MESSAGE.to_string()]
            }
        }
    }

    /// Converts this error to the JSON error envelope.
    #[must_use]
    pub fn to_envelope(&self) -> ErrorEnvelope {
        ErrorEnvelope::new(self.status_code(), self.messages())
    }
}

impl From<StoreError> for CaptureError {
    fn from(err: StoreError) -> Self {
        Self::persistence(err)
    }
}
