//! JSON response envelopes.
//!
//! Every response body is one of two shapes:
//!
//! ```json
//! {"status": 400, "messages": ["campaignName is a required field"]}
//! {"status": 200, "entryId": "9f86d081884c7d659a2feaa0c55ad015"}
//! ```
//!
//! The `status` field always equals the HTTP status of the response.

use http::StatusCode;
use serde::{Deserialize, Serialize};

/// Error response body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    /// HTTP status code.
    pub status: u16,
    /// Ordered, client-facing messages.
    pub messages: Vec<String>,
}

impl ErrorEnvelope {
    /// Creates an error envelope for the given status.
    #[must_use]
    pub fn new(status: StatusCode, messages: Vec<String>) -> Self {
        Self {
            status: status.as_u16(),
            messages,
        }
    }

    /// Creates an envelope with a single message.
    #[must_use]
    pub fn single(status: StatusCode, message: impl Into<String>) -> Self {
        Self::new(status, vec![message.into()])
    }
}

/// Success response body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuccessEnvelope {
    /// HTTP status code, always 200.
    pub status: u16,
    /// Public identifier assigned to the stored entry.
    #[serde(rename = "entryId")]
    pub entry_id: String,
}

impl SuccessEnvelope {
    /// Creates a 200 envelope for the given entry identifier.
    #[must_use]
    pub fn new(entry_id: impl Into<String>) -> Self {
        Self {
            status: StatusCode::OK.as_u16(),
            entry_id: entry_id.into(),
        }
    }
}
