//! Sample submissions for tests across the workspace.
//!
//! # Example
//!
//! ```
//! use capture_core::{fixtures, Entry};
//!
//! let entry = Entry::construct(&fixtures::valid_entry_body()).unwrap();
//! assert_eq!(entry.entrant.email_address, "ada@example.com");
//! ```

use bytes::Bytes;
use serde_json::{json, Value};

/// A complete submission that passes schema and semantic validation.
#[must_use]
pub fn valid_entry_json() -> Value {
    json!({
        "campaignName": "spring-giveaway",
        "campaignVersion": "1.2.0",
        "sessionFingerprint": "3f2a9c",
        "submitAction": "store",
        "entrant": {
            "title": "Dr",
            "firstName": "Ada",
            "lastName": "Lovelace",
            "emailAddress": "ada@example.com",
            "phoneNumber": "+44 20 7946 0000"
        },
        "permissions": {
            "optInEmail": true,
            "optInPhone": false,
            "optInSms": false,
            "optInPost": true
        },
        "form": [
            {"key": "favouriteColour", "value": "green"},
            {"key": "heardAboutUs", "value": "radio"}
        ],
        "tags": [
            {"key": "source", "value": "landing-page"}
        ]
    })
}

/// [`valid_entry_json`] serialized as a request body.
#[must_use]
pub fn valid_entry_body() -> Bytes {
    Bytes::from(valid_entry_json().to_string())
}

/// A body that passes the schema but fails semantic validation on the
/// campaign name and the entrant's title.
#[must_use]
pub fn blank_fields_body() -> Bytes {
    let mut doc = valid_entry_json();
    doc["campaignName"] = json!("");
    doc["entrant"]["title"] = json!("");
    Bytes::from(doc.to_string())
}
