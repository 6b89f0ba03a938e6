//! The campaign entry data model.
//!
//! An [`Entry`] is one submission: campaign metadata, the entrant's contact
//! details, marketing permissions, and free-form key/value items. It is built
//! once per request by [`Entry::construct`] (or [`Entry::from_json`]), which
//! also assigns its [`PublicId`]. Decoding does not check field presence;
//! that is the job of [`Validate`].

use crate::error::{CaptureError, CaptureResult};
use crate::validate::{join, Validate, Violations};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};
use std::fmt;

/// Number of digest bytes kept in a [`PublicId`].
const PUBLIC_ID_BYTES: usize = 16;

/// Externally visible entry identifier.
///
/// Derived from the entrant's email address and the construction time. It is
/// an opaque correlation handle, not a security token.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct PublicId(String);

impl PublicId {
    /// Derives an identifier from an email address and a timestamp.
    ///
    /// The same inputs always produce the same identifier.
    #[must_use]
    pub fn derive(email: &str, at: DateTime<Utc>) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(email.as_bytes());
        hasher.update(at.to_rfc3339_opts(SecondsFormat::Nanos, true).as_bytes());
        let digest = hasher.finalize();
        Self(hex::encode(&digest[..PUBLIC_ID_BYTES]))
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PublicId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// What the campaign should do with the entry once stored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SubmitAction {
    /// Send a confirmation email.
    Email,
    /// Store only.
    Store,
    /// No action given.
    #[default]
    Unspecified,
}

impl SubmitAction {
    /// Returns the canonical lowercase form.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Email => "email",
            Self::Store => "store",
            Self::Unspecified => "",
        }
    }

    /// Parses a submit action, ignoring ASCII case.
    pub fn parse(raw: &str) -> Result<Self, String> {
        match raw.to_ascii_lowercase().as_str() {
            "email" => Ok(Self::Email),
            "store" => Ok(Self::Store),
            "" => Ok(Self::Unspecified),
            _ => Err(format!(
                "submitAction must be one of 'email' or 'store', found '{raw}'"
            )),
        }
    }
}

impl Serialize for SubmitAction {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for SubmitAction {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

/// A single campaign submission.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Entry {
    /// Campaign reference name.
    pub campaign_name: String,
    /// Campaign semantic version.
    pub campaign_version: String,
    /// Browser session hash, if the client sent one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_fingerprint: Option<String>,
    /// Action to take after storing.
    pub submit_action: SubmitAction,
    /// The person submitting the entry.
    pub entrant: Entrant,
    /// Marketing contact permissions.
    pub permissions: Perms,
    /// Question and answer pairs.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub form: Vec<EntryItem>,
    /// Arbitrary extra key/value pairs.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<EntryItem>,
    #[serde(rename = "entryId", skip_deserializing)]
    public_id: PublicId,
}

impl Entry {
    /// Decodes a raw request body and assigns a public identifier.
    ///
    /// # Example
    ///
    /// ```
    /// use capture_core::Entry;
    ///
    /// let body = br#"{"campaignName":"spring","campaignVersion":"1.0.0",
    ///     "entrant":{"title":"Dr","firstName":"Ada","lastName":"Lovelace",
    ///     "emailAddress":"ada@example.com"},"form":[]}"#;
    /// let entry = Entry::construct(body).unwrap();
    /// assert_eq!(entry.campaign_name, "spring");
    /// assert!(!entry.public_id().as_str().is_empty());
    /// ```
    pub fn construct(body: &[u8]) -> CaptureResult<Self> {
        let value: serde_json::Value = serde_json::from_slice(body)
            .map_err(|e| CaptureError::malformed_body(e.to_string()))?;
        Self::from_json(value)
    }

    /// Decodes an already-parsed JSON document and assigns a public identifier.
    pub fn from_json(value: serde_json::Value) -> CaptureResult<Self> {
        Self::from_json_at(value, Utc::now())
    }

    /// Decodes `value` with an explicit construction time.
    pub fn from_json_at(value: serde_json::Value, at: DateTime<Utc>) -> CaptureResult<Self> {
        let mut entry: Self =
            serde_json::from_value(value).map_err(|e| CaptureError::decode(e.to_string()))?;
        entry.public_id = PublicId::derive(&entry.entrant.email_address, at);
        Ok(entry)
    }

    /// Returns the identifier assigned at construction.
    #[must_use]
    pub fn public_id(&self) -> &PublicId {
        &self.public_id
    }
}

impl Validate for Entry {
    fn validate_into(&self, path: &str, out: &mut Violations) {
        out.require_non_empty(path, "campaignName", &self.campaign_name);
        out.require_non_empty(path, "campaignVersion", &self.campaign_version);
        self.entrant.validate_into(&join(path, "entrant"), out);
        self.permissions.validate_into(&join(path, "permissions"), out);
        for (i, item) in self.form.iter().enumerate() {
            item.validate_into(&format!("{}[{i}]", join(path, "form")), out);
        }
        for (i, item) in self.tags.iter().enumerate() {
            item.validate_into(&format!("{}[{i}]", join(path, "tags")), out);
        }
    }
}

/// Name and contact information for the person submitting an entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Entrant {
    /// Honorific.
    pub title: String,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Free-form date of birth.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<String>,
    /// Free-form phone number.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    /// Contact email, also the input to the public identifier.
    pub email_address: String,
}

impl Validate for Entrant {
    fn validate_into(&self, path: &str, out: &mut Violations) {
        out.require_non_empty(path, "title", &self.title);
        out.require_non_empty(path, "firstName", &self.first_name);
        out.require_non_empty(path, "lastName", &self.last_name);
        out.require_non_empty(path, "emailAddress", &self.email_address);
    }
}

/// Marketing opt-in flags captured with the entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Perms {
    /// Email marketing.
    pub opt_in_email: bool,
    /// Telephone marketing.
    pub opt_in_phone: bool,
    /// SMS marketing.
    pub opt_in_sms: bool,
    /// Postal marketing.
    pub opt_in_post: bool,
}

impl Validate for Perms {
    // Every combination of flags is acceptable.
    fn validate_into(&self, _path: &str, _out: &mut Violations) {}
}

/// A key/value pair from the form or tag lists.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EntryItem {
    /// Question or tag name.
    pub key: String,
    /// Answer or tag value.
    pub value: String,
}

impl EntryItem {
    /// Creates an item.
    #[must_use]
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

impl Validate for EntryItem {
    fn validate_into(&self, path: &str, out: &mut Violations) {
        out.require_non_empty(path, "key", &self.key);
        out.require_non_empty(path, "value", &self.value);
    }
}
