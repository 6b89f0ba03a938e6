//! Structural validation of raw submissions.
//!
//! The entry schema (JSON Schema draft-04) is embedded at compile time and
//! compiled once. Validation reports every violation, each prefixed with the
//! dotted path of the offending value:
//!
//! ```text
//! campaignName: 100 is not of type "string"
//! form[0]: "value" is a required property
//! (root): 'foo' is not allowed
//! ```
//!
//! Every unexpected property is its own violation, even when several appear
//! on the same object.

use jsonschema::error::ValidationErrorKind;
use jsonschema::{Draft, JSONSchema};
use serde_json::Value;
use thiserror::Error;

const ENTRY_SCHEMA: &str = include_str!("schemas/entry.schema.json");

/// Path label used for violations on the document itself.
const ROOT_PATH: &str = "(root)";

/// Errors loading the embedded schema.
#[derive(Error, Debug)]
pub enum SchemaError {
    /// The schema text is not valid JSON.
    #[error("failed to parse entry schema: {0}")]
    Parse(#[from] serde_json::Error),

    /// The schema is not a valid draft-04 schema.
    #[error("failed to compile entry schema: {0}")]
    Compile(String),
}

/// Compiled entry schema.
pub struct SchemaValidator {
    schema: JSONSchema,
}

impl SchemaValidator {
    /// Compiles the embedded entry schema.
    pub fn new() -> Result<Self, SchemaError> {
        let document: Value = serde_json::from_str(ENTRY_SCHEMA)?;
        let schema = JSONSchema::options()
            .with_draft(Draft::Draft4)
            .compile(&document)
            .map_err(|e| SchemaError::Compile(e.to_string()))?;
        Ok(Self { schema })
    }

    /// Validates a parsed document, returning every violation on failure.
    pub fn validate(&self, document: &Value) -> Result<(), Vec<String>> {
        let result = self.schema.validate(document);
        match result {
            Ok(()) => Ok(()),
            Err(errors) => {
                let mut violations = Vec::new();
                for e in errors {
                    let path = dotted_path(&e.instance_path.to_string());
                    match &e.kind {
                        ValidationErrorKind::AdditionalProperties { unexpected } => violations
                            .extend(unexpected.iter().map(|name| format!("{path}: '{name}' is not allowed"))),
                        _ => violations.push(format!("{path}: {e}")),
                    }
                }
                Err(violations)
            }
        }
    }
}

impl std::fmt::Debug for SchemaValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchemaValidator").finish_non_exhaustive()
    }
}

/// Converts a JSON pointer (`/form/0/key`) to a dotted path (`form[0].key`).
fn dotted_path(pointer: &str) -> String {
    let mut out = String::new();
    for segment in pointer.split('/').skip(1) {
        let segment = segment.replace("~1", "/").replace("~0", "~");
        if !segment.is_empty() && segment.bytes().all(|b| b.is_ascii_digit()) {
            out.push('[');
            out.push_str(&segment);
            out.push(']');
        } else {
            if !out.is_empty() {
                out.push('.');
            }
            out.push_str(&segment);
        }
    }
    if out.is_empty() {
        ROOT_PATH.to_string()
    } else {
        out
    }
}
