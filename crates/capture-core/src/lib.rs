//! # Capture Core
//!
//! Core types for the campaign entry capture service.
//!
//! - [`Entry`] - A submission, with [`Entrant`], [`Perms`], and [`EntryItem`]
//! - [`Validate`] - Exhaustive, path-prefixed semantic validation
//! - [`SchemaValidator`] - Structural validation against the embedded schema
//! - [`CaptureError`] - Pipeline error with status mapping
//! - [`EntryStore`] - Persistence port
//! - [`ErrorEnvelope`] / [`SuccessEnvelope`] - Response bodies

#![doc(html_root_url = "https://docs.rs/capture-core/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod context;
pub mod entry;
pub mod envelope;
mod error;
pub mod fixtures;
pub mod schema;
pub mod store;
pub mod validate;

pub use context::RequestId;
pub use entry::{Entrant, Entry, EntryItem, Perms, PublicId, SubmitAction};
pub use envelope::{ErrorEnvelope, SuccessEnvelope};
pub use error::{CaptureError, CaptureResult, ErrorCategory, INTERNAL_ERROR_MESSAGE};
pub use schema::{SchemaError, SchemaValidator};
pub use store::{BoxFuture, EntryStore, StoreError};
pub use validate::{Validate, Violations};
