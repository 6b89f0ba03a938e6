//! Persistence port.
//!
//! The pipeline depends only on the [`EntryStore`] trait. Concrete stores live
//! in the `capture-store` crate; tests substitute their own implementations.

use crate::entry::Entry;
use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

/// A boxed, sendable future.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Errors reported by a storage backend.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The store was closed before the save was attempted.
    #[error("store is closed")]
    Closed,

    /// The entry could not be encoded for storage.
    #[error("failed to encode entry: {0}")]
    Encode(#[from] serde_json::Error),

    /// The backend rejected the operation.
    #[error("storage backend error: {message}")]
    Backend {
        /// Backend-specific message.
        message: String,
    },

    /// The store could not be opened from its configuration.
    #[error("invalid store configuration: {0}")]
    Config(String),
}

impl StoreError {
    /// Creates a backend error.
    #[must_use]
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend {
            message: message.into(),
        }
    }
}

/// Abstract persistence contract consumed by the capture handler.
///
/// `save` is called exactly once per validated entry. Failures are reported,
/// never retried. `close` is called once when the process shuts down.
pub trait EntryStore: Send + Sync + 'static {
    /// Short backend name used in logs.
    fn name(&self) -> &'static str;

    /// Persists one validated entry.
    fn save<'a>(&'a self, entry: &'a Entry) -> BoxFuture<'a, Result<(), StoreError>>;

    /// Releases backend resources.
    fn close(&self);
}
