//! Request-scoped state carried through the gates.
//!
//! The validated [`Entry`] travels from the validation gate to the handler
//! in a typed slot rather than an untyped extension map.

use capture_core::{Entry, RequestId};
use std::time::{Duration, Instant};

/// Context that flows through the pipeline for one request.
///
/// # Example
///
/// ```
/// use capture_middleware::MiddlewareContext;
///
/// let mut ctx = MiddlewareContext::new();
/// assert!(ctx.entry().is_none());
/// assert!(ctx.take_entry().is_none());
/// ```
#[derive(Debug)]
pub struct MiddlewareContext {
    request_id: RequestId,
    started_at: Instant,
    username: Option<String>,
    entry: Option<Entry>,
    visited: Vec<&'static str>,
}

impl MiddlewareContext {
    /// Creates a context with a fresh request ID.
    #[must_use]
    pub fn new() -> Self {
        Self::with_request_id(RequestId::new())
    }

    /// Creates a context with a specific request ID.
    #[must_use]
    pub fn with_request_id(request_id: RequestId) -> Self {
        Self {
            request_id,
            started_at: Instant::now(),
            username: None,
            entry: None,
            visited: Vec::new(),
        }
    }

    /// Returns the request ID.
    #[must_use]
    pub fn request_id(&self) -> RequestId {
        self.request_id
    }

    /// Returns the elapsed time since the request started.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.started_at.elapsed()
    }

    /// Returns the authenticated username, if the auth gate has passed.
    #[must_use]
    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    /// Records the authenticated username.
    pub fn set_username(&mut self, username: impl Into<String>) {
        self.username = Some(username.into());
    }

    /// Borrows the validated entry, if any.
    #[must_use]
    pub fn entry(&self) -> Option<&Entry> {
        self.entry.as_ref()
    }

    /// Stores the validated entry for the handler.
    pub fn set_entry(&mut self, entry: Entry) {
        self.entry = Some(entry);
    }

    /// Moves the validated entry out of the context.
    pub fn take_entry(&mut self) -> Option<Entry> {
        self.entry.take()
    }

    /// Records that a stage ran.
    pub fn record_stage(&mut self, name: &'static str) {
        self.visited.push(name);
    }

    /// Names of the stages that ran, in order.
    #[must_use]
    pub fn visited(&self) -> &[&'static str] {
        &self.visited
    }
}

impl Default for MiddlewareContext {
    fn default() -> Self {
        Self::new()
    }
}
