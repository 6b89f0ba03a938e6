//! Content validation gate.
//!
//! This is the only gate that reads the request body. It buffers at most
//! [`BodyLimits::max_bytes`] within [`BodyLimits::read_timeout`], then runs
//! four checks, stopping at the first that fails:
//!
//! 1. The body is readable and non-empty (`Bad request`).
//! 2. The body is valid JSON (single parser message).
//! 3. The document matches the entry schema (every violation).
//! 4. The document decodes into an [`Entry`] that passes semantic
//!    validation (decoder message, or every violation).
//!
//! On success the entry is placed in the context for the handler. The body
//! bytes are shared with the forwarded request, not copied.

use crate::{
    context::MiddlewareContext,
    middleware::{BoxFuture, Middleware, Next},
    types::{full_body, BoxError, Request, RequestBody, Response},
};
use bytes::Bytes;
use capture_core::{CaptureError, CaptureResult, Entry, SchemaValidator, Validate};
use http_body_util::{BodyExt, Collected, Limited};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

/// Message for a request with no readable body.
const BAD_BODY_MESSAGE: &str = "Bad request";

/// Bounds on reading a request body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BodyLimits {
    /// Largest accepted body, in bytes.
    pub max_bytes: usize,
    /// Time allowed to receive the whole body.
    pub read_timeout: Duration,
}

impl Default for BodyLimits {
    fn default() -> Self {
        Self {
            max_bytes: 1024 * 1024,
            read_timeout: Duration::from_secs(30),
        }
    }
}

/// Validates the submission and hands the decoded entry to the handler.
#[derive(Debug, Clone)]
pub struct ValidationMiddleware {
    schema: Arc<SchemaValidator>,
    limits: BodyLimits,
}

impl ValidationMiddleware {
    /// Creates the gate around a compiled schema with default body limits.
    #[must_use]
    pub fn new(schema: Arc<SchemaValidator>) -> Self {
        Self::with_limits(schema, BodyLimits::default())
    }

    /// Creates the gate with explicit body limits.
    #[must_use]
    pub fn with_limits(schema: Arc<SchemaValidator>, limits: BodyLimits) -> Self {
        Self { schema, limits }
    }

    /// Buffers `body`, refusing it if it is too large, broken, or slow.
    pub async fn read_body(&self, body: RequestBody) -> CaptureResult<Bytes> {
        let limited = Limited::new(body, self.limits.max_bytes);
        // Type-erase the collect future so its `Send`-ness is checked here
        // with concrete lifetimes rather than inside the boxed middleware future.
        let collect: Pin<
            Box<dyn Future<Output = Result<Collected<Bytes>, BoxError>> + Send>,
        > = Box::pin(limited.collect());
        match tokio::time::timeout(self.limits.read_timeout, collect).await {
            Ok(Ok(collected)) => Ok(collected.to_bytes()),
            Ok(Err(e)) => {
                tracing::debug!(error = %e, "failed to read request body");
                Err(CaptureError::bad_request(BAD_BODY_MESSAGE))
            }
            Err(_) => {
                tracing::warn!(timeout = ?self.limits.read_timeout, "request body timed out");
                Err(CaptureError::bad_request(BAD_BODY_MESSAGE))
            }
        }
    }

    /// Runs every check against `body`, producing the validated entry.
    pub fn check(&self, body: &[u8]) -> CaptureResult<Entry> {
        if body.is_empty() {
            return Err(CaptureError::bad_request(BAD_BODY_MESSAGE));
        }

        let document: serde_json::Value = serde_json::from_slice(body)
            .map_err(|e| CaptureError::malformed_body(e.to_string()))?;

        self.schema
            .validate(&document)
            .map_err(|violations| CaptureError::Schema { violations })?;

        let entry = Entry::from_json(document)?;
        entry.validate().map_err(|violations| CaptureError::Validation {
            violations: violations.into_vec(),
        })?;

        Ok(entry)
    }
}

impl Middleware for ValidationMiddleware {
    fn name(&self) -> &'static str {
        "validation"
    }

    fn process<'a>(
        &'a self,
        ctx: &'a mut MiddlewareContext,
        request: Request,
        next: Next<'a>,
    ) -> BoxFuture<'a, CaptureResult<Response>> {
        Box::pin(async move {
            let (parts, body) = request.into_parts();
            let bytes = self.read_body(body).await?;

            let entry = self.check(&bytes)?;
            tracing::debug!(
                request_id = %ctx.request_id(),
                entry_id = %entry.public_id(),
                campaign = %entry.campaign_name,
                "entry validated"
            );
            ctx.set_entry(entry);

            let request = Request::from_parts(parts, full_body(bytes));
            next.run(ctx, request).await
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ResponseExt;
    use capture_core::{fixtures, ErrorCategory};
    use crate::types::boxed_body;
    use http::{Method, Request as HttpRequest, StatusCode};
    use http_body_util::StreamBody;
    use hyper::body::Frame;
    use serde_json::json;

    fn gate() -> ValidationMiddleware {
        ValidationMiddleware::new(Arc::new(SchemaValidator::new().unwrap()))
    }

    fn request(body: impl Into<Bytes>) -> Request {
        HttpRequest::builder()
            .method(Method::POST)
            .uri("/campaign")
            .body(full_body(body))
            .unwrap()
    }

    fn echo_entry_id<'a>() -> Next<'a> {
        Next::handler(|ctx, _req| {
            let id = ctx.take_entry().map(|e| e.public_id().to_string());
            Box::pin(async move {
                let id = id.ok_or_else(|| CaptureError::unexpected("no entry"))?;
                Ok(Response::success(&id))
            })
        })
    }

    #[tokio::test]
    async fn test_valid_entry_reaches_handler() {
        let mut ctx = MiddlewareContext::new();
        let response = gate()
            .process(&mut ctx, request(fixtures::valid_entry_body()), echo_entry_id())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_empty_body() {
        let mut ctx = MiddlewareContext::new();
        let err = gate()
            .process(&mut ctx, request(Bytes::new()), echo_entry_id())
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.messages(), vec!["Bad request".to_string()]);
    }

    #[tokio::test]
    async fn test_oversized_body_is_bad_request() {
        let gate = ValidationMiddleware::with_limits(
            Arc::new(SchemaValidator::new().unwrap()),
            BodyLimits {
                max_bytes: 16,
                read_timeout: Duration::from_secs(5),
            },
        );
        let mut ctx = MiddlewareContext::new();
        let err = gate
            .process(&mut ctx, request(fixtures::valid_entry_body()), echo_entry_id())
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.messages(), vec!["Bad request".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stalled_body_times_out() {
        let gate = ValidationMiddleware::with_limits(
            Arc::new(SchemaValidator::new().unwrap()),
            BodyLimits {
                max_bytes: 1024,
                read_timeout: Duration::from_millis(50),
            },
        );
        let stalled = StreamBody::new(futures_util::stream::pending::<
            Result<Frame<Bytes>, std::convert::Infallible>,
        >());
        let err = gate.read_body(boxed_body(stalled)).await.unwrap_err();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_malformed_json_is_single_message() {
        let err = gate().check(b"{\"campaignName\": ").unwrap_err();
        assert!(matches!(err, CaptureError::MalformedBody { .. }));
        assert_eq!(err.messages().len(), 1);
    }

    #[test]
    fn test_schema_violations_all_reported() {
        let mut doc = fixtures::valid_entry_json();
        doc["campaignName"] = json!(100);
        doc["extra"] = json!("x");
        let err = gate().check(doc.to_string().as_bytes()).unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Schema);
        assert_eq!(err.messages().len(), 2);
    }

    #[test]
    fn test_semantic_violations_all_reported() {
        let err = gate().check(&fixtures::blank_fields_body()).unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Validation);
        assert_eq!(
            err.messages(),
            vec![
                "campaignName is a required field".to_string(),
                "entrant.title is a required field".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_failed_validation_never_reaches_handler() {
        let mut ctx = MiddlewareContext::new();
        let result = gate()
            .process(&mut ctx, request(fixtures::blank_fields_body()), echo_entry_id())
            .await;
        assert!(result.is_err());
        assert!(ctx.entry().is_none());
    }

    #[test]
    fn test_upper_case_submit_action_fails_schema() {
        let mut doc = fixtures::valid_entry_json();
        doc["submitAction"] = json!("Email");
        let err = gate().check(doc.to_string().as_bytes()).unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Schema);
    }
}
