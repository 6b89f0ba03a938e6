//! Recovery gate.
//!
//! The outermost gate. It is the only place that turns a failure into a
//! response:
//!
//! - `Err(CaptureError)` from any deeper gate or the handler is rendered as
//!   an error envelope, with the status taken from the error's category.
//! - A panic anywhere deeper is caught, logged, and rendered as a 500 with
//!   `["Internal Server Error"]`.
//!
//! Server-side failures are logged at error level with the request ID
//! before the response is returned.

use crate::{
    context::MiddlewareContext,
    middleware::{BoxFuture, Middleware, Next},
    types::{Request, Response, ResponseExt},
};
use capture_core::{CaptureError, CaptureResult};
use futures_util::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;

/// Catches panics and renders every error as a JSON envelope.
#[derive(Debug, Clone, Copy, Default)]
pub struct RecoveryMiddleware;

impl RecoveryMiddleware {
    /// Creates the gate.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

/// Extracts a readable message from a panic payload.
///
/// Handles `&str` and `String` messages, boxed errors, and [`CaptureError`]
/// values raised with `std::panic::panic_any`. Anything else is reported as
/// an unknown error.
pub fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else if let Some(e) = payload.downcast_ref::<Box<dyn std::error::Error + Send + Sync>>() {
        e.to_string()
    } else if let Some(e) = payload.downcast_ref::<CaptureError>() {
        e.to_string()
    } else {
        "Unknown error".to_string()
    }
}

impl Middleware for RecoveryMiddleware {
    fn name(&self) -> &'static str {
        "recovery"
    }

    fn process<'a>(
        &'a self,
        ctx: &'a mut MiddlewareContext,
        request: Request,
        next: Next<'a>,
    ) -> BoxFuture<'a, CaptureResult<Response>> {
        Box::pin(async move {
            let request_id = ctx.request_id();
            let outcome = AssertUnwindSafe(next.run(ctx, request))
                .catch_unwind()
                .await;

            let err = match outcome {
                Ok(Ok(response)) => return Ok(response),
                Ok(Err(err)) => err,
                Err(payload) => CaptureError::unexpected(format!(
                    "panic: {}",
                    panic_message(&*payload)
                )),
            };

            if err.category().is_server_error() {
                tracing::error!(
                    request_id = %request_id,
                    category = ?err.category(),
                    error = %err,
                    "request failed"
                );
            } else {
                tracing::debug!(
                    request_id = %request_id,
                    status = err.status_code().as_u16(),
                    error = %err,
                    "request rejected"
                );
            }

            Ok(Response::from_error(&err))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::full_body;
    use capture_core::{StoreError, INTERNAL_ERROR_MESSAGE};
    use http::{Request as HttpRequest, StatusCode};
    use http_body_util::BodyExt;

    fn request() -> Request {
        HttpRequest::builder()
            .uri("/campaign")
            .body(full_body(""))
            .unwrap()
    }

    async fn messages(response: Response) -> Vec<String> {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        serde_json::from_value(value["messages"].clone()).unwrap()
    }

    #[tokio::test]
    async fn test_passes_success_through() {
        let mut ctx = MiddlewareContext::new();
        let next = Next::handler(|_ctx, _req| Box::pin(async { Ok(Response::success("abc")) }));
        let response = RecoveryMiddleware::new()
            .process(&mut ctx, request(), next)
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_renders_client_errors() {
        let mut ctx = MiddlewareContext::new();
        let next = Next::handler(|_ctx, _req| {
            Box::pin(async {
                Err(CaptureError::Validation {
                    violations: vec!["a".to_string(), "b".to_string()],
                })
            })
        });
        let response = RecoveryMiddleware::new()
            .process(&mut ctx, request(), next)
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(messages(response).await, ["a", "b"]);
    }

    #[tokio::test]
    async fn test_hides_persistence_detail() {
        let mut ctx = MiddlewareContext::new();
        let next = Next::handler(|_ctx, _req| {
            Box::pin(async { Err(CaptureError::persistence(StoreError::backend("disk full"))) })
        });
        let response = RecoveryMiddleware::new()
            .process(&mut ctx, request(), next)
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(messages(response).await, [INTERNAL_ERROR_MESSAGE]);
    }

    #[tokio::test]
    async fn test_catches_panic_in_handler() {
        let mut ctx = MiddlewareContext::new();
        let next = Next::handler(|_ctx, _req| {
            Box::pin(async {
                let items: Vec<u8> = Vec::new();
                if items.is_empty() {
                    panic!("boom");
                }
                Ok(Response::success("unreachable"))
            })
        });
        let response = RecoveryMiddleware::new()
            .process(&mut ctx, request(), next)
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(messages(response).await, [INTERNAL_ERROR_MESSAGE]);
    }

    #[test]
    fn test_panic_message_classification() {
        let s: Box<dyn Any + Send> = Box::new("static message");
        assert_eq!(panic_message(&*s), "static message");

        let s: Box<dyn Any + Send> = Box::new(String::from("owned message"));
        assert_eq!(panic_message(&*s), "owned message");

        let e: Box<dyn Any + Send> = Box::new(CaptureError::unexpected("typed"));
        assert!(panic_message(&*e).contains("typed"));

        let other: Box<dyn Any + Send> = Box::new(42_u32);
        assert_eq!(panic_message(&*other), "Unknown error");
    }
}
