//! POST-only gate.
//!
//! Runs before authentication and never looks at the body, so a wrong method
//! is reported as 405 whatever the credentials or payload.

use crate::{
    context::MiddlewareContext,
    middleware::{BoxFuture, Middleware, Next},
    types::{Request, Response},
};
use capture_core::{CaptureError, CaptureResult};
use http::Method;

/// Rejects every request whose method is not POST.
#[derive(Debug, Clone, Copy, Default)]
pub struct MethodMiddleware;

impl MethodMiddleware {
    /// Creates the gate.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Middleware for MethodMiddleware {
    fn name(&self) -> &'static str {
        "method"
    }

    fn process<'a>(
        &'a self,
        ctx: &'a mut MiddlewareContext,
        request: Request,
        next: Next<'a>,
    ) -> BoxFuture<'a, CaptureResult<Response>> {
        Box::pin(async move {
            if request.method() != Method::POST {
                tracing::debug!(
                    request_id = %ctx.request_id(),
                    method = %request.method(),
                    "rejected method"
                );
                return Err(CaptureError::method_not_allowed(request.method().as_str()));
            }
            next.run(ctx, request).await
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ResponseExt;
    use crate::types::full_body;
    use http::{Request as HttpRequest, StatusCode};

    fn request(method: Method) -> Request {
        HttpRequest::builder()
            .method(method)
            .uri("/campaign")
            .body(full_body("{}"))
            .unwrap()
    }

    fn ok<'a>() -> Next<'a> {
        Next::handler(|_ctx, _req| Box::pin(async { Ok(Response::success("id")) }))
    }

    #[tokio::test]
    async fn test_post_passes() {
        let gate = MethodMiddleware::new();
        let mut ctx = MiddlewareContext::new();
        let response = gate
            .process(&mut ctx, request(Method::POST), ok())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_other_methods_rejected() {
        let gate = MethodMiddleware::new();
        for method in [Method::GET, Method::PUT, Method::PATCH, Method::DELETE, Method::HEAD] {
            let mut ctx = MiddlewareContext::new();
            let err = gate
                .process(&mut ctx, request(method.clone()), ok())
                .await
                .unwrap_err();
            assert_eq!(err.status_code(), StatusCode::METHOD_NOT_ALLOWED, "{method}");
            assert_eq!(err.messages(), vec!["Method not allowed".to_string()]);
        }
    }
}
