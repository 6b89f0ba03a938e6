//! HTTP Basic authentication gate.
//!
//! Accepts `Authorization: Basic <base64(username:password)>` and nothing
//! else. Every failure (missing header, wrong scheme, bad encoding, missing
//! separator, wrong credentials) produces the same 401 so clients cannot
//! tell them apart. The specific reason is logged.

use crate::{
    context::MiddlewareContext,
    middleware::{BoxFuture, Middleware, Next},
    types::{Request, Response},
};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use capture_core::{CaptureError, CaptureResult};
use http::header::AUTHORIZATION;

/// The single username/password pair the service accepts.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    username: String,
    password: String,
}

impl Credentials {
    /// Creates a credential pair.
    #[must_use]
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Returns the username.
    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Returns the `Authorization` header value for these credentials.
    ///
    /// # Example
    ///
    /// ```
    /// use capture_middleware::stages::Credentials;
    ///
    /// let creds = Credentials::new("user", "pass");
    /// assert_eq!(creds.header_value(), "Basic dXNlcjpwYXNz");
    /// ```
    #[must_use]
    pub fn header_value(&self) -> String {
        let raw = format!("{}:{}", self.username, self.password);
        format!("Basic {}", STANDARD.encode(raw))
    }

    fn matches(&self, username: &str, password: &str) -> bool {
        self.username == username && self.password == password
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Rejects requests without the configured Basic credentials.
#[derive(Debug, Clone)]
pub struct AuthMiddleware {
    credentials: Credentials,
}

impl AuthMiddleware {
    /// Creates the gate for a credential pair.
    #[must_use]
    pub fn new(credentials: Credentials) -> Self {
        Self { credentials }
    }

    /// Checks the request's `Authorization` header, returning the username.
    fn authenticate(&self, request: &Request) -> Result<String, &'static str> {
        let header = request
            .headers()
            .get(AUTHORIZATION)
            .ok_or("missing authorization header")?
            .to_str()
            .map_err(|_| "authorization header is not ASCII")?;

        let (scheme, encoded) = header.split_once(' ').ok_or("malformed authorization header")?;
        if scheme != "Basic" {
            return Err("unsupported authorization scheme");
        }

        let decoded = STANDARD
            .decode(encoded)
            .map_err(|_| "invalid base64 credentials")?;
        let decoded = String::from_utf8(decoded).map_err(|_| "credentials are not UTF-8")?;
        let (username, password) = decoded.split_once(':').ok_or("missing credential separator")?;

        if self.credentials.matches(username, password) {
            Ok(username.to_string())
        } else {
            Err("credential mismatch")
        }
    }
}

impl Middleware for AuthMiddleware {
    fn name(&self) -> &'static str {
        "auth"
    }

    fn process<'a>(
        &'a self,
        ctx: &'a mut MiddlewareContext,
        request: Request,
        next: Next<'a>,
    ) -> BoxFuture<'a, CaptureResult<Response>> {
        Box::pin(async move {
            match self.authenticate(&request) {
                Ok(username) => {
                    ctx.set_username(username);
                    next.run(ctx, request).await
                }
                Err(reason) => {
                    tracing::warn!(request_id = %ctx.request_id(), reason, "rejected credentials");
                    Err(CaptureError::unauthorized(reason))
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ResponseExt;
    use crate::types::full_body;
    use http::{Method, Request as HttpRequest, StatusCode};

    fn gate() -> AuthMiddleware {
        AuthMiddleware::new(Credentials::new("user", "pass"))
    }

    fn request(auth: Option<&str>) -> Request {
        let mut builder = HttpRequest::builder().method(Method::POST).uri("/campaign");
        if let Some(value) = auth {
            builder = builder.header(AUTHORIZATION, value);
        }
        builder.body(full_body("")).unwrap()
    }

    fn ok<'a>() -> Next<'a> {
        Next::handler(|_ctx, _req| Box::pin(async { Ok(Response::success("id")) }))
    }

    fn basic(raw: &str) -> String {
        format!("Basic {}", STANDARD.encode(raw))
    }

    #[tokio::test]
    async fn test_valid_credentials_pass() {
        let mut ctx = MiddlewareContext::new();
        let header = Credentials::new("user", "pass").header_value();
        let response = gate()
            .process(&mut ctx, request(Some(&header)), ok())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(ctx.username(), Some("user"));
    }

    #[tokio::test]
    async fn test_password_may_contain_colon() {
        let gate = AuthMiddleware::new(Credentials::new("user", "p:ss"));
        let mut ctx = MiddlewareContext::new();
        let result = gate
            .process(&mut ctx, request(Some(&basic("user:p:ss"))), ok())
            .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_every_failure_is_the_same_401() {
        let wrong_user = basic("admin:pass");
        let wrong_pass = basic("user:secret");
        let no_separator = basic("userpass");
        let cases: [Option<&str>; 7] = [
            None,
            Some("Bearer abc"),
            Some("Basic"),
            Some("Basic !!!not-base64"),
            Some(&wrong_user),
            Some(&wrong_pass),
            Some(&no_separator),
        ];

        for auth in cases {
            let mut ctx = MiddlewareContext::new();
            let err = gate().process(&mut ctx, request(auth), ok()).await.unwrap_err();
            assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED, "{auth:?}");
            assert_eq!(err.messages(), vec!["Unauthorized".to_string()]);
            assert!(ctx.username().is_none());
        }
    }

    #[test]
    fn test_debug_redacts_password() {
        let rendered = format!("{:?}", Credentials::new("user", "hunter2"));
        assert!(!rendered.contains("hunter2"));
    }
}
