//! Request and response types used by the gates.

use bytes::Bytes;
use capture_core::{CaptureError, ErrorEnvelope, SuccessEnvelope};
use http::header::{HeaderValue, CONTENT_TYPE};
use http::StatusCode;
use http_body_util::combinators::UnsyncBoxBody;
use http_body_util::{BodyExt, Full};
use hyper::body::Body;
use serde::Serialize;
use std::convert::Infallible;

/// Error type of a request body stream.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Unread request body. Only the validation gate buffers it.
pub type RequestBody = UnsyncBoxBody<Bytes, BoxError>;

/// The HTTP request type used in the pipeline.
pub type Request = http::Request<RequestBody>;

/// The HTTP response type used in the pipeline.
pub type Response = http::Response<Full<Bytes>>;

/// Erases the type of a streaming body.
pub fn boxed_body<B>(body: B) -> RequestBody
where
    B: Body<Data = Bytes> + Send + 'static,
    B::Error: Into<BoxError>,
{
    body.map_err(Into::into).boxed_unsync()
}

/// Wraps already-buffered bytes as a request body.
pub fn full_body(bytes: impl Into<Bytes>) -> RequestBody {
    Full::new(bytes.into())
        .map_err(|never: Infallible| -> BoxError { match never {} })
        .boxed_unsync()
}

/// Content type of every response.
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// Extension trait for building JSON envelope responses.
pub trait ResponseExt {
    /// Creates a JSON response with the given status.
    fn json<T: Serialize>(status: StatusCode, body: &T) -> Response;

    /// Creates the error envelope response for `error`.
    fn from_error(error: &CaptureError) -> Response;

    /// Creates the 200 response carrying the stored entry's identifier.
    fn success(entry_id: &str) -> Response;
}

impl ResponseExt for Response {
    fn json<T: Serialize>(status: StatusCode, body: &T) -> Response {
        let (status, bytes) = match serde_json::to_vec(body) {
            Ok(bytes) => (status, Bytes::from(bytes)),
            // Envelopes are plain structs of strings and integers.
            Err(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Bytes::from_static(br#"{"status":500,"messages":["Internal Server Error"]}"#),
            ),
        };

        let mut response = http::Response::new(Full::new(bytes));
        *response.status_mut() = status;
        response
            .headers_mut()
            .insert(CONTENT_TYPE, HeaderValue::from_static(JSON_CONTENT_TYPE));
        response
    }

    fn from_error(error: &CaptureError) -> Response {
        let envelope: ErrorEnvelope = error.to_envelope();
        Self::json(error.status_code(), &envelope)
    }

    fn success(entry_id: &str) -> Response {
        Self::json(StatusCode::OK, &SuccessEnvelope::new(entry_id))
    }
}
