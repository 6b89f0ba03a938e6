//! Per-request routing and the capture handler.

use std::sync::Arc;
use std::time::Instant;

use bytes::Bytes;
use capture_config::CaptureConfig;
use capture_core::{CaptureError, EntryStore, RequestId, SchemaValidator};
use capture_middleware::{
    boxed_body, BodyLimits, BoxError, Credentials, MiddlewareContext, Pipeline, Request,
    Response, ResponseExt,
};
use capture_telemetry::log_request_complete;
use http::{Method, StatusCode};
use hyper::body::Body;

use crate::health::HealthCheck;
use crate::ServerError;

const HEALTH_PATH: &str = "/health";
const REQUEST_ID_HEADER: &str = "x-request-id";

/// Everything needed to answer one request.
///
/// The server shares one instance across all connections.
pub struct CaptureService {
    pipeline: Pipeline,
    store: Arc<dyn EntryStore>,
    route: String,
    health: HealthCheck,
}

impl CaptureService {
    /// Builds the service from resolved configuration and an open store.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::Schema`] if the entry schema fails to compile.
    pub fn new(config: &CaptureConfig, store: Arc<dyn EntryStore>) -> Result<Self, ServerError> {
        let credentials = Credentials::new(&config.auth.username, &config.auth.password);
        let schema = Arc::new(SchemaValidator::new()?);
        let limits = BodyLimits {
            max_bytes: config.server.max_body_bytes,
            read_timeout: config.server.request_timeout(),
        };
        Ok(Self {
            pipeline: Pipeline::capture_with_limits(credentials, schema, limits),
            health: HealthCheck::new("capture", env!("CARGO_PKG_VERSION"), store.name()),
            store,
            route: config.server.route(),
        })
    }

    /// The capture route, e.g. `/campaign`.
    #[must_use]
    pub fn route(&self) -> &str {
        &self.route
    }

    /// Closes the backing store. Called once, after the last connection.
    pub fn close(&self) {
        tracing::info!(store = self.store.name(), "closing store");
        self.store.close();
    }

    /// Answers one request. Never fails: every outcome is an envelope.
    pub async fn handle<B>(&self, request: http::Request<B>) -> Response
    where
        B: Body<Data = Bytes> + Send + 'static,
        B::Error: Into<BoxError>,
    {
        let started = Instant::now();
        let request_id = request
            .headers()
            .get(REQUEST_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(RequestId::parse)
            .unwrap_or_default();
        let ctx = MiddlewareContext::with_request_id(request_id);
        let method = request.method().clone();
        let path = request.uri().path().to_string();

        let response = if method == Method::GET && path == HEALTH_PATH {
            Response::json(StatusCode::OK, &self.health.status())
        } else if path == self.route {
            self.capture(ctx, request).await
        } else {
            Response::from_error(&CaptureError::not_found(&path))
        };

        log_request_complete!(
            request_id,
            method,
            path,
            response.status().as_u16(),
            u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
        );
        response
    }

    async fn capture<B>(&self, ctx: MiddlewareContext, request: http::Request<B>) -> Response
    where
        B: Body<Data = Bytes> + Send + 'static,
        B::Error: Into<BoxError>,
    {
        // The body stays unread here; the validation gate buffers it once
        // the method and auth gates have passed.
        let request: Request = request.map(boxed_body);
        let store = Arc::clone(&self.store);
        let outcome = self
            .pipeline
            .process(ctx, request, move |ctx, _request| {
                let entry = ctx.take_entry();
                let request_id = ctx.request_id();
                Box::pin(async move {
                    let entry = entry
                        .ok_or_else(|| CaptureError::unexpected("no validated entry in context"))?;
                    store.save(&entry).await.map_err(CaptureError::persistence)?;
                    tracing::info!(
                        request_id = %request_id,
                        entry_id = %entry.public_id(),
                        campaign = %entry.campaign_name,
                        store = store.name(),
                        "entry saved"
                    );
                    Ok(Response::success(entry.public_id().as_str()))
                })
            })
            .await;

        outcome.unwrap_or_else(|err| Response::from_error(&err))
    }
}

impl std::fmt::Debug for CaptureService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CaptureService")
            .field("route", &self.route)
            .field("store", &self.store.name())
            .field("pipeline", &self.pipeline)
            .finish_non_exhaustive()
    }
}
