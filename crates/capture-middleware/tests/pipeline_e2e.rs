//! End-to-end pipeline tests.
//!
//! These drive the full capture pipeline (recovery, method, auth, validation)
//! with a handler that saves through an [`EntryStore`], and check the
//! envelope the client would receive.

use bytes::Bytes;
use capture_core::{
    fixtures, BoxFuture, CaptureError, Entry, EntryStore, SchemaValidator, StoreError,
};
use capture_middleware::{
    full_body, BodyLimits, Credentials, MiddlewareContext, Pipeline, Request, Response,
    ResponseExt, JSON_CONTENT_TYPE,
};
use http::header::{AUTHORIZATION, CONTENT_TYPE};
use http::{Method, Request as HttpRequest, StatusCode};
use http_body_util::BodyExt;
use proptest::prelude::*;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

const SCENARIO_BODY: &str = r#"{"campaignName":"Foo","campaignVersion":"0.0.1","entrant":{"title":"Mr","firstName":"John","lastName":"Smith","emailAddress":"foo@bar.com"},"form":[]}"#;

/// Test store recording saved entries, optionally failing every save.
#[derive(Default)]
struct RecordingStore {
    saved: Mutex<Vec<Entry>>,
    calls: AtomicUsize,
    fail: bool,
}

impl RecordingStore {
    fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }
}

impl EntryStore for RecordingStore {
    fn name(&self) -> &'static str {
        "recording"
    }

    fn save<'a>(&'a self, entry: &'a Entry) -> BoxFuture<'a, Result<(), StoreError>> {
        Box::pin(async move {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(StoreError::backend("connection refused"));
            }
            self.saved.lock().unwrap().push(entry.clone());
            Ok(())
        })
    }

    fn close(&self) {}
}

fn credentials() -> Credentials {
    Credentials::new("user", "pass")
}

fn pipeline() -> Pipeline {
    Pipeline::capture(credentials(), Arc::new(SchemaValidator::new().unwrap()))
}

fn request(method: Method, auth: Option<String>, body: impl Into<Bytes>) -> Request {
    let mut builder = HttpRequest::builder().method(method).uri("/campaign");
    if let Some(value) = auth {
        builder = builder.header(AUTHORIZATION, value);
    }
    builder.body(full_body(body)).unwrap()
}

fn authed_post(body: impl Into<Bytes>) -> Request {
    request(Method::POST, Some(credentials().header_value()), body)
}

async fn run(pipeline: &Pipeline, store: Arc<RecordingStore>, request: Request) -> (StatusCode, Value) {
    let response = pipeline
        .process(MiddlewareContext::new(), request, move |ctx, _req| {
            let entry = ctx.take_entry();
            Box::pin(async move {
                let entry = entry.ok_or_else(|| CaptureError::unexpected("no validated entry"))?;
                store.save(&entry).await?;
                Ok(Response::success(entry.public_id().as_str()))
            })
        })
        .await
        .expect("recovery renders every error");

    assert_eq!(
        response.headers().get(CONTENT_TYPE).unwrap(),
        JSON_CONTENT_TYPE
    );
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["status"], json!(status.as_u16()));
    (status, body)
}

#[tokio::test]
async fn scenario_a_empty_body() {
    let store = Arc::new(RecordingStore::default());
    let (status, body) = run(&pipeline(), store.clone(), authed_post(Bytes::new())).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["messages"], json!(["Bad request"]));
    assert_eq!(store.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn scenario_b_valid_entry_is_saved() {
    let store = Arc::new(RecordingStore::default());
    let (status, body) = run(&pipeline(), store.clone(), authed_post(SCENARIO_BODY)).await;

    assert_eq!(status, StatusCode::OK);
    let entry_id = body["entryId"].as_str().unwrap();
    assert!(!entry_id.is_empty());

    let saved = store.saved.lock().unwrap();
    assert_eq!(saved.len(), 1);
    assert_eq!(saved[0].public_id().as_str(), entry_id);
    assert_eq!(saved[0].entrant.email_address, "foo@bar.com");
}

#[tokio::test]
async fn scenario_c_store_failure_is_500() {
    let store = Arc::new(RecordingStore::failing());
    let (status, body) = run(&pipeline(), store.clone(), authed_post(SCENARIO_BODY)).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["messages"], json!(["Internal Server Error"]));
    assert_eq!(store.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn scenario_d_wrong_type_is_schema_violation() {
    let mut doc: Value = serde_json::from_str(SCENARIO_BODY).unwrap();
    doc["campaignName"] = json!(100);
    let store = Arc::new(RecordingStore::default());
    let (status, body) = run(&pipeline(), store.clone(), authed_post(doc.to_string())).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let messages = body["messages"].as_array().unwrap();
    assert_eq!(messages.len(), 1);
    let message = messages[0].as_str().unwrap();
    assert!(message.contains("campaignName"), "{message}");
    assert!(message.contains("string"), "{message}");
    assert_eq!(store.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn scenario_e_get_is_405() {
    let store = Arc::new(RecordingStore::default());
    let req = request(Method::GET, Some(credentials().header_value()), SCENARIO_BODY);
    let (status, body) = run(&pipeline(), store, req).await;

    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(body["messages"], json!(["Method not allowed"]));
}

#[tokio::test]
async fn method_gate_runs_before_auth() {
    let store = Arc::new(RecordingStore::default());
    for method in [Method::GET, Method::PUT, Method::PATCH, Method::DELETE] {
        let (status, _) = run(&pipeline(), store.clone(), request(method, None, Bytes::new())).await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    }
}

#[tokio::test]
async fn auth_gate_runs_before_validation() {
    let store = Arc::new(RecordingStore::default());
    let bad = Credentials::new("user", "wrong").header_value();
    let (status, body) = run(&pipeline(), store, request(Method::POST, Some(bad), Bytes::new())).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["messages"], json!(["Unauthorized"]));
}

#[tokio::test]
async fn schema_violations_one_message_each() {
    let body = json!({
        "campaignVersion": "1",
        "entrant": {"title": "Mr", "firstName": "A", "lastName": "B", "emailAddress": "a@b"},
        "surplus": 1,
        "another": 2
    });
    let store = Arc::new(RecordingStore::default());
    let (status, body) = run(&pipeline(), store, authed_post(body.to_string())).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let messages: Vec<String> = serde_json::from_value(body["messages"].clone()).unwrap();
    assert_eq!(messages.len(), 4, "{messages:?}");
    for needle in ["campaignName", "form", "surplus", "another"] {
        assert!(
            messages.iter().any(|m| m.contains(needle)),
            "{needle} missing from {messages:?}"
        );
    }
}

#[tokio::test]
async fn auth_gate_runs_before_body_limit() {
    let pipeline = Pipeline::capture_with_limits(
        credentials(),
        Arc::new(SchemaValidator::new().unwrap()),
        BodyLimits {
            max_bytes: 16,
            read_timeout: Duration::from_secs(5),
        },
    );
    let store = Arc::new(RecordingStore::default());
    let wrong = Credentials::new("user", "WRONG").header_value();
    let (status, _) = run(&pipeline, store.clone(), request(Method::POST, Some(wrong), SCENARIO_BODY)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = run(&pipeline, store.clone(), authed_post(SCENARIO_BODY)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["messages"], json!(["Bad request"]));
    assert_eq!(store.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn semantic_violations_accumulate() {
    let store = Arc::new(RecordingStore::default());
    let (status, body) = run(&pipeline(), store, authed_post(fixtures::blank_fields_body())).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["messages"],
        json!([
            "campaignName is a required field",
            "entrant.title is a required field"
        ])
    );
}

#[tokio::test]
async fn panicking_handler_is_500() {
    let response = pipeline()
        .process(
            MiddlewareContext::new(),
            authed_post(fixtures::valid_entry_body()),
            |_ctx, _req| {
                Box::pin(async {
                    let stores: Vec<Arc<RecordingStore>> = Vec::new();
                    stores[0].close();
                    Ok(Response::success("unreachable"))
                })
            },
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

proptest! {
    #[test]
    fn any_non_post_method_is_405(
        method in prop::sample::select(vec!["GET", "PUT", "PATCH", "DELETE", "OPTIONS", "HEAD"]),
        with_auth in any::<bool>(),
        body in ".{0,32}",
    ) {
        let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
        let auth = with_auth.then(|| credentials().header_value());
        let req = request(Method::from_bytes(method.as_bytes()).unwrap(), auth, body);
        let (status, _) = rt.block_on(run(&pipeline(), Arc::new(RecordingStore::default()), req));
        prop_assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    }

    #[test]
    fn any_wrong_password_is_401(password in "[a-z0-9]{0,12}") {
        prop_assume!(password != "pass");
        let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
        let auth = Credentials::new("user", password).header_value();
        let req = request(Method::POST, Some(auth), fixtures::valid_entry_body());
        let (status, _) = rt.block_on(run(&pipeline(), Arc::new(RecordingStore::default()), req));
        prop_assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
}
