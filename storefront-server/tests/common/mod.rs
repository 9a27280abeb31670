//! Shared harness for the HTTP tests: full router over in-memory stores

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use http::{Request, StatusCode, header};
use serde_json::Value;
use storefront_server::db::CatalogStore;
use storefront_server::media::{MediaStore, MemoryMediaStore};
use storefront_server::notify::{Notification, NotificationSink};
use storefront_server::{AppState, build_app};
use tokio::sync::mpsc;
use tower::ServiceExt;

pub const ADMIN_PASSWORD: &str = "test-admin-secret";
const BOUNDARY: &str = "storefront-test-boundary";

/// Forwards every delivered notification to the test
struct CaptureSink(mpsc::UnboundedSender<Notification>);

#[async_trait]
impl NotificationSink for CaptureSink {
    async fn deliver(&self, notification: Notification) {
        let _ = self.0.send(notification);
    }
}

pub struct TestApp {
    pub app: Router,
    /// Bytes written by the admin media upload
    pub media: Arc<MemoryMediaStore>,
    events: mpsc::UnboundedReceiver<Notification>,
}

impl TestApp {
    pub fn new() -> Self {
        let (tx, events) = mpsc::unbounded_channel();
        let state = AppState::in_memory(ADMIN_PASSWORD, Arc::new(CaptureSink(tx)));
        Self::from_state(state, events)
    }

    pub fn with_catalog(catalog: Arc<dyn CatalogStore>) -> Self {
        let (tx, events) = mpsc::unbounded_channel();
        let state =
            AppState::in_memory_with_catalog(ADMIN_PASSWORD, Arc::new(CaptureSink(tx)), catalog);
        Self::from_state(state, events)
    }

    fn from_state(mut state: AppState, events: mpsc::UnboundedReceiver<Notification>) -> Self {
        let media = Arc::new(MemoryMediaStore::new());
        let store: Arc<dyn MediaStore> = media.clone();
        state.media = store;
        Self {
            app: build_app(state),
            media,
            events,
        }
    }

    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, body)
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.send(json_request("GET", uri, None, token)).await
    }

    pub async fn post(&self, uri: &str, body: Value, token: Option<&str>) -> (StatusCode, Value) {
        self.send(json_request("POST", uri, Some(body), token)).await
    }

    pub async fn patch(&self, uri: &str, body: Value, token: Option<&str>) -> (StatusCode, Value) {
        self.send(json_request("PATCH", uri, Some(body), token)).await
    }

    pub async fn login(&self) -> String {
        let (status, body) = self
            .post(
                "/api/admin/login",
                serde_json::json!({ "password": ADMIN_PASSWORD }),
                None,
            )
            .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        body["token"].as_str().unwrap().to_string()
    }

    /// Next delivered notification, failing after one second
    pub async fn next_event(&mut self) -> Notification {
        tokio::time::timeout(Duration::from_secs(1), self.events.recv())
            .await
            .expect("no notification delivered")
            .expect("notification channel closed")
    }

    /// Asserts nothing is delivered within a short window
    pub async fn assert_no_event(&mut self) {
        let got = tokio::time::timeout(Duration::from_millis(100), self.events.recv()).await;
        assert!(got.is_err(), "unexpected notification: {got:?}");
    }
}

pub fn json_request(
    method: &str,
    uri: &str,
    body: Option<Value>,
    token: Option<&str>,
) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

/// File part of a multipart body
pub struct FilePart<'a> {
    pub field: &'a str,
    pub filename: &'a str,
    pub content_type: &'a str,
    pub bytes: &'a [u8],
}

pub fn multipart_request(uri: &str, fields: &[(&str, &str)], file: Option<FilePart<'_>>) -> Request<Body> {
    authed_multipart_request(uri, fields, file, None)
}

pub fn authed_multipart_request(
    uri: &str,
    fields: &[(&str, &str)],
    file: Option<FilePart<'_>>,
    token: Option<&str>,
) -> Request<Body> {
    let mut body: Vec<u8> = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    if let Some(file) = file {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
                file.field, file.filename, file.content_type
            )
            .as_bytes(),
        );
        body.extend_from_slice(file.bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    let mut builder = Request::builder().method("POST").uri(uri).header(
        header::CONTENT_TYPE,
        format!("multipart/form-data; boundary={BOUNDARY}"),
    );
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::from(body)).unwrap()
}

/// Scenario A body
pub fn single_order(email: &str) -> Value {
    serde_json::json!({
        "imvuId": "user1",
        "email": email,
        "paymentMethod": "PayPal",
        "productId": "p1",
        "productName": "BBC KING V5",
        "total": 5399
    })
}
