//! Test infrastructure for the LINE relay.
//!
//! `TestEnv` wires the in-memory history store and the mock LINE platform
//! into the real router so integration tests exercise every handler without
//! a database or network. Fixture builders in [`fixtures`] produce signed
//! webhook deliveries and form requests. [`TestDatabase`] provides a
//! migrated PostgreSQL database for exercising the production store.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    body::Body,
    http::{HeaderMap, Request, StatusCode},
    Router,
};
use bytes::Bytes;
use relay_api::{create_router, AppState};
use relay_core::storage::mock::MockHistoryStore;
use relay_line::mock::MockPlatform;
use serde_json::Value;
use tower::ServiceExt;

pub mod database;
pub mod fixtures;

pub use database::TestDatabase;
pub use fixtures::{
    history_request, send_message_multipart_request, send_message_request, EventBuilder,
    TestWebhook, WebhookBuilder,
};
pub use relay_line::mock::{SentMessage, TEST_CHANNEL_SECRET};

/// Test environment backed by in-memory fakes.
///
/// Both fakes are shared handles: inspecting `store` or `platform` after a
/// request shows what the handlers did.
#[derive(Clone, Default)]
pub struct TestEnv {
    /// History store seen by the handlers
    pub store: MockHistoryStore,
    /// LINE platform seen by the handlers
    pub platform: MockPlatform,
}

impl TestEnv {
    /// Creates an environment with an empty store and no known profiles.
    pub fn new() -> Self {
        Self::default()
    }

    /// Application state sharing this environment's fakes.
    pub fn state(&self) -> AppState {
        AppState::new(Arc::new(self.store.clone()), Arc::new(self.platform.clone()))
    }

    /// Router over this environment's fakes.
    pub fn router(&self) -> Router {
        create_router(self.state())
    }

    /// Sends a request through a fresh router and collects the response.
    ///
    /// # Errors
    ///
    /// Returns error if the router fails or the body cannot be read.
    pub async fn send(&self, request: Request<Body>) -> Result<TestResponse> {
        let response = self.router().oneshot(request).await.context("router failed")?;

        let status = response.status();
        let headers = response.headers().clone();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .context("failed to read response body")?;

        Ok(TestResponse { status, headers, body })
    }

    /// Delivers a webhook to `POST /history`.
    ///
    /// # Errors
    ///
    /// See [`TestEnv::send`].
    pub async fn deliver(&self, webhook: TestWebhook) -> Result<TestResponse> {
        self.send(webhook.into_request()).await
    }
}

/// Collected HTTP response.
#[derive(Debug, Clone)]
pub struct TestResponse {
    /// Response status
    pub status: StatusCode,
    /// Response headers
    pub headers: HeaderMap,
    /// Full response body
    pub body: Bytes,
}

impl TestResponse {
    /// Parses the body as JSON.
    ///
    /// # Errors
    ///
    /// Returns error if the body is not valid JSON.
    pub fn json(&self) -> Result<Value> {
        serde_json::from_slice(&self.body).context("response body is not JSON")
    }

    /// Body as UTF-8 text, lossy.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Value of a response header, if present and valid UTF-8.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}
