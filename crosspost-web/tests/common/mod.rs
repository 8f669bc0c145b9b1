#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Request, Response},
    Router,
};
use crosspost_web::config::{PreviewSettings, SessionSettings};
use crosspost_web::preview::{HttpTransport, PreviewAggregator, PreviewFetcher};
use crosspost_web::services::{
    IdentityBridge, InMemoryCredentialStore, InMemoryProfileStore, InMemorySessionTokenStore,
};
use crosspost_web::startup::build_router;
use crosspost_web::AppState;
use std::sync::Arc;

pub const RELAY_PATH: &str = "/api/user/save-token";

pub struct TestApp {
    pub router: Router,
    pub credentials: Arc<InMemoryCredentialStore>,
    pub sessions: Arc<InMemorySessionTokenStore>,
}

pub fn spawn_app() -> TestApp {
    spawn_app_with_preview_timeout(5_000)
}

pub fn spawn_app_with_preview_timeout(timeout_ms: u64) -> TestApp {
    spawn_app_with_preview(PreviewSettings {
        timeout_ms,
        ..PreviewSettings::default()
    })
}

pub fn spawn_app_with_preview(preview_settings: PreviewSettings) -> TestApp {
    let sessions = Arc::new(InMemorySessionTokenStore::new());
    let credentials = Arc::new(InMemoryCredentialStore::new());
    let identity = IdentityBridge::new(
        sessions.clone(),
        Arc::new(InMemoryProfileStore::new()),
        credentials.clone(),
        RELAY_PATH,
    );

    let transport = HttpTransport::new(&preview_settings).expect("Failed to build HTTP transport");
    let fetcher = PreviewFetcher::new(Arc::new(transport), preview_settings.timeout());

    let state = AppState::new(
        Arc::new(identity),
        Arc::new(PreviewAggregator::new(fetcher)),
    );

    TestApp {
        router: build_router(state, &SessionSettings::default()),
        credentials,
        sessions,
    }
}

pub fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// The `name=value` part of the session cookie set on `response`, if any.
pub fn session_cookie(response: &Response<Body>) -> Option<String> {
    response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(';').next())
        .map(str::to_string)
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
