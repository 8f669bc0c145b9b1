use axum::{
    middleware::from_fn,
    routing::{get, post},
    Router,
};
use service_core::middleware::{
    metrics::metrics_middleware,
    tracing::{request_id_middleware, REQUEST_ID_HEADER},
};
use std::sync::Arc;
use time::Duration;
use tower_http::trace::TraceLayer;
use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer};

use crate::config::{SessionSettings, Settings};
use crate::handlers::{
    app::health_check,
    auth::{read_session, save_token, sign_in_callback, sign_out},
    metrics::metrics,
    preview::{link_preview, link_previews},
};
use crate::preview::{HttpTransport, PreviewAggregator, PreviewFetcher};
use crate::services::{
    IdentityBridge, InMemoryCredentialStore, InMemoryProfileStore, InMemorySessionTokenStore,
};
use crate::AppState;

pub const HEALTH_PATH: &str = "/health";
pub const METRICS_PATH: &str = "/metrics";
pub const CALLBACK_PATH: &str = "/api/auth/callback";
pub const SESSION_PATH: &str = "/api/auth/session";
pub const SIGNOUT_PATH: &str = "/api/auth/signout";
pub const LINK_PREVIEW_PATH: &str = "/api/link-preview";
pub const LINK_PREVIEWS_PATH: &str = "/api/link-previews";

/// Routes the configurable relay path must not collide with.
pub const FIXED_ROUTES: [&str; 7] = [
    HEALTH_PATH,
    METRICS_PATH,
    CALLBACK_PATH,
    SESSION_PATH,
    SIGNOUT_PATH,
    LINK_PREVIEW_PATH,
    LINK_PREVIEWS_PATH,
];

/// Wire the stores and the preview transport from configuration.
pub fn build_state(settings: &Settings) -> anyhow::Result<AppState> {
    let identity = IdentityBridge::new(
        Arc::new(InMemorySessionTokenStore::new()),
        Arc::new(InMemoryProfileStore::new()),
        Arc::new(InMemoryCredentialStore::new()),
        settings.identity.relay_path.clone(),
    );

    let transport = HttpTransport::new(&settings.preview)?;
    let fetcher = PreviewFetcher::new(Arc::new(transport), settings.preview.timeout());

    Ok(AppState::new(
        Arc::new(identity),
        Arc::new(PreviewAggregator::new(fetcher)),
    ))
}

pub fn build_router(state: AppState, session: &SessionSettings) -> Router {
    let session_layer = SessionManagerLayer::new(MemoryStore::default())
        .with_secure(session.secure_cookie)
        .with_expiry(Expiry::OnInactivity(Duration::hours(
            session.inactivity_hours,
        )));

    let relay_path = state.identity.relay_path().to_string();

    Router::new()
        .route(HEALTH_PATH, get(health_check))
        .route(METRICS_PATH, get(metrics))
        .route(CALLBACK_PATH, post(sign_in_callback))
        .route(SESSION_PATH, get(read_session))
        .route(SIGNOUT_PATH, post(sign_out))
        .route(&relay_path, get(save_token))
        .route(LINK_PREVIEW_PATH, post(link_preview))
        .route(LINK_PREVIEWS_PATH, post(link_previews))
        .layer(session_layer)
        .layer(from_fn(metrics_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                let request_id = request
                    .headers()
                    .get(REQUEST_ID_HEADER)
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("-");

                tracing::info_span!(
                    "http_request",
                    request_id = %request_id,
                    method = %request.method(),
                    uri = %request.uri().path(),
                )
            }),
        )
        // Outermost so the span above sees the assigned id.
        .layer(from_fn(request_id_middleware))
        .with_state(state)
}
