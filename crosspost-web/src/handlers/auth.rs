use axum::{
    extract::{RawQuery, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    Json,
};
use serde_json::json;
use service_core::error::AppError;

use crate::identity::{RelayParams, SessionView, SignInOutcome};
use crate::models::SessionIdentity;
use crate::services::SignInCallback;
use crate::AppState;

/// Phase 1: the OAuth layer posts the provider account and profile claims.
pub async fn sign_in_callback(
    State(state): State<AppState>,
    mut identity: SessionIdentity,
    Json(callback): Json<SignInCallback>,
) -> Result<Response, AppError> {
    let provider = callback.account.provider();
    let result = state.identity.handle_callback(&callback).await?;

    match result.outcome {
        SignInOutcome::Complete => {
            if let Some(email) = &result.email {
                identity.sign_in(email).await?;
            }
            tracing::info!(provider = %provider, "User signed in");
            Ok((StatusCode::OK, Json(json!({ "outcome": true }))).into_response())
        }
        SignInOutcome::Relay(redirect) => {
            // Without an email the relay is owned by whoever is signed in.
            if let Some(email) = &result.email {
                identity.set_pending(email).await?;
            }
            tracing::info!(provider = %provider, "Relaying credential for persistence");
            Ok(Redirect::to(redirect.as_str()).into_response())
        }
        SignInOutcome::Rejected(_) => {
            tracing::warn!(provider = %provider, "Sign-in rejected");
            Ok((StatusCode::UNAUTHORIZED, Json(json!({ "outcome": false }))).into_response())
        }
    }
}

/// Phase 2: persist a relayed credential for the user on this session.
pub async fn save_token(
    State(state): State<AppState>,
    mut identity: SessionIdentity,
    RawQuery(query): RawQuery,
) -> Result<Redirect, AppError> {
    let owner = identity
        .relay_owner()
        .map(str::to_string)
        .ok_or_else(|| AppError::Unauthorized(anyhow::anyhow!("No signed-in user for relay")))?;

    let params = RelayParams::from_query(query.as_deref().unwrap_or_default())?;
    state.identity.complete_relay(&owner, params).await?;
    identity.confirm_pending().await?;

    Ok(Redirect::to("/"))
}

pub async fn read_session(
    State(state): State<AppState>,
    identity: SessionIdentity,
) -> Result<Json<SessionView>, AppError> {
    let view = state.identity.session_view(identity.email.as_deref()).await?;
    Ok(Json(view))
}

pub async fn sign_out(mut identity: SessionIdentity) -> Result<StatusCode, AppError> {
    identity.sign_out().await?;
    Ok(StatusCode::OK)
}
