use axum::{extract::State, Json};
use serde::Deserialize;
use service_core::error::AppError;

use crate::preview::LinkPreview;
use crate::AppState;

#[derive(Deserialize)]
pub struct LinkPreviewRequest {
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Deserialize)]
pub struct LinkPreviewsRequest {
    #[serde(default)]
    pub text: String,
}

pub async fn link_preview(
    State(state): State<AppState>,
    Json(payload): Json<LinkPreviewRequest>,
) -> Result<Json<LinkPreview>, AppError> {
    let url = payload
        .url
        .filter(|url| !url.trim().is_empty())
        .ok_or_else(|| AppError::BadRequest(anyhow::anyhow!("URL is required")))?;

    Ok(Json(state.previews.fetcher().fetch(url.trim()).await))
}

pub async fn link_previews(
    State(state): State<AppState>,
    Json(payload): Json<LinkPreviewsRequest>,
) -> Json<Vec<LinkPreview>> {
    Json(state.previews.previews_for(&payload.text).await)
}
