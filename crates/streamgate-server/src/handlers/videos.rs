//! `/api/new_video` and `/api/videos`: video metadata namespace.

use super::{GatewayRequest, compact, pretty};
use crate::error::GatewayError;
use crate::state::AppState;
use axum::response::Response;
use serde::{Deserialize, Serialize};
use serde_json::json;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewVideo {
    pub id: String,
    pub value: String,
}

#[derive(Debug, Deserialize)]
struct VideoLookup {
    key: String,
}

/// Response of `POST /api/videos`. `url` is the request URL, not a video URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoLookupResponse {
    pub url: String,
    pub data: Option<String>,
}

pub fn new_video_path() -> Result<Response, GatewayError> {
    compact(&json!({ "path": "./newvideo" }))
}

pub async fn new_video_write(
    state: &AppState,
    req: &GatewayRequest,
) -> Result<Response, GatewayError> {
    let video: NewVideo = req.json()?;
    state.kv.videos.put(&video.id, &video.value).await?;
    tracing::info!(id = %video.id, "Stored video metadata");
    pretty(&video)
}

pub async fn list(state: &AppState) -> Result<Response, GatewayError> {
    let keys = state.kv.videos.list().await?;
    compact(&keys)
}

pub async fn read(state: &AppState, req: &GatewayRequest) -> Result<Response, GatewayError> {
    let lookup: VideoLookup = req.json()?;
    let data = state.kv.videos.get(&lookup.key).await?;
    pretty(&VideoLookupResponse {
        url: req.url(),
        data,
    })
}
