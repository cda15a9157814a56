//! `/api/get_direct_upload_auth`

use super::compact;
use crate::error::GatewayError;
use crate::state::AppState;
use axum::response::{IntoResponse, Response};

/// Longest video a direct upload may carry.
pub const MAX_DURATION_SECS: u32 = 300;

/// GET: open a direct-upload session and return its URL as a JSON string.
pub async fn create_direct_upload(state: &AppState) -> Result<Response, GatewayError> {
    let upload_url = state
        .provider
        .create_direct_upload(MAX_DURATION_SECS, true)
        .await?;
    tracing::info!("Issued direct upload URL");
    compact(&upload_url)
}

/// POST
pub fn placeholder() -> Response {
    "Testing".into_response()
}
