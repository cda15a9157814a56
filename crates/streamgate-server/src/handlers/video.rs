//! `GET /api/video_id`: exchange an access token for a signed playback token.

use super::{GatewayRequest, compact};
use crate::error::GatewayError;
use crate::state::AppState;
use axum::response::Response;
use streamgate_token::AccessClaims;

pub async fn playback_token(
    state: &AppState,
    req: &GatewayRequest,
) -> Result<Response, GatewayError> {
    match authorize(state, req).await {
        Ok(token) => compact(&token),
        Err(e) => {
            tracing::info!(reason = %e, "Playback request rejected");
            Err(GatewayError::Unauthorized)
        }
    }
}

/// Verify the `jwt` parameter and ask the provider for a signed token.
/// Every failure is reported to the caller as 401.
async fn authorize(state: &AppState, req: &GatewayRequest) -> Result<String, GatewayError> {
    let jwt = req.query_param("jwt").ok_or(GatewayError::Unauthorized)?;
    let verification = state.verifier.verify(&jwt)?;

    if !verification.verified || !claims_allowed(state, &verification.payload) {
        return Err(GatewayError::Unauthorized);
    }

    let video_id = verification
        .payload
        .first_path_segment()
        .ok_or(GatewayError::Unauthorized)?;
    Ok(state.provider.signed_playback_token(video_id).await?)
}

// orgId, role and extraData must be present and empty.
fn claims_allowed(state: &AppState, claims: &AccessClaims) -> bool {
    let empty = |c: &Option<String>| c.as_deref() == Some("");
    state.allowlist.contains(&claims.base_url)
        && empty(&claims.org_id)
        && empty(&claims.role)
        && empty(&claims.extra_data)
}
