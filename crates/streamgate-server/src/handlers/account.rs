//! `/account`

use super::{GatewayRequest, compact, pretty};
use crate::error::GatewayError;
use crate::state::AppState;
use axum::response::Response;
use serde::{Deserialize, Serialize};
use serde_json::json;

/// Caller-supplied provider credentials.
#[derive(Deserialize)]
struct AccountCredentials {
    email: String,
    #[serde(rename = "globalAPI")]
    global_api: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountId {
    pub id: String,
}

pub fn greeting() -> Result<Response, GatewayError> {
    compact(&json!({ "data": "Hello, Moto." }))
}

/// POST: id of the first account visible to the caller's credentials.
pub async fn lookup(state: &AppState, req: &GatewayRequest) -> Result<Response, GatewayError> {
    let creds: AccountCredentials = req.json()?;
    let id = state
        .provider
        .first_account_id(&creds.email, &creds.global_api)
        .await?;
    pretty(&AccountId { id })
}
