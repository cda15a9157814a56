//! `/wallet/{address}`: write-once store of encrypted wallet credentials.
//!
//! The credential travels undecoded in the query string after `?c=`. A POST
//! first reads the address and only writes when nothing is stored; the read
//! and the write are separate KV calls, so two concurrent creations for the
//! same address can both succeed and the later write wins.

use super::{GatewayRequest, compact, pretty};
use crate::error::GatewayError;
use crate::state::AppState;
use axum::http::Uri;
use axum::response::Response;
use serde::{Deserialize, Serialize};
use serde_json::json;

/// Shortest credential accepted, in characters.
pub const MIN_CREDENTIAL_LEN: usize = 1000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletRecord {
    pub method: String,
    pub wallet_address: String,
    pub kv: Option<String>,
}

/// The path segment after `/wallet/`.
fn wallet_address(req: &GatewayRequest) -> String {
    req.uri.path().split('/').nth(2).unwrap_or_default().to_string()
}

/// Raw text after the first `?c=` of the request target, up to the next one.
fn credential(uri: &Uri) -> Option<&str> {
    uri.path_and_query()?.as_str().split("?c=").nth(1)
}

pub async fn read(state: &AppState, req: &GatewayRequest) -> Result<Response, GatewayError> {
    let address = wallet_address(req);
    let kv = state.kv.wallets.get(&address).await?;
    pretty(&WalletRecord {
        method: req.method.to_string(),
        wallet_address: address,
        kv,
    })
}

pub async fn create(state: &AppState, req: &GatewayRequest) -> Result<Response, GatewayError> {
    let address = wallet_address(req);

    if state.kv.wallets.get(&address).await?.is_some() {
        tracing::info!(wallet = %address, "Wallet already registered");
        return compact(&json!({ "error": "Wallet Exist" }));
    }

    let credential = credential(&req.uri).unwrap_or_default();
    if credential.len() < MIN_CREDENTIAL_LEN {
        tracing::info!(wallet = %address, length = credential.len(), "Credential too short");
        return pretty(&json!({ "error": "requirements not met." }));
    }

    state.kv.wallets.put(&address, credential).await?;
    tracing::info!(wallet = %address, "Registered wallet credential");

    pretty(&WalletRecord {
        method: req.method.to_string(),
        wallet_address: address,
        kv: Some(credential.to_string()),
    })
}
