//! Error types for the gateway.

use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use streamgate_core::ConfigError;
use streamgate_kv::KvError;
use streamgate_stream::ProviderError;
use streamgate_token::TokenError;
use thiserror::Error;

/// Errors raised while starting the gateway or handling a request.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The caller is not allowed to use the endpoint.
    #[error("unauthorized")]
    Unauthorized,

    /// Request body could not be read or parsed.
    #[error("invalid request body: {0}")]
    InvalidBody(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Token verification key error.
    #[error("token error: {0}")]
    Token(#[from] TokenError),

    /// Key-value store error.
    #[error("kv error: {0}")]
    Kv(#[from] KvError),

    /// Upstream video provider error.
    #[error("provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Response serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Failed to start the server.
    #[error("failed to start gateway: {0}")]
    StartupFailed(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl GatewayError {
    /// Render the error as a response.
    ///
    /// Internal failures become `500 Internal Error`; with `debug` set the
    /// error text is sent instead.
    pub fn to_response(&self, debug: bool) -> Response {
        match self {
            GatewayError::Unauthorized => plain(StatusCode::UNAUTHORIZED, "Unauthorized".into()),
            _ if debug => plain(StatusCode::INTERNAL_SERVER_ERROR, self.to_string()),
            _ => plain(StatusCode::INTERNAL_SERVER_ERROR, "Internal Error".into()),
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        self.to_response(false)
    }
}

fn plain(status: StatusCode, body: String) -> Response {
    (status, [(header::CONTENT_TYPE, "text/plain")], body).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            GatewayError::Unauthorized.to_response(true).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            GatewayError::InvalidBody("x".into()).into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
