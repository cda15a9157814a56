//! Endpoint handlers.
//!
//! Handlers receive the buffered request and return either a response or a
//! [`GatewayError`]; the dispatcher turns errors into 401/500 responses and
//! adds the CORS headers.

pub mod account;
pub mod upload;
pub mod video;
pub mod videos;
pub mod wallet;

use crate::error::GatewayError;
use crate::router::Endpoint;
use crate::state::AppState;
use axum::body::Bytes;
use axum::extract::{Query, Request};
use axum::http::{HeaderMap, Method, Uri, header};
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;

/// A request with its body read into memory.
#[derive(Debug, Clone)]
pub struct GatewayRequest {
    pub method: Method,
    pub uri: Uri,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl GatewayRequest {
    /// Buffer the body of `request`, failing when it exceeds `limit` bytes.
    pub async fn read(request: Request, limit: usize) -> Result<Self, GatewayError> {
        let (parts, body) = request.into_parts();
        let body = axum::body::to_bytes(body, limit)
            .await
            .map_err(|e| GatewayError::InvalidBody(e.to_string()))?;
        Ok(Self {
            method: parts.method,
            uri: parts.uri,
            headers: parts.headers,
            body,
        })
    }

    /// First value of a decoded query parameter.
    pub fn query_param(&self, name: &str) -> Option<String> {
        let Query(pairs) = Query::<Vec<(String, String)>>::try_from_uri(&self.uri).ok()?;
        pairs.into_iter().find(|(k, _)| k == name).map(|(_, v)| v)
    }

    /// Parse the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, GatewayError> {
        serde_json::from_slice(&self.body).map_err(|e| GatewayError::InvalidBody(e.to_string()))
    }

    /// Absolute URL of the request, rebuilt from the `Host` and
    /// `X-Forwarded-Proto` headers when the request line is origin-form.
    pub fn url(&self) -> String {
        if self.uri.authority().is_some() {
            return self.uri.to_string();
        }
        let scheme = self
            .headers
            .get("x-forwarded-proto")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("http");
        let host = self
            .headers
            .get(header::HOST)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("localhost");
        let target = self
            .uri
            .path_and_query()
            .map(|pq| pq.as_str())
            .unwrap_or("/");
        format!("{scheme}://{host}{target}")
    }
}

/// Run the handler for `endpoint`.
pub async fn handle(
    state: &AppState,
    endpoint: Endpoint,
    req: GatewayRequest,
) -> Result<Response, GatewayError> {
    match endpoint {
        Endpoint::PlaybackToken => video::playback_token(state, &req).await,
        Endpoint::CreateDirectUpload => upload::create_direct_upload(state).await,
        Endpoint::DirectUploadPlaceholder => Ok(upload::placeholder()),
        Endpoint::WalletRead => wallet::read(state, &req).await,
        Endpoint::WalletCreate => wallet::create(state, &req).await,
        Endpoint::NewVideoPath => videos::new_video_path(),
        Endpoint::NewVideoWrite => videos::new_video_write(state, &req).await,
        Endpoint::VideoList => videos::list(state).await,
        Endpoint::VideoRead => videos::read(state, &req).await,
        Endpoint::AccountGreeting => account::greeting(),
        Endpoint::AccountLookup => account::lookup(state, &req).await,
    }
}

fn json_body(body: String) -> Response {
    ([(header::CONTENT_TYPE, "application/json")], body).into_response()
}

/// Single-line JSON response.
pub(crate) fn compact<T: Serialize>(value: &T) -> Result<Response, GatewayError> {
    Ok(json_body(serde_json::to_string(value)?))
}

/// JSON response indented by two spaces.
pub(crate) fn pretty<T: Serialize>(value: &T) -> Result<Response, GatewayError> {
    Ok(json_body(serde_json::to_string_pretty(value)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(uri: &str, headers: &[(&'static str, &str)]) -> GatewayRequest {
        let mut map = HeaderMap::new();
        for (k, v) in headers {
            map.insert(*k, v.parse().unwrap());
        }
        GatewayRequest {
            method: Method::GET,
            uri: uri.parse().unwrap(),
            headers: map,
            body: Bytes::new(),
        }
    }

    #[test]
    fn test_query_param_is_decoded() {
        let req = request("/api/video_id?x=1&jwt=a%2Bb&jwt=second", &[]);
        assert_eq!(req.query_param("jwt").as_deref(), Some("a+b"));
        assert_eq!(req.query_param("missing"), None);
    }

    #[test]
    fn test_url_from_host_header() {
        let req = request(
            "/api/videos?a=1",
            &[("host", "gw.example.com"), ("x-forwarded-proto", "https")],
        );
        assert_eq!(req.url(), "https://gw.example.com/api/videos?a=1");
    }

    #[test]
    fn test_url_without_headers() {
        assert_eq!(request("/api/videos", &[]).url(), "http://localhost/api/videos");
    }
}
