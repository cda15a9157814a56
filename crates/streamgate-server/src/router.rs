//! Ordered route table and the request dispatcher.
//!
//! Every request is matched against [`ROUTES`] from top to bottom; the first
//! entry whose method and path pattern both match handles it. Anything else,
//! including a known path with the wrong method, goes to the static assets.

use crate::assets;
use crate::error::GatewayError;
use crate::handlers::{self, GatewayRequest};
use crate::state::AppState;
use axum::Router;
use axum::extract::{Request, State};
use axum::http::{HeaderName, HeaderValue, Method};
use axum::response::Response;
use std::sync::{Arc, LazyLock};
use tower_http::trace::TraceLayer;

/// How a route matches the request path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathPattern {
    /// The path equals the string.
    Exact(&'static str),
    /// The path starts with the string and has at least one more character.
    Prefixed(&'static str),
}

impl PathPattern {
    pub fn matches(&self, path: &str) -> bool {
        match self {
            PathPattern::Exact(p) => path == *p,
            PathPattern::Prefixed(prefix) => {
                path.len() > prefix.len() && path.starts_with(prefix)
            }
        }
    }
}

/// The operation a matched route performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    PlaybackToken,
    CreateDirectUpload,
    DirectUploadPlaceholder,
    WalletRead,
    WalletCreate,
    NewVideoPath,
    NewVideoWrite,
    VideoList,
    VideoRead,
    AccountGreeting,
    AccountLookup,
}

#[derive(Debug, Clone)]
pub struct Route {
    pub method: Method,
    pub pattern: PathPattern,
    pub endpoint: Endpoint,
}

impl Route {
    fn new(method: Method, pattern: PathPattern, endpoint: Endpoint) -> Self {
        Self {
            method,
            pattern,
            endpoint,
        }
    }
}

pub static ROUTES: LazyLock<Vec<Route>> = LazyLock::new(|| {
    use Endpoint::*;
    use PathPattern::*;
    vec![
        Route::new(Method::GET, Exact("/api/video_id"), PlaybackToken),
        Route::new(Method::GET, Exact("/api/get_direct_upload_auth"), CreateDirectUpload),
        Route::new(Method::POST, Exact("/api/get_direct_upload_auth"), DirectUploadPlaceholder),
        Route::new(Method::GET, Prefixed("/wallet/"), WalletRead),
        Route::new(Method::POST, Prefixed("/wallet/"), WalletCreate),
        Route::new(Method::GET, Exact("/api/new_video"), NewVideoPath),
        Route::new(Method::POST, Exact("/api/new_video"), NewVideoWrite),
        Route::new(Method::GET, Exact("/api/videos"), VideoList),
        Route::new(Method::POST, Exact("/api/videos"), VideoRead),
        Route::new(Method::GET, Exact("/account"), AccountGreeting),
        Route::new(Method::POST, Exact("/account"), AccountLookup),
    ]
});

/// Routes reachable without any credential, logged at startup.
pub const UNAUTHENTICATED_ROUTES: &[&str] = &["/api/get_direct_upload_auth", "/account"];

/// First endpoint matching `method` and `path`.
pub fn resolve(method: &Method, path: &str) -> Option<Endpoint> {
    ROUTES
        .iter()
        .find(|r| r.method == *method && r.pattern.matches(path))
        .map(|r| r.endpoint)
}

/// Build the gateway router.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .fallback(dispatch)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

async fn dispatch(State(state): State<Arc<AppState>>, request: Request) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    let Some(endpoint) = resolve(&method, &path) else {
        return assets::serve(&method, &path);
    };

    let mut response = match GatewayRequest::read(request, state.body_limit).await {
        Ok(req) => match handlers::handle(&state, endpoint, req).await {
            Ok(response) => response,
            Err(e) => error_response(&state, endpoint, e),
        },
        Err(e) => error_response(&state, endpoint, e),
    };

    apply_cors(&mut response);
    response
}

fn error_response(state: &AppState, endpoint: Endpoint, error: GatewayError) -> Response {
    if !matches!(error, GatewayError::Unauthorized) {
        tracing::error!(endpoint = ?endpoint, error = %error, "Handler failed");
    }
    error.to_response(state.debug)
}

const CORS_HEADERS: [(&str, &str); 3] = [
    ("access-control-allow-origin", "*"),
    ("access-control-allow-methods", "GET,HEAD,POST,OPTIONS"),
    ("access-control-max-age", "86400"),
];

fn apply_cors(response: &mut Response) {
    let headers = response.headers_mut();
    for (name, value) in CORS_HEADERS {
        headers.insert(
            HeaderName::from_static(name),
            HeaderValue::from_static(value),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_pattern() {
        let p = PathPattern::Exact("/api/videos");
        assert!(p.matches("/api/videos"));
        assert!(!p.matches("/api/videos/"));
        assert!(!p.matches("/x/api/videos"));
    }

    #[test]
    fn test_prefixed_pattern_needs_a_segment() {
        let p = PathPattern::Prefixed("/wallet/");
        assert!(p.matches("/wallet/0xabc"));
        assert!(p.matches("/wallet/0xabc/extra"));
        assert!(!p.matches("/wallet/"));
        assert!(!p.matches("/wallet"));
    }

    #[test]
    fn test_resolve_by_method() {
        assert_eq!(
            resolve(&Method::GET, "/api/video_id"),
            Some(Endpoint::PlaybackToken)
        );
        assert_eq!(resolve(&Method::POST, "/api/video_id"), None);
        assert_eq!(
            resolve(&Method::POST, "/api/get_direct_upload_auth"),
            Some(Endpoint::DirectUploadPlaceholder)
        );
        assert_eq!(
            resolve(&Method::POST, "/wallet/0x1"),
            Some(Endpoint::WalletCreate)
        );
        assert_eq!(resolve(&Method::PUT, "/api/videos"), None);
        assert_eq!(resolve(&Method::GET, "/index.html"), None);
    }

    #[test]
    fn test_patterns_are_exclusive() {
        let paths = [
            "/api/video_id",
            "/api/get_direct_upload_auth",
            "/wallet/a",
            "/api/new_video",
            "/api/videos",
            "/account",
        ];
        for path in paths {
            for method in [Method::GET, Method::POST] {
                let hits = ROUTES
                    .iter()
                    .filter(|r| r.method == method && r.pattern.matches(path))
                    .count();
                assert!(hits <= 1, "{method} {path} matched {hits} routes");
            }
        }
    }
}
