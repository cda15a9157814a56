//! Embedded static site.
//!
//! Requests that no route handles are mapped to a file under `assets/`.
//! When the mapping finds nothing, `index.html` is served instead so the
//! single-page frontend can route on the client.

use axum::http::{HeaderName, HeaderValue, Method, StatusCode, header};
use axum::response::{IntoResponse, Response};
use rust_embed::RustEmbed;

#[derive(RustEmbed)]
#[folder = "assets/"]
pub struct Assets;

/// Document served when an asset cannot be resolved.
pub const FALLBACK_DOCUMENT: &str = "index.html";

const SECURITY_HEADERS: [(&str, &str); 5] = [
    ("x-xss-protection", "1; mode=block"),
    ("x-content-type-options", "nosniff"),
    ("x-frame-options", "DENY"),
    ("referrer-policy", "unsafe-url"),
    ("feature-policy", "none"),
];

/// Embedded file name for a request path.
///
/// `/` and `/docs/` map to `index.html` and `docs/index.html`; a last
/// segment without an extension is treated as a directory.
pub fn asset_key(path: &str) -> String {
    let decoded = urlencoding::decode(path)
        .map(|p| p.into_owned())
        .unwrap_or_else(|_| path.to_string());
    let trimmed = decoded.trim_start_matches('/');

    if trimmed.is_empty() || trimmed.ends_with('/') {
        return format!("{trimmed}index.html");
    }
    let last = trimmed.rsplit('/').next().unwrap_or(trimmed);
    if last.contains('.') {
        trimmed.to_string()
    } else {
        format!("{trimmed}/index.html")
    }
}

/// Resolve `path` to an embedded file, or `None` for non-GET/HEAD methods
/// and unknown files.
pub fn resolve(method: &Method, path: &str) -> Option<Response> {
    if method != Method::GET && method != Method::HEAD {
        return None;
    }
    let key = asset_key(path);
    let file = Assets::get(&key)?;

    let mut response = file_response(&key, file.data.into_owned());
    let headers = response.headers_mut();
    for (name, value) in SECURITY_HEADERS {
        headers.insert(
            HeaderName::from_static(name),
            HeaderValue::from_static(value),
        );
    }
    Some(response)
}

/// Serve `path`, falling back to [`FALLBACK_DOCUMENT`].
pub fn serve(method: &Method, path: &str) -> Response {
    if let Some(response) = resolve(method, path) {
        return response;
    }
    tracing::debug!(method = %method, path = %path, "Asset not found, serving fallback document");
    match Assets::get(FALLBACK_DOCUMENT) {
        Some(file) => file_response(FALLBACK_DOCUMENT, file.data.into_owned()),
        None => (StatusCode::NOT_FOUND, "Not Found").into_response(),
    }
}

fn file_response(key: &str, body: Vec<u8>) -> Response {
    let mime = mime_guess::from_path(key).first_or_octet_stream();
    ([(header::CONTENT_TYPE, mime.essence_str().to_string())], body).into_response()
}
