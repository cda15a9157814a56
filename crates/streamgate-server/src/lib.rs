//! # streamgate-server
//!
//! The HTTP gateway. A single fallback handler matches each request against
//! an ordered route table ([`router::ROUTES`]) and hands it to one of the
//! endpoint handlers; everything else is served from the embedded static
//! site.
//!
//! | Path | GET | POST |
//! |------|-----|------|
//! | `/api/video_id` | signed playback token (401 unless authorized) | |
//! | `/api/get_direct_upload_auth` | direct upload URL | `Testing` |
//! | `/wallet/{address}` | stored credential | write-once credential |
//! | `/api/new_video` | `{"path":"./newvideo"}` | store `{id, value}` |
//! | `/api/videos` | key listing | `{url, data}` for `{key}` |
//! | `/account` | greeting | first account id for `{email, globalAPI}` |

pub mod assets;
pub mod error;
pub mod handlers;
pub mod router;
pub mod state;

pub use error::GatewayError;
pub use router::{Endpoint, PathPattern, Route, create_router, resolve};
pub use state::AppState;

use std::future::Future;
use std::sync::Arc;

/// Bind `bind_address` and serve until `shutdown` completes.
pub async fn serve<F>(state: AppState, bind_address: &str, shutdown: F) -> Result<(), GatewayError>
where
    F: Future<Output = ()> + Send + 'static,
{
    for path in router::UNAUTHENTICATED_ROUTES {
        tracing::warn!(path = %path, "Route is reachable without authentication");
    }

    let app = create_router(Arc::new(state));
    let listener = tokio::net::TcpListener::bind(bind_address)
        .await
        .map_err(|e| GatewayError::StartupFailed(format!("failed to bind {bind_address}: {e}")))?;

    tracing::info!(address = %bind_address, "Streamgate listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    tracing::info!("Streamgate stopped");
    Ok(())
}
