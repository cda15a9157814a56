//! Error types for the provider client.

use thiserror::Error;

/// Errors returned by [`crate::VideoProvider`] calls.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// A credential needed for the call is not configured.
    #[error("provider {0} is not configured")]
    MissingCredential(&'static str),

    /// Transport or decoding failure.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The provider answered with `success: false` or a non-2xx status.
    #[error("provider returned {status}: {message}")]
    Api { status: u16, message: String },

    /// The response envelope lacked an expected field.
    #[error("provider response is missing {0}")]
    MissingField(&'static str),
}
