//! Error types for the token crate.

use thiserror::Error;

/// Errors from key handling, minting and verification.
#[derive(Debug, Error)]
pub enum TokenError {
    #[error("could not generate signing key: {0}")]
    KeyGenerationFailed(String),

    /// Private key hex is not a valid Ed25519 key.
    #[error("invalid private key: {0}")]
    InvalidPrivateKey(String),

    /// Public key hex is not a valid Ed25519 key.
    #[error("invalid public key: {0}")]
    InvalidPublicKey(String),

    #[error("could not build access token: {0}")]
    TokenCreationFailed(String),

    /// Malformed token, or signed by a different key.
    #[error("unreadable access token: {0}")]
    TokenParseFailed(String),

    /// Authorizer could not be built or queried.
    #[error("could not evaluate access token: {0}")]
    VerificationFailed(String),

    /// A mandatory fact (`base_url`, `path`) is absent.
    #[error("access token lacks `{claim}`")]
    MissingClaim { claim: String },

    #[error("could not encode access token: {0}")]
    SerializationError(String),

    /// Reading or writing key files.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}
