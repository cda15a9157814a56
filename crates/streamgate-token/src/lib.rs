//! # streamgate-token
//!
//! Signed access tokens for the Streamgate gateway.
//!
//! A playback request carries an opaque token in its `jwt` query parameter.
//! This crate decodes that token into [`AccessClaims`] and reports whether it
//! is currently valid. The router never builds claims itself; it only sees
//! the [`Verification`] returned by a [`TokenVerifier`].
//!
//! Tokens are Biscuit tokens signed with Ed25519. The authority block holds
//! one fact per claim:
//!
//! | Fact | Meaning |
//! |------|---------|
//! | `base_url($u)` | Origin the token was issued for |
//! | `path($p)` | Resource path; its first segment is the video id |
//! | `org_id($o)`, `role($r)`, `extra_data($d)` | Scoping claims |
//! | `expires_at($t)` | Unix expiry, also enforced by a `time` check |
//!
//! A token that fails to parse or whose signature does not match is an
//! error. A well-formed token whose checks fail (for instance because it
//! expired) verifies with `verified == false`.

pub mod claims;
pub mod error;
pub mod keys;
pub mod token;

pub use biscuit_auth::PublicKey;
pub use claims::AccessClaims;
pub use error::TokenError;
pub use keys::{KeyPair, load_public_key, load_public_key_hex};
pub use token::{
    BiscuitVerifier, TokenInfo, TokenIssuer, TokenVerifier, Verification,
    inspect_token_unverified,
};
