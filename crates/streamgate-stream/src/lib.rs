//! # streamgate-stream
//!
//! Client for the upstream video provider (Cloudflare Stream API shape).
//!
//! The gateway needs three calls from the provider:
//!
//! - create a direct-upload session and hand back its upload URL,
//! - sign a playback token for a video, valid for twelve hours,
//! - list the accounts visible to a set of credentials.
//!
//! They are exposed through the [`VideoProvider`] trait so the router can be
//! tested against a stub; [`StreamClient`] is the reqwest implementation.

pub mod client;
pub mod error;

pub use client::{PLAYBACK_TOKEN_TTL_SECS, StreamClient, VideoProvider};
pub use error::ProviderError;
