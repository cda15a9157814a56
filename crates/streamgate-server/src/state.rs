use crate::error::GatewayError;
use std::sync::Arc;
use streamgate_core::{Allowlist, GatewayConfig};
use streamgate_kv::{KvNamespaces, open_namespaces};
use streamgate_stream::{StreamClient, VideoProvider};
use streamgate_token::{BiscuitVerifier, TokenVerifier, load_public_key};

/// Shared, read-only state handed to every request.
pub struct AppState {
    /// Send error text in 500 responses.
    pub debug: bool,
    /// Largest request body the handlers read.
    pub body_limit: usize,
    /// Base URLs allowed to request playback tokens.
    pub allowlist: Allowlist,
    pub verifier: Arc<dyn TokenVerifier>,
    pub kv: KvNamespaces,
    pub provider: Arc<dyn VideoProvider>,
}

impl AppState {
    /// Build the state from explicit collaborators, with default limits.
    pub fn new(
        allowlist: Allowlist,
        verifier: Arc<dyn TokenVerifier>,
        kv: KvNamespaces,
        provider: Arc<dyn VideoProvider>,
    ) -> Self {
        Self {
            debug: false,
            body_limit: streamgate_core::ServerConfig::default().body_limit_bytes,
            allowlist,
            verifier,
            kv,
            provider,
        }
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Resolve keys, open the KV backend and build the provider client.
    pub async fn from_config(config: &GatewayConfig) -> Result<Self, GatewayError> {
        let public_key = config.token.resolve_public_key()?.ok_or_else(|| {
            GatewayError::StartupFailed(
                "no token public key; set token.public_key_env or token.public_key_file".into(),
            )
        })?;
        let verifier = BiscuitVerifier::new(load_public_key(&public_key)?);

        let allowlist = config.resolve_allowlist();
        if allowlist.is_empty() {
            tracing::warn!("Allowlist is empty; every playback request will be rejected");
        } else {
            tracing::info!(entries = allowlist.len(), "Loaded base URL allowlist");
        }

        let kv = open_namespaces(&config.kv, &config.provider).await?;
        let provider = StreamClient::from_config(&config.provider);

        Ok(Self {
            debug: config.debug,
            body_limit: config.server.body_limit_bytes,
            allowlist,
            verifier: Arc::new(verifier),
            kv,
            provider: Arc::new(provider),
        })
    }
}
