//! Access-token verification configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Where the gateway finds the public key that verifies access tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenConfig {
    /// Environment variable containing the public key (hex-encoded).
    #[serde(default = "default_public_key_env")]
    pub public_key_env: Option<String>,

    /// Path to the public key file.
    #[serde(default)]
    pub public_key_file: Option<PathBuf>,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            public_key_env: default_public_key_env(),
            public_key_file: None,
        }
    }
}

fn default_public_key_env() -> Option<String> {
    Some("STREAMGATE_PUBLIC_KEY".to_string())
}

impl TokenConfig {
    /// Resolve the public key from environment or file.
    pub fn resolve_public_key(&self) -> Result<Option<String>, std::io::Error> {
        // Try environment variable first
        if let Some(env_var) = &self.public_key_env
            && let Ok(key) = std::env::var(env_var)
        {
            return Ok(Some(key.trim().to_string()));
        }

        if let Some(path) = &self.public_key_file
            && path.exists()
        {
            let key = std::fs::read_to_string(path)?;
            return Ok(Some(key.trim().to_string()));
        }

        Ok(None)
    }
}
