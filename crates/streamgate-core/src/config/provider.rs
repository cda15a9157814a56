//! Upstream video provider configuration.
//!
//! The provider is addressed with an account id and authenticated with an
//! email + global API key pair. Each value can come from an environment
//! variable (checked first) or be written inline.

use super::resolve_secret;
use serde::{Deserialize, Serialize};

/// Configuration for the upstream video provider API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Base URL of the provider REST API.
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Environment variable containing the account id.
    #[serde(default = "default_account_id_env")]
    pub account_id_env: Option<String>,

    /// Account id (used when the env variable is unset).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_id: Option<String>,

    /// Environment variable containing the account email.
    #[serde(default = "default_email_env")]
    pub email_env: Option<String>,

    /// Account email (used when the env variable is unset).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// Environment variable containing the global API key.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: Option<String>,

    /// Global API key. Prefer `api_key_env`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            account_id_env: default_account_id_env(),
            account_id: None,
            email_env: default_email_env(),
            email: None,
            api_key_env: default_api_key_env(),
            api_key: None,
        }
    }
}

impl ProviderConfig {
    pub fn resolve_account_id(&self) -> Option<String> {
        resolve_secret(self.account_id_env.as_deref(), self.account_id.as_deref())
    }

    pub fn resolve_email(&self) -> Option<String> {
        resolve_secret(self.email_env.as_deref(), self.email.as_deref())
    }

    pub fn resolve_api_key(&self) -> Option<String> {
        resolve_secret(self.api_key_env.as_deref(), self.api_key.as_deref())
    }

    /// Base URL without a trailing slash.
    pub fn base_url(&self) -> &str {
        self.api_base_url.trim_end_matches('/')
    }
}

fn default_api_base_url() -> String {
    "https://api.cloudflare.com/client/v4".to_string()
}

fn default_account_id_env() -> Option<String> {
    Some("ACCOUNT_ID".to_string())
}

fn default_email_env() -> Option<String> {
    Some("CF_EMAIL".to_string())
}

fn default_api_key_env() -> Option<String> {
    Some("CF_GLOBAL_API".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_takes_precedence_over_inline() {
        // SAFETY: test-only variable with a unique name
        unsafe {
            std::env::set_var("SG_TEST_PROVIDER_ACCOUNT", "from-env");
        }
        let cfg = ProviderConfig {
            account_id_env: Some("SG_TEST_PROVIDER_ACCOUNT".into()),
            account_id: Some("inline".into()),
            ..ProviderConfig::default()
        };
        assert_eq!(cfg.resolve_account_id().as_deref(), Some("from-env"));
    }

    #[test]
    fn test_inline_used_when_env_unset() {
        let cfg = ProviderConfig {
            email_env: Some("SG_TEST_PROVIDER_EMAIL_UNSET".into()),
            email: Some("ops@example.com".into()),
            ..ProviderConfig::default()
        };
        assert_eq!(cfg.resolve_email().as_deref(), Some("ops@example.com"));
    }

    #[test]
    fn test_base_url_trims_slash() {
        let cfg = ProviderConfig {
            api_base_url: "http://127.0.0.1:1234/".into(),
            ..ProviderConfig::default()
        };
        assert_eq!(cfg.base_url(), "http://127.0.0.1:1234");
    }
}
