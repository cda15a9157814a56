//! Configuration types for the Streamgate gateway.
//!
//! The whole configuration lives in one YAML file. Every section is optional
//! and falls back to defaults named after the Workers deployment bindings
//! (`ACCOUNT_ID`, `CF_EMAIL`, `CF_GLOBAL_API`, `WHITE_LIST`).
//!
//! ```yaml
//! server:
//!   listen_addr: 0.0.0.0
//!   listen_port: 8787
//! debug: false
//! token:
//!   public_key_file: keys/public.key
//! provider:
//!   account_id_env: ACCOUNT_ID
//! kv:
//!   backend: sqlite
//!   sqlite_path: data/streamgate.sqlite
//! allowlist:
//!   - https://app.example.com
//! ```
//!
//! Secrets are never stored in the struct in resolved form; they are looked up
//! from the environment (or an inline fallback) when a component is built.

pub mod allowlist;
pub mod kv;
pub mod provider;
pub mod server;
pub mod token;

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub use allowlist::Allowlist;
pub use kv::{KvBackend, KvConfig, NamespaceConfig};
pub use provider::ProviderConfig;
pub use server::ServerConfig;
pub use token::TokenConfig;

/// Environment variable holding the config file path.
pub const CONFIG_PATH_ENV: &str = "STREAMGATE_CONFIG";

/// Config file used when neither `--config` nor `STREAMGATE_CONFIG` is set.
pub const DEFAULT_CONFIG_FILE: &str = "streamgate.yaml";

/// Complete gateway configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct GatewayConfig {
    /// HTTP listener settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Reveal internal error text in 500 responses.
    #[serde(default)]
    pub debug: bool,

    /// Access-token verification keys.
    #[serde(default)]
    pub token: TokenConfig,

    /// Upstream video provider account and credentials.
    #[serde(default)]
    pub provider: ProviderConfig,

    /// Key-value backend and namespace bindings.
    #[serde(default)]
    pub kv: KvConfig,

    /// Base URLs permitted to request playback tokens.
    #[serde(default)]
    pub allowlist: Vec<String>,

    /// Environment variable holding a comma-separated allowlist.
    /// Merged with `allowlist`.
    #[serde(default = "default_allowlist_env")]
    pub allowlist_env: Option<String>,
}

fn default_allowlist_env() -> Option<String> {
    Some("WHITE_LIST".to_string())
}

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("configuration error: {0}")]
    Invalid(String),
}

/// Severity of a validation finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FindingLevel {
    Warning,
    Error,
}

/// One problem reported by [`GatewayConfig::validate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    pub level: FindingLevel,
    /// Dotted path of the offending field, e.g. `provider.account_id`.
    pub field: String,
    pub message: String,
}

impl Finding {
    fn error(field: &str, message: impl Into<String>) -> Self {
        Self {
            level: FindingLevel::Error,
            field: field.to_string(),
            message: message.into(),
        }
    }

    fn warning(field: &str, message: impl Into<String>) -> Self {
        Self {
            level: FindingLevel::Warning,
            field: field.to_string(),
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.level == FindingLevel::Error
    }
}

impl GatewayConfig {
    /// Load configuration from a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML content.
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(content).map_err(ConfigError::from)
    }

    /// Load from `path`, or from `STREAMGATE_CONFIG`, or from
    /// `streamgate.yaml` in the working directory. A missing default file
    /// yields the default configuration; an explicitly named one is an error.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = path {
            return Self::from_file(path);
        }
        if let Ok(p) = std::env::var(CONFIG_PATH_ENV) {
            return Self::from_file(p);
        }
        let default_path = Path::new(DEFAULT_CONFIG_FILE);
        if default_path.exists() {
            Self::from_file(default_path)
        } else {
            Ok(Self::default())
        }
    }

    /// Build the allowlist from the inline list and the env variable.
    pub fn resolve_allowlist(&self) -> Allowlist {
        let mut list = Allowlist::from_entries(self.allowlist.iter().cloned());
        if let Some(env_var) = &self.allowlist_env
            && let Ok(raw) = std::env::var(env_var)
        {
            list.extend(Allowlist::from_csv(&raw));
        }
        list
    }

    /// Check the configuration for values that would make the gateway
    /// unusable at runtime.
    pub fn validate(&self) -> Vec<Finding> {
        let mut findings = Vec::new();

        if self.server.listen_port == 0 {
            findings.push(Finding::error("server.listen_port", "port must be non-zero"));
        }

        if self.token.public_key_env.is_none() && self.token.public_key_file.is_none() {
            findings.push(Finding::error(
                "token",
                "no public key source; set public_key_env or public_key_file",
            ));
        } else if matches!(self.token.resolve_public_key(), Ok(None)) {
            findings.push(Finding::warning(
                "token",
                "public key could not be resolved from the environment or file",
            ));
        }

        if self.provider.resolve_account_id().is_none() {
            findings.push(Finding::error(
                "provider.account_id",
                "provider account id is not set",
            ));
        }
        if self.provider.resolve_email().is_none() || self.provider.resolve_api_key().is_none() {
            findings.push(Finding::warning(
                "provider",
                "provider email or API key is not set; upstream calls will be rejected",
            ));
        }
        if !self.provider.api_base_url.starts_with("http://")
            && !self.provider.api_base_url.starts_with("https://")
        {
            findings.push(Finding::error(
                "provider.api_base_url",
                format!("not an http(s) URL: {}", self.provider.api_base_url),
            ));
        }

        findings.extend(self.kv.validate());

        if self.resolve_allowlist().is_empty() {
            findings.push(Finding::warning(
                "allowlist",
                "allowlist is empty; every playback request will be rejected",
            ));
        }

        findings
    }
}

/// Look up a secret from an env variable first, then an inline value.
pub(crate) fn resolve_secret(env_var: Option<&str>, inline: Option<&str>) -> Option<String> {
    if let Some(var) = env_var
        && let Ok(value) = std::env::var(var)
        && !value.is_empty()
    {
        return Some(value);
    }
    inline.filter(|v| !v.is_empty()).map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
server:
  listen_port: 9000
debug: true
token:
  public_key_env: SG_TEST_UNSET_PUBLIC_KEY
provider:
  account_id: acc-123
  email: ops@example.com
  api_key: secret
  account_id_env: null
  email_env: null
  api_key_env: null
kv:
  backend: memory
allowlist:
  - https://a.example.com
allowlist_env: null
"#;

    #[test]
    fn test_parse_sample_config() {
        let cfg = GatewayConfig::from_yaml(SAMPLE).unwrap();
        assert_eq!(cfg.server.listen_port, 9000);
        assert_eq!(cfg.server.listen_addr, "0.0.0.0");
        assert!(cfg.debug);
        assert_eq!(cfg.kv.backend, KvBackend::Memory);
        assert_eq!(cfg.provider.resolve_account_id().as_deref(), Some("acc-123"));
        assert!(cfg.resolve_allowlist().contains("https://a.example.com"));
    }

    #[test]
    fn test_defaults_use_worker_binding_names() {
        let cfg = GatewayConfig::default();
        assert_eq!(cfg.provider.account_id_env.as_deref(), Some("ACCOUNT_ID"));
        assert_eq!(cfg.provider.email_env.as_deref(), Some("CF_EMAIL"));
        assert_eq!(cfg.provider.api_key_env.as_deref(), Some("CF_GLOBAL_API"));
        assert_eq!(
            GatewayConfig::from_yaml("{}").unwrap().allowlist_env.as_deref(),
            Some("WHITE_LIST")
        );
        assert!(!cfg.debug);
    }

    #[test]
    fn test_validate_reports_missing_token_source() {
        let mut cfg = GatewayConfig::from_yaml(SAMPLE).unwrap();
        cfg.token.public_key_env = None;
        let findings = cfg.validate();
        assert!(findings.iter().any(|f| f.field == "token" && f.is_error()));
    }

    #[test]
    fn test_validate_sample_has_no_errors() {
        let cfg = GatewayConfig::from_yaml(SAMPLE).unwrap();
        let errors: Vec<_> = cfg.validate().into_iter().filter(|f| f.is_error()).collect();
        assert!(errors.is_empty(), "unexpected errors: {errors:?}");
    }

    #[test]
    fn test_load_from_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gw.yaml");
        fs::write(&path, SAMPLE).unwrap();

        let cfg = GatewayConfig::load(Some(&path)).unwrap();
        assert_eq!(cfg.server.listen_port, 9000);

        let missing = dir.path().join("nope.yaml");
        assert!(matches!(
            GatewayConfig::load(Some(&missing)),
            Err(ConfigError::Io(_))
        ));
    }

    #[test]
    fn test_sample_validates_against_schema() {
        let instance: serde_json::Value = serde_yaml::from_str(SAMPLE).unwrap();
        let schema: serde_json::Value =
            serde_json::from_str(include_str!("../../../../schemas/GatewayConfig.schema.json"))
                .expect("schema must parse");

        let validator = jsonschema::draft202012::options()
            .build(&schema)
            .expect("schema must compile");

        assert!(validator.is_valid(&instance));
    }
}
