//! Key-value backend configuration.
//!
//! The gateway reads and writes two independent namespaces: one for wallet
//! credentials and one for video metadata. What a namespace id means depends
//! on the backend: a Workers KV namespace id for `cloudflare`, a partition
//! label inside the SQLite table for `sqlite`, and only a log label for
//! `memory`.

use super::{Finding, resolve_secret};
use serde::{Deserialize, Serialize};

/// Which KV implementation to use.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum KvBackend {
    /// Process-local maps; contents are lost on restart.
    #[default]
    Memory,
    /// Local SQLite file.
    Sqlite,
    /// Cloudflare Workers KV over its REST API.
    Cloudflare,
}

/// Namespace bindings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NamespaceConfig {
    /// Namespace holding wallet credentials (the worker's `LIT_KV`).
    #[serde(default = "default_wallets_ns")]
    pub wallets: String,

    /// Namespace holding video metadata (the worker's `VIDEOS`).
    #[serde(default = "default_videos_ns")]
    pub videos: String,
}

impl Default for NamespaceConfig {
    fn default() -> Self {
        Self {
            wallets: default_wallets_ns(),
            videos: default_videos_ns(),
        }
    }
}

/// Key-value configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KvConfig {
    #[serde(default)]
    pub backend: KvBackend,

    /// SQLite database file (sqlite backend).
    #[serde(default = "default_sqlite_path")]
    pub sqlite_path: String,

    #[serde(default)]
    pub namespaces: NamespaceConfig,

    /// Environment variable with an API token for the Workers KV REST API.
    /// When unset, the provider email + global key pair is used instead.
    #[serde(default)]
    pub api_token_env: Option<String>,
}

impl Default for KvConfig {
    fn default() -> Self {
        Self {
            backend: KvBackend::default(),
            sqlite_path: default_sqlite_path(),
            namespaces: NamespaceConfig::default(),
            api_token_env: None,
        }
    }
}

impl KvConfig {
    pub fn resolve_api_token(&self) -> Option<String> {
        resolve_secret(self.api_token_env.as_deref(), None)
    }

    pub(crate) fn validate(&self) -> Vec<Finding> {
        let mut findings = Vec::new();
        if self.namespaces.wallets.trim().is_empty() {
            findings.push(Finding::error("kv.namespaces.wallets", "namespace must not be empty"));
        }
        if self.namespaces.videos.trim().is_empty() {
            findings.push(Finding::error("kv.namespaces.videos", "namespace must not be empty"));
        }
        match self.backend {
            KvBackend::Memory => findings.push(Finding::warning(
                "kv.backend",
                "memory backend does not persist wallet or video records",
            )),
            KvBackend::Sqlite if self.sqlite_path.trim().is_empty() => {
                findings.push(Finding::error("kv.sqlite_path", "path must not be empty"));
            }
            KvBackend::Cloudflare if self.namespaces.wallets == self.namespaces.videos => {
                findings.push(Finding::warning(
                    "kv.namespaces",
                    "wallets and videos share one Workers KV namespace",
                ));
            }
            _ => {}
        }
        findings
    }
}

fn default_wallets_ns() -> String {
    "LIT_KV".to_string()
}

fn default_videos_ns() -> String {
    "VIDEOS".to_string()
}

fn default_sqlite_path() -> String {
    "data/streamgate.sqlite".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_parses_lowercase() {
        let cfg: KvConfig = serde_yaml::from_str("backend: cloudflare").unwrap();
        assert_eq!(cfg.backend, KvBackend::Cloudflare);
        assert_eq!(cfg.namespaces.wallets, "LIT_KV");
        assert_eq!(cfg.namespaces.videos, "VIDEOS");
    }

    #[test]
    fn test_empty_namespace_is_error() {
        let mut cfg = KvConfig::default();
        cfg.namespaces.videos = " ".into();
        assert!(cfg.validate().iter().any(|f| f.is_error()));
    }
}
