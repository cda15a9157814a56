//! The `KvStore` trait, the in-memory backend and the backend factory.

use crate::cloudflare::{CloudflareKvStore, KvAuth};
use crate::error::KvError;
use crate::sqlite::SqliteStore;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use streamgate_core::{KvBackend, KvConfig, ProviderConfig};
use tokio::sync::RwLock;

/// One key in a namespace listing.
///
/// Serializes to the `{ "name": ... }` object shape of a Workers KV listing;
/// `expiration` and `metadata` are only present when the backend has them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyEntry {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiration: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

impl KeyEntry {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            expiration: None,
            metadata: None,
        }
    }
}

/// A single key-value namespace.
#[async_trait]
pub trait KvStore: Send + Sync {
    /// Read a value; `None` when the key is absent.
    async fn get(&self, key: &str) -> Result<Option<String>, KvError>;

    /// Write a value, replacing any previous one.
    async fn put(&self, key: &str, value: &str) -> Result<(), KvError>;

    /// List every key in the namespace, in key order.
    async fn list(&self) -> Result<Vec<KeyEntry>, KvError>;
}

/// In-memory namespace.
#[derive(Default)]
pub struct MemoryStore {
    entries: RwLock<BTreeMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KvStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, KvError> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn put(&self, key: &str, value: &str) -> Result<(), KvError> {
        self.entries
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn list(&self) -> Result<Vec<KeyEntry>, KvError> {
        Ok(self
            .entries
            .read()
            .await
            .keys()
            .map(KeyEntry::new)
            .collect())
    }
}

/// The two namespaces the gateway works with.
#[derive(Clone)]
pub struct KvNamespaces {
    pub wallets: Arc<dyn KvStore>,
    pub videos: Arc<dyn KvStore>,
}

impl KvNamespaces {
    /// Two fresh in-memory namespaces.
    pub fn in_memory() -> Self {
        Self {
            wallets: Arc::new(MemoryStore::new()),
            videos: Arc::new(MemoryStore::new()),
        }
    }
}

/// Open both namespaces for the configured backend.
///
/// The Workers KV backend authenticates with `kv.api_token_env` when set and
/// otherwise reuses the provider account's email + API key.
pub async fn open_namespaces(
    kv: &KvConfig,
    provider: &ProviderConfig,
) -> Result<KvNamespaces, KvError> {
    let ns = &kv.namespaces;
    match kv.backend {
        KvBackend::Memory => {
            tracing::warn!("Using in-memory KV backend; records will not survive a restart");
            Ok(KvNamespaces::in_memory())
        }
        KvBackend::Sqlite => {
            let pool = SqliteStore::open_pool(&kv.sqlite_path).await?;
            tracing::info!(path = %kv.sqlite_path, "Opened SQLite KV backend");
            Ok(KvNamespaces {
                wallets: Arc::new(SqliteStore::new(pool.clone(), &ns.wallets)),
                videos: Arc::new(SqliteStore::new(pool, &ns.videos)),
            })
        }
        KvBackend::Cloudflare => {
            let account_id = provider.resolve_account_id().ok_or_else(|| {
                KvError::InitializationFailed("provider account id is not set".into())
            })?;
            let auth = match kv.resolve_api_token() {
                Some(token) => KvAuth::ApiToken(token),
                None => KvAuth::GlobalKey {
                    email: provider.resolve_email().ok_or_else(|| {
                        KvError::InitializationFailed("provider email is not set".into())
                    })?,
                    api_key: provider.resolve_api_key().ok_or_else(|| {
                        KvError::InitializationFailed("provider API key is not set".into())
                    })?,
                },
            };
            let client = reqwest::Client::new();
            tracing::info!(
                wallets = %ns.wallets,
                videos = %ns.videos,
                "Using Workers KV backend"
            );
            let store = |namespace: &str| {
                CloudflareKvStore::new(
                    client.clone(),
                    provider.base_url(),
                    &account_id,
                    namespace,
                    auth.clone(),
                )
            };
            Ok(KvNamespaces {
                wallets: Arc::new(store(&ns.wallets)),
                videos: Arc::new(store(&ns.videos)),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_get_put_list() {
        let store = MemoryStore::new();
        assert_eq!(store.get("a").await.unwrap(), None);

        store.put("b", "2").await.unwrap();
        store.put("a", "1").await.unwrap();
        store.put("a", "3").await.unwrap();

        assert_eq!(store.get("a").await.unwrap().as_deref(), Some("3"));
        let names: Vec<_> = store.list().await.unwrap().into_iter().map(|e| e.name).collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn test_key_entry_serializes_as_name_object() {
        let json = serde_json::to_string(&KeyEntry::new("v1")).unwrap();
        assert_eq!(json, r#"{"name":"v1"}"#);
    }

    #[tokio::test]
    async fn test_namespaces_are_independent() {
        let kv = KvNamespaces::in_memory();
        kv.wallets.put("k", "wallet").await.unwrap();
        assert_eq!(kv.videos.get("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_open_sqlite_namespaces() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = KvConfig {
            backend: KvBackend::Sqlite,
            sqlite_path: dir.path().join("nested/kv.sqlite").display().to_string(),
            ..KvConfig::default()
        };

        let kv = open_namespaces(&cfg, &ProviderConfig::default()).await.unwrap();
        kv.videos.put("v1", "x").await.unwrap();
        assert_eq!(kv.videos.get("v1").await.unwrap().as_deref(), Some("x"));
        assert_eq!(kv.wallets.get("v1").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_cloudflare_requires_account() {
        let cfg = KvConfig {
            backend: KvBackend::Cloudflare,
            ..KvConfig::default()
        };
        let provider = ProviderConfig {
            account_id_env: None,
            account_id: None,
            ..ProviderConfig::default()
        };
        assert!(matches!(
            open_namespaces(&cfg, &provider).await,
            Err(KvError::InitializationFailed(_))
        ));
    }
}
