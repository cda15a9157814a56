//! Workers KV namespaces over the Cloudflare REST API.
//!
//! - `GET  {base}/accounts/{account}/storage/kv/namespaces/{ns}/values/{key}`
//! - `PUT  {base}/accounts/{account}/storage/kv/namespaces/{ns}/values/{key}`
//! - `GET  {base}/accounts/{account}/storage/kv/namespaces/{ns}/keys` (cursor paginated)

use crate::error::KvError;
use crate::storage::{KeyEntry, KvStore};
use async_trait::async_trait;
use reqwest::{RequestBuilder, StatusCode};
use serde::Deserialize;

/// Page size requested from the key listing endpoint.
const LIST_PAGE_SIZE: u32 = 1000;

/// Credentials for the REST API.
#[derive(Debug, Clone)]
pub enum KvAuth {
    /// Scoped API token sent as a bearer token.
    ApiToken(String),
    /// Account email + global API key headers.
    GlobalKey { email: String, api_key: String },
}

/// One Workers KV namespace.
pub struct CloudflareKvStore {
    http: reqwest::Client,
    namespace_url: String,
    auth: KvAuth,
}

#[derive(Debug, Deserialize)]
struct ApiMessage {
    #[serde(default)]
    code: i64,
    #[serde(default)]
    message: String,
}

#[derive(Debug, Default, Deserialize)]
struct ResultInfo {
    #[serde(default)]
    cursor: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    errors: Vec<ApiMessage>,
    result: Option<T>,
    #[serde(default)]
    result_info: Option<ResultInfo>,
}

impl<T> Envelope<T> {
    fn error_text(&self) -> String {
        if self.errors.is_empty() {
            return "request was not successful".to_string();
        }
        self.errors
            .iter()
            .map(|e| format!("{} ({})", e.message, e.code))
            .collect::<Vec<_>>()
            .join("; ")
    }
}

impl CloudflareKvStore {
    pub fn new(
        http: reqwest::Client,
        api_base_url: &str,
        account_id: &str,
        namespace_id: &str,
        auth: KvAuth,
    ) -> Self {
        let namespace_url = format!(
            "{}/accounts/{}/storage/kv/namespaces/{}",
            api_base_url.trim_end_matches('/'),
            account_id,
            namespace_id
        );
        Self {
            http,
            namespace_url,
            auth,
        }
    }

    fn value_url(&self, key: &str) -> String {
        format!("{}/values/{}", self.namespace_url, urlencoding::encode(key))
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.auth {
            KvAuth::ApiToken(token) => request.bearer_auth(token),
            KvAuth::GlobalKey { email, api_key } => request
                .header("X-Auth-Email", email)
                .header("X-Auth-Key", api_key),
        }
    }
}

async fn upstream_error(response: reqwest::Response) -> KvError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<Envelope<serde_json::Value>>(&body)
        .map(|env| env.error_text())
        .unwrap_or_else(|_| body.chars().take(200).collect());
    KvError::Upstream { status, message }
}

#[async_trait]
impl KvStore for CloudflareKvStore {
    async fn get(&self, key: &str) -> Result<Option<String>, KvError> {
        let response = self
            .authorize(self.http.get(self.value_url(key)))
            .send()
            .await?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            s if s.is_success() => Ok(Some(response.text().await?)),
            _ => Err(upstream_error(response).await),
        }
    }

    async fn put(&self, key: &str, value: &str) -> Result<(), KvError> {
        let response = self
            .authorize(self.http.put(self.value_url(key)))
            .header(reqwest::header::CONTENT_TYPE, "text/plain")
            .body(value.to_string())
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(upstream_error(response).await);
        }
        let envelope: Envelope<serde_json::Value> = response.json().await?;
        if !envelope.success {
            return Err(KvError::Upstream {
                status: 200,
                message: envelope.error_text(),
            });
        }
        Ok(())
    }

    async fn list(&self) -> Result<Vec<KeyEntry>, KvError> {
        let mut keys = Vec::new();
        let mut cursor: Option<String> = None;

        loop {
            let mut url = format!("{}/keys?limit={}", self.namespace_url, LIST_PAGE_SIZE);
            if let Some(c) = &cursor {
                url.push_str("&cursor=");
                url.push_str(&urlencoding::encode(c));
            }

            let response = self.authorize(self.http.get(url)).send().await?;
            if !response.status().is_success() {
                return Err(upstream_error(response).await);
            }
            let envelope: Envelope<Vec<KeyEntry>> = response.json().await?;
            if !envelope.success {
                return Err(KvError::Upstream {
                    status: 200,
                    message: envelope.error_text(),
                });
            }

            keys.extend(envelope.result.unwrap_or_default());
            cursor = envelope
                .result_info
                .and_then(|info| info.cursor)
                .filter(|c| !c.is_empty());
            if cursor.is_none() {
                break;
            }
        }

        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    const NS_PATH: &str = "/accounts/acc/storage/kv/namespaces/ns";

    fn store(base: &str) -> CloudflareKvStore {
        CloudflareKvStore::new(
            reqwest::Client::new(),
            base,
            "acc",
            "ns",
            KvAuth::GlobalKey {
                email: "ops@example.com".into(),
                api_key: "key".into(),
            },
        )
    }

    #[tokio::test]
    async fn test_get_existing_and_missing() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", format!("{NS_PATH}/values/k1").as_str())
            .match_header("x-auth-email", "ops@example.com")
            .match_header("x-auth-key", "key")
            .with_status(200)
            .with_body("value-1")
            .create_async()
            .await;
        server
            .mock("GET", format!("{NS_PATH}/values/missing").as_str())
            .with_status(404)
            .with_body(r#"{"success":false,"errors":[{"code":10009,"message":"key not found"}]}"#)
            .create_async()
            .await;

        let kv = store(&server.url());
        assert_eq!(kv.get("k1").await.unwrap().as_deref(), Some("value-1"));
        assert_eq!(kv.get("missing").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_put_sends_raw_value() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("PUT", format!("{NS_PATH}/values/0xabc").as_str())
            .match_body("encrypted-blob")
            .with_status(200)
            .with_body(r#"{"success":true,"errors":[],"result":null}"#)
            .create_async()
            .await;

        store(&server.url()).put("0xabc", "encrypted-blob").await.unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_list_follows_cursor() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", format!("{NS_PATH}/keys").as_str())
            .match_query(Matcher::Exact("limit=1000".into()))
            .with_status(200)
            .with_body(
                r#"{"success":true,"errors":[],"result":[{"name":"a"}],"result_info":{"count":1,"cursor":"c2"}}"#,
            )
            .create_async()
            .await;
        server
            .mock("GET", format!("{NS_PATH}/keys").as_str())
            .match_query(Matcher::Exact("limit=1000&cursor=c2".into()))
            .with_status(200)
            .with_body(
                r#"{"success":true,"errors":[],"result":[{"name":"b","expiration":1700000000}],"result_info":{"count":1,"cursor":""}}"#,
            )
            .create_async()
            .await;

        let keys = store(&server.url()).list().await.unwrap();
        assert_eq!(keys.len(), 2);
        assert_eq!(keys[0], KeyEntry::new("a"));
        assert_eq!(keys[1].name, "b");
        assert_eq!(keys[1].expiration, Some(1_700_000_000));
    }

    #[tokio::test]
    async fn test_upstream_error_is_reported() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", format!("{NS_PATH}/values/k").as_str())
            .with_status(403)
            .with_body(r#"{"success":false,"errors":[{"code":10000,"message":"Authentication error"}]}"#)
            .create_async()
            .await;

        match store(&server.url()).get("k").await {
            Err(KvError::Upstream { status, message }) => {
                assert_eq!(status, 403);
                assert!(message.contains("Authentication error"));
            }
            other => panic!("expected upstream error, got {other:?}"),
        }
    }
}
