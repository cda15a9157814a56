//! The provider trait and its reqwest implementation.

use crate::error::ProviderError;
use async_trait::async_trait;
use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use streamgate_core::ProviderConfig;

/// Validity window of a signed playback token, in seconds (12 hours).
pub const PLAYBACK_TOKEN_TTL_SECS: i64 = 12 * 60 * 60;

/// Operations the gateway needs from the video provider.
#[async_trait]
pub trait VideoProvider: Send + Sync {
    /// Create a direct-upload session and return its upload URL.
    async fn create_direct_upload(
        &self,
        max_duration_secs: u32,
        require_signed_urls: bool,
    ) -> Result<String, ProviderError>;

    /// Sign a playback token for `video_id`, expiring
    /// [`PLAYBACK_TOKEN_TTL_SECS`] from now.
    async fn signed_playback_token(&self, video_id: &str) -> Result<String, ProviderError>;

    /// Id of the first account visible to the given credentials.
    async fn first_account_id(&self, email: &str, api_key: &str) -> Result<String, ProviderError>;
}

/// Credentials the gateway itself uses for provider calls.
#[derive(Debug, Clone, Default)]
struct Credentials {
    account_id: Option<String>,
    email: Option<String>,
    api_key: Option<String>,
}

/// reqwest client for the provider REST API.
pub struct StreamClient {
    http: reqwest::Client,
    base_url: String,
    credentials: Credentials,
}

#[derive(Debug, Deserialize)]
struct ApiMessage {
    #[serde(default)]
    code: i64,
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    errors: Vec<ApiMessage>,
    result: Option<T>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DirectUploadRequest {
    max_duration_seconds: u32,
    #[serde(rename = "requireSignedURLs")]
    require_signed_urls: bool,
}

#[derive(Debug, Deserialize)]
struct DirectUploadResult {
    #[serde(rename = "uploadURL")]
    upload_url: Option<String>,
}

#[derive(Debug, Serialize)]
struct TokenRequest {
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResult {
    token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Account {
    id: String,
}

impl StreamClient {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            credentials: Credentials::default(),
        }
    }

    /// Build a client from configuration. Missing credentials are not an
    /// error here; calls that need them fail with
    /// [`ProviderError::MissingCredential`].
    pub fn from_config(config: &ProviderConfig) -> Self {
        let client = Self::new(reqwest::Client::new(), config.base_url());
        let credentials = Credentials {
            account_id: config.resolve_account_id(),
            email: config.resolve_email(),
            api_key: config.resolve_api_key(),
        };
        if credentials.account_id.is_none() || credentials.api_key.is_none() {
            tracing::warn!("Provider account id or API key not set; upload and playback calls will fail");
        }
        Self {
            credentials,
            ..client
        }
    }

    pub fn with_credentials(
        mut self,
        account_id: impl Into<String>,
        email: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        self.credentials = Credentials {
            account_id: Some(account_id.into()),
            email: Some(email.into()),
            api_key: Some(api_key.into()),
        };
        self
    }

    fn account_url(&self, suffix: &str) -> Result<String, ProviderError> {
        let account = self
            .credentials
            .account_id
            .as_deref()
            .ok_or(ProviderError::MissingCredential("account id"))?;
        Ok(format!("{}/accounts/{}/{}", self.base_url, account, suffix))
    }

    fn own_auth(&self) -> Result<(&str, &str), ProviderError> {
        let email = self
            .credentials
            .email
            .as_deref()
            .ok_or(ProviderError::MissingCredential("email"))?;
        let api_key = self
            .credentials
            .api_key
            .as_deref()
            .ok_or(ProviderError::MissingCredential("API key"))?;
        Ok((email, api_key))
    }

    async fn post_json<B, T>(&self, url: String, body: &B) -> Result<T, ProviderError>
    where
        B: Serialize + Sync,
        T: DeserializeOwned,
    {
        let (email, api_key) = self.own_auth()?;
        let response = self
            .http
            .post(url)
            .header("X-Auth-Email", email)
            .header("X-Auth-Key", api_key)
            .json(body)
            .send()
            .await?;
        read_envelope(response).await
    }
}

async fn read_envelope<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ProviderError> {
    let status = response.status();
    let text = response.text().await?;

    let envelope: Envelope<T> = match serde_json::from_str(&text) {
        Ok(envelope) => envelope,
        Err(_) if !status.is_success() => {
            return Err(ProviderError::Api {
                status: status.as_u16(),
                message: text.chars().take(200).collect(),
            });
        }
        Err(_) => return Err(ProviderError::MissingField("result")),
    };

    if !status.is_success() || !envelope.success {
        let message = if envelope.errors.is_empty() {
            "request was not successful".to_string()
        } else {
            envelope
                .errors
                .iter()
                .map(|e| format!("{} ({})", e.message, e.code))
                .collect::<Vec<_>>()
                .join("; ")
        };
        return Err(ProviderError::Api {
            status: status.as_u16(),
            message,
        });
    }

    envelope.result.ok_or(ProviderError::MissingField("result"))
}

#[async_trait]
impl VideoProvider for StreamClient {
    async fn create_direct_upload(
        &self,
        max_duration_secs: u32,
        require_signed_urls: bool,
    ) -> Result<String, ProviderError> {
        let url = self.account_url("stream/direct_upload")?;
        let body = DirectUploadRequest {
            max_duration_seconds: max_duration_secs,
            require_signed_urls,
        };
        let result: DirectUploadResult = self.post_json(url, &body).await?;
        tracing::debug!("Created direct upload session");
        result
            .upload_url
            .ok_or(ProviderError::MissingField("result.uploadURL"))
    }

    async fn signed_playback_token(&self, video_id: &str) -> Result<String, ProviderError> {
        let url = self.account_url(&format!("stream/{}/token", urlencoding::encode(video_id)))?;
        let body = TokenRequest {
            exp: Utc::now().timestamp() + PLAYBACK_TOKEN_TTL_SECS,
        };
        let result: TokenResult = self.post_json(url, &body).await?;
        tracing::debug!(video_id = %video_id, "Signed playback token");
        result.token.ok_or(ProviderError::MissingField("result.token"))
    }

    async fn first_account_id(&self, email: &str, api_key: &str) -> Result<String, ProviderError> {
        let response = self
            .http
            .get(format!("{}/accounts", self.base_url))
            .header("X-Auth-Email", email)
            .header("X-Auth-Key", api_key)
            .send()
            .await?;
        let accounts: Vec<Account> = read_envelope(response).await?;
        accounts
            .into_iter()
            .next()
            .map(|a| a.id)
            .ok_or(ProviderError::MissingField("result[0].id"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use serde_json::json;

    fn client(base: &str) -> StreamClient {
        StreamClient::new(reqwest::Client::new(), base).with_credentials(
            "acc-1",
            "ops@example.com",
            "global-key",
        )
    }

    #[tokio::test]
    async fn test_create_direct_upload() {
        let mut mock_server = mockito::Server::new_async().await;
        let mock = mock_server
            .mock("POST", "/accounts/acc-1/stream/direct_upload")
            .match_header("x-auth-email", "ops@example.com")
            .match_header("x-auth-key", "global-key")
            .match_body(Matcher::Json(json!({
                "maxDurationSeconds": 300,
                "requireSignedURLs": true
            })))
            .with_status(200)
            .with_body(
                json!({
                    "success": true,
                    "errors": [],
                    "result": { "uploadURL": "https://upload.example/xyz", "uid": "xyz" }
                })
                .to_string(),
            )
            .create_async()
            .await;

        let url = client(&mock_server.url())
            .create_direct_upload(300, true)
            .await
            .unwrap();
        assert_eq!(url, "https://upload.example/xyz");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_signed_playback_token_sends_twelve_hour_exp() {
        let mut mock_server = mockito::Server::new_async().await;
        let mock = mock_server
            .mock("POST", "/accounts/acc-1/stream/abc/token")
            .match_body(Matcher::Regex(r#"\{"exp":\d+\}"#.to_string()))
            .with_status(200)
            .with_body(r#"{"success":true,"errors":[],"result":{"token":"signed.tok"}}"#)
            .create_async()
            .await;

        let token = client(&mock_server.url())
            .signed_playback_token("abc")
            .await
            .unwrap();
        assert_eq!(token, "signed.tok");
        mock.assert_async().await;
        assert_eq!(PLAYBACK_TOKEN_TTL_SECS, 43_200);
    }

    #[tokio::test]
    async fn test_signed_playback_token_escapes_video_id() {
        let mut mock_server = mockito::Server::new_async().await;
        let mock = mock_server
            .mock("POST", "/accounts/acc-1/stream/a%3Fb%23c/token")
            .with_status(200)
            .with_body(r#"{"success":true,"errors":[],"result":{"token":"escaped.tok"}}"#)
            .create_async()
            .await;

        let token = client(&mock_server.url())
            .signed_playback_token("a?b#c")
            .await
            .unwrap();
        assert_eq!(token, "escaped.tok");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_first_account_uses_request_credentials() {
        let mut mock_server = mockito::Server::new_async().await;
        mock_server
            .mock("GET", "/accounts")
            .match_header("x-auth-email", "caller@example.com")
            .match_header("x-auth-key", "caller-key")
            .with_status(200)
            .with_body(r#"{"success":true,"errors":[],"result":[{"id":"first"},{"id":"second"}]}"#)
            .create_async()
            .await;

        let id = client(&mock_server.url())
            .first_account_id("caller@example.com", "caller-key")
            .await
            .unwrap();
        assert_eq!(id, "first");
    }

    #[tokio::test]
    async fn test_empty_account_list_is_an_error() {
        let mut mock_server = mockito::Server::new_async().await;
        mock_server
            .mock("GET", "/accounts")
            .with_status(200)
            .with_body(r#"{"success":true,"errors":[],"result":[]}"#)
            .create_async()
            .await;

        let result = client(&mock_server.url()).first_account_id("a", "b").await;
        assert!(matches!(result, Err(ProviderError::MissingField(_))));
    }

    #[tokio::test]
    async fn test_unsuccessful_envelope() {
        let mut mock_server = mockito::Server::new_async().await;
        mock_server
            .mock("POST", "/accounts/acc-1/stream/abc/token")
            .with_status(400)
            .with_body(r#"{"success":false,"errors":[{"code":10005,"message":"video not found"}],"result":null}"#)
            .create_async()
            .await;

        match client(&mock_server.url()).signed_playback_token("abc").await {
            Err(ProviderError::Api { status, message }) => {
                assert_eq!(status, 400);
                assert!(message.contains("video not found"));
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_missing_account_id() {
        let client = StreamClient::new(reqwest::Client::new(), "http://127.0.0.1:1");
        assert!(matches!(
            client.create_direct_upload(300, true).await,
            Err(ProviderError::MissingCredential("account id"))
        ));
    }
}
