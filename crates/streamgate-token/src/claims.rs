//! Claims carried by an access token.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Claims decoded from an access token.
///
/// `org_id`, `role` and `extra_data` are optional in the token itself; a
/// token minted for plain public playback carries them as empty strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessClaims {
    /// Origin the token was issued for.
    pub base_url: String,

    /// Resource path, e.g. `/<video id>/...`.
    pub path: String,

    #[serde(default)]
    pub org_id: Option<String>,

    #[serde(default)]
    pub role: Option<String>,

    #[serde(default)]
    pub extra_data: Option<String>,

    /// When the token stops verifying.
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

impl AccessClaims {
    /// Claims for public playback: empty scoping claims and no expiry.
    pub fn new(base_url: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            path: path.into(),
            org_id: Some(String::new()),
            role: Some(String::new()),
            extra_data: Some(String::new()),
            expires_at: None,
        }
    }

    pub fn with_org_id(mut self, org_id: impl Into<String>) -> Self {
        self.org_id = Some(org_id.into());
        self
    }

    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }

    pub fn with_extra_data(mut self, extra_data: impl Into<String>) -> Self {
        self.extra_data = Some(extra_data.into());
        self
    }

    /// First segment of `path`: `/abc123/x` → `abc123`.
    ///
    /// Returns `None` when the path has no such segment.
    pub fn first_path_segment(&self) -> Option<&str> {
        self.path.split('/').nth(1).filter(|s| !s.is_empty())
    }

    /// Check if the claims have expired.
    pub fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|exp| Utc::now() > exp)
    }
}
