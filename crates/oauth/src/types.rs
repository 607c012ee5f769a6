use std::fmt;

use {
    secrecy::Secret,
    serde::{Deserialize, Serialize},
    serde_json::{Map, Value},
    url::Url,
};

/// Resolved client registration and endpoints for the identity provider.
#[derive(Debug, Clone)]
pub struct OAuthConfig {
    /// Display name used in the login link.
    pub provider_name: String,
    pub client_id: String,
    pub client_secret: Secret<String>,
    pub auth_url: Url,
    pub token_url: Url,
    pub userinfo_url: Url,
    pub redirect_uri: Url,
    pub scopes: Vec<String>,
    pub extra_auth_params: Vec<(String, String)>,
}

/// Token response from the provider, and the record persisted on disk.
///
/// Fields the provider sends beyond the known ones (e.g. `id_token`) are kept
/// in `extra` and written back unchanged.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenRecord {
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TokenRecord {
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: None,
            expires_in: None,
            token_type: None,
            scope: None,
            extra: Map::new(),
        }
    }

    pub fn with_refresh_token(mut self, refresh_token: impl Into<String>) -> Self {
        self.refresh_token = Some(refresh_token.into());
        self
    }

    /// Merge a refresh-grant response into this record.
    ///
    /// Only the access token is replaced. The stored refresh token and all
    /// other fields stay as they were, since refresh responses usually omit
    /// the refresh token.
    pub fn apply_refresh(&mut self, refreshed: TokenRecord) {
        self.access_token = refreshed.access_token;
    }
}

impl fmt::Debug for TokenRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenRecord")
            .field("access_token", &"[REDACTED]")
            .field(
                "refresh_token",
                &self.refresh_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("expires_in", &self.expires_in)
            .field("token_type", &self.token_type)
            .field("scope", &self.scope)
            .field("extra_fields", &self.extra.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Userinfo response. Only `name` and `email` are read; the rest is kept
/// untyped.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ProfileInfo {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
