//! Config schema types (server, provider, token cache).

use std::{collections::BTreeMap, path::PathBuf};

use {secrecy::Secret, serde::Deserialize};

pub const DEFAULT_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
pub const DEFAULT_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
pub const DEFAULT_USERINFO_URL: &str = "https://www.googleapis.com/oauth2/v2/userinfo";
pub const DEFAULT_REDIRECT_URI: &str = "http://localhost:3000/oauth2/callback";
pub const DEFAULT_PORT: u16 = 3000;

/// Root configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PassgateConfig {
    pub server: ServerConfig,
    pub provider: ProviderConfig,
    /// Where the single cached token record lives.
    pub token_path: PathBuf,
}

impl Default for PassgateConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            provider: ProviderConfig::default(),
            token_path: PathBuf::from("token.json"),
        }
    }
}

/// Local HTTP listener.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1".into(),
            port: DEFAULT_PORT,
        }
    }
}

/// Identity provider endpoints and client registration.
///
/// Defaults target Google. `client_id` and `client_secret` are normally left
/// out of the file and supplied through the environment.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// Display name used in the login link.
    pub name: String,
    pub auth_url: String,
    pub token_url: String,
    pub userinfo_url: String,
    pub redirect_uri: String,
    pub scopes: Vec<String>,
    /// Extra query parameters appended to the authorization URL
    /// (e.g. `prompt = "consent"`).
    pub extra_auth_params: BTreeMap<String, String>,
    pub client_id: Option<String>,
    pub client_secret: Option<Secret<String>>,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            name: "Google".into(),
            auth_url: DEFAULT_AUTH_URL.into(),
            token_url: DEFAULT_TOKEN_URL.into(),
            userinfo_url: DEFAULT_USERINFO_URL.into(),
            redirect_uri: DEFAULT_REDIRECT_URI.into(),
            scopes: vec!["openid".into(), "email".into(), "profile".into()],
            extra_auth_params: BTreeMap::new(),
            client_id: None,
            client_secret: None,
        }
    }
}
