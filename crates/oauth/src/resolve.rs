use {
    anyhow::{Context, Result},
    passgate_config::ProviderConfig,
    secrecy::{ExposeSecret, Secret},
    url::Url,
};

use crate::types::OAuthConfig;

const CLIENT_ID_VARS: &[&str] = &["PASSGATE_CLIENT_ID", "CLIENT_ID"];
const CLIENT_SECRET_VARS: &[&str] = &["PASSGATE_CLIENT_SECRET", "CLIENT_SECRET"];

/// Resolve the provider section of the config file into an [`OAuthConfig`].
///
/// Priority for the client credentials:
/// 1. Environment variables (`PASSGATE_CLIENT_ID`, then `CLIENT_ID`; same for
///    the secret)
/// 2. `client_id` / `client_secret` in the config file
///
/// Missing credentials and malformed endpoint URLs are errors.
pub fn load_oauth_config(provider: &ProviderConfig) -> Result<OAuthConfig> {
    resolve_with(provider, |name| std::env::var(name).ok())
}

/// Same as [`load_oauth_config`], reading variables through `lookup`.
pub fn resolve_with(
    provider: &ProviderConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<OAuthConfig> {
    let from_env = |names: &[&str]| {
        names
            .iter()
            .filter_map(|name| lookup(*name))
            .find(|v| !v.is_empty())
    };

    let client_id = from_env(CLIENT_ID_VARS)
        .or_else(|| provider.client_id.clone().filter(|v| !v.is_empty()))
        .context("missing OAuth client id: set PASSGATE_CLIENT_ID or CLIENT_ID")?;

    let client_secret = match from_env(CLIENT_SECRET_VARS) {
        Some(v) => Secret::new(v),
        None => provider
            .client_secret
            .clone()
            .filter(|s| !s.expose_secret().is_empty())
            .context("missing OAuth client secret: set PASSGATE_CLIENT_SECRET or CLIENT_SECRET")?,
    };

    Ok(OAuthConfig {
        provider_name: provider.name.clone(),
        client_id,
        client_secret,
        auth_url: parse_url("auth_url", &provider.auth_url)?,
        token_url: parse_url("token_url", &provider.token_url)?,
        userinfo_url: parse_url("userinfo_url", &provider.userinfo_url)?,
        redirect_uri: parse_url("redirect_uri", &provider.redirect_uri)?,
        scopes: provider.scopes.clone(),
        extra_auth_params: provider
            .extra_auth_params
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect(),
    })
}

fn parse_url(field: &str, raw: &str) -> Result<Url> {
    Url::parse(raw).with_context(|| format!("invalid provider.{field}: {raw}"))
}

/// The local path the provider redirects back to, taken from the redirect URI.
pub fn callback_path(config: &OAuthConfig) -> String {
    let path = config.redirect_uri.path();
    if path.is_empty() {
        "/".to_string()
    } else {
        path.to_string()
    }
}
