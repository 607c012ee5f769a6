use {reqwest::Client, secrecy::ExposeSecret, tracing::debug, url::Url};

use crate::{
    error::ProviderError,
    http::{JsonRequest, send_json},
    types::{OAuthConfig, ProfileInfo, TokenRecord},
};

/// Outbound calls to the identity provider.
///
/// Each call is attempted once; there is no retry and no timeout beyond what
/// the underlying [`Client`] was built with.
#[derive(Debug, Clone)]
pub struct ProviderClient {
    config: OAuthConfig,
    http: Client,
}

impl ProviderClient {
    pub fn new(config: OAuthConfig) -> Self {
        Self::with_client(config, Client::new())
    }

    pub fn with_client(config: OAuthConfig, http: Client) -> Self {
        Self { config, http }
    }

    pub fn config(&self) -> &OAuthConfig {
        &self.config
    }

    /// The consent-screen URL. Pure function of the configuration.
    pub fn authorization_url(&self) -> Url {
        let mut url = self.config.auth_url.clone();
        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("client_id", &self.config.client_id)
                .append_pair("redirect_uri", self.config.redirect_uri.as_str())
                .append_pair("response_type", "code")
                .append_pair("scope", &self.config.scopes.join(" "))
                .append_pair("access_type", "offline");
            for (key, value) in &self.config.extra_auth_params {
                query.append_pair(key, value);
            }
        }
        url
    }

    /// Exchange an authorization code for a token record.
    pub async fn exchange_code(&self, code: &str) -> Result<TokenRecord, ProviderError> {
        debug!("exchanging authorization code");
        let req = JsonRequest::post_form(self.config.token_url.clone(), [
            ("code", code),
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.expose_secret().as_str()),
            ("redirect_uri", self.config.redirect_uri.as_str()),
            ("grant_type", "authorization_code"),
        ]);
        send_json(&self.http, req)
            .await
            .map_err(ProviderError::Exchange)
    }

    /// Mint a new access token from a refresh token.
    ///
    /// The response usually has no `refresh_token`; merge it into the stored
    /// record with [`TokenRecord::apply_refresh`].
    pub async fn refresh_token(&self, refresh_token: &str) -> Result<TokenRecord, ProviderError> {
        debug!("refreshing access token");
        let req = JsonRequest::post_form(self.config.token_url.clone(), [
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.expose_secret().as_str()),
            ("refresh_token", refresh_token),
            ("grant_type", "refresh_token"),
        ]);
        send_json(&self.http, req)
            .await
            .map_err(ProviderError::Refresh)
    }

    pub async fn fetch_profile(&self, access_token: &str) -> Result<ProfileInfo, ProviderError> {
        let req = JsonRequest::get(self.config.userinfo_url.clone()).bearer(access_token);
        send_json(&self.http, req)
            .await
            .map_err(ProviderError::ProfileFetch)
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::error::HttpError,
        mockito::Matcher,
        secrecy::Secret,
        std::collections::HashMap,
    };

    fn config_for(base: &str) -> OAuthConfig {
        OAuthConfig {
            provider_name: "Test".into(),
            client_id: "client-123".into(),
            client_secret: Secret::new("secret-456".into()),
            auth_url: Url::parse(&format!("{base}/o/oauth2/v2/auth")).unwrap(),
            token_url: Url::parse(&format!("{base}/token")).unwrap(),
            userinfo_url: Url::parse(&format!("{base}/oauth2/v2/userinfo")).unwrap(),
            redirect_uri: Url::parse("http://localhost:3000/oauth2/callback").unwrap(),
            scopes: vec!["openid".into(), "email".into(), "profile".into()],
            extra_auth_params: vec![],
        }
    }

    fn query_map(url: &Url) -> HashMap<String, String> {
        url.query_pairs().into_owned().collect()
    }

    #[test]
    fn authorization_url_has_required_params() {
        let client = ProviderClient::new(config_for("https://accounts.example.com"));
        let url = client.authorization_url();

        assert_eq!(url.host_str(), Some("accounts.example.com"));
        assert_eq!(url.path(), "/o/oauth2/v2/auth");
        let params = query_map(&url);
        assert_eq!(params["client_id"], "client-123");
        assert_eq!(params["redirect_uri"], "http://localhost:3000/oauth2/callback");
        assert_eq!(params["response_type"], "code");
        assert_eq!(params["scope"], "openid email profile");
        assert_eq!(params["access_type"], "offline");
    }

    #[test]
    fn authorization_url_appends_extra_params() {
        let mut config = config_for("https://accounts.example.com");
        config.extra_auth_params = vec![("prompt".into(), "consent".into())];
        let url = ProviderClient::new(config).authorization_url();

        let params = query_map(&url);
        assert_eq!(params["prompt"], "consent");
        assert_eq!(params["access_type"], "offline");
    }

    #[test]
    fn authorization_url_is_deterministic() {
        let client = ProviderClient::new(config_for("https://accounts.example.com"));
        assert_eq!(client.authorization_url(), client.authorization_url());
    }

    #[test]
    fn authorization_url_never_contains_secret() {
        let client = ProviderClient::new(config_for("https://accounts.example.com"));
        assert!(!client.authorization_url().as_str().contains("secret-456"));
    }

    #[tokio::test]
    async fn exchange_code_posts_form_and_parses_tokens() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/token")
            .match_body(Matcher::AllOf(vec![
                Matcher::UrlEncoded("code".into(), "auth-code".into()),
                Matcher::UrlEncoded("client_id".into(), "client-123".into()),
                Matcher::UrlEncoded("client_secret".into(), "secret-456".into()),
                Matcher::UrlEncoded(
                    "redirect_uri".into(),
                    "http://localhost:3000/oauth2/callback".into(),
                ),
                Matcher::UrlEncoded("grant_type".into(), "authorization_code".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"access_token": "ya29.a", "refresh_token": "1//r", "expires_in": 3599,
                    "token_type": "Bearer", "scope": "openid email profile"}"#,
            )
            .create_async()
            .await;

        let client = ProviderClient::new(config_for(&server.url()));
        let record = client.exchange_code("auth-code").await.unwrap();

        assert_eq!(record.access_token, "ya29.a");
        assert_eq!(record.refresh_token.as_deref(), Some("1//r"));
        assert_eq!(record.expires_in, Some(3599));
        assert_eq!(record.token_type.as_deref(), Some("Bearer"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn exchange_code_failure_keeps_provider_message() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/token")
            .with_status(400)
            .with_body(r#"{"error": "invalid_grant", "error_description": "Bad Request"}"#)
            .create_async()
            .await;

        let client = ProviderClient::new(config_for(&server.url()));
        let err = client.exchange_code("stale").await.unwrap_err();

        assert!(matches!(
            err,
            ProviderError::Exchange(HttpError::Status { status: 400, .. })
        ));
        assert!(err.to_string().contains("invalid_grant"));
    }

    #[tokio::test]
    async fn refresh_token_posts_refresh_grant() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/token")
            .match_body(Matcher::AllOf(vec![
                Matcher::UrlEncoded("client_id".into(), "client-123".into()),
                Matcher::UrlEncoded("client_secret".into(), "secret-456".into()),
                Matcher::UrlEncoded("refresh_token".into(), "1//r".into()),
                Matcher::UrlEncoded("grant_type".into(), "refresh_token".into()),
            ]))
            .with_status(200)
            .with_body(r#"{"access_token": "ya29.b", "expires_in": 3599}"#)
            .create_async()
            .await;

        let client = ProviderClient::new(config_for(&server.url()));
        let refreshed = client.refresh_token("1//r").await.unwrap();

        let mut stored = TokenRecord::new("ya29.a").with_refresh_token("1//r");
        stored.apply_refresh(refreshed);
        assert_eq!(stored, TokenRecord::new("ya29.b").with_refresh_token("1//r"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn refresh_with_unparseable_body_is_refresh_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/token")
            .with_status(200)
            .with_body("not json")
            .create_async()
            .await;

        let client = ProviderClient::new(config_for(&server.url()));
        let err = client.refresh_token("1//r").await.unwrap_err();
        assert!(matches!(err, ProviderError::Refresh(HttpError::Decode(_))));
    }

    #[tokio::test]
    async fn fetch_profile_sends_bearer_token() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/oauth2/v2/userinfo")
            .match_header("authorization", "Bearer ya29.a")
            .with_status(200)
            .with_body(r#"{"id": "1", "name": "Ada Lovelace", "email": "ada@example.com"}"#)
            .create_async()
            .await;

        let client = ProviderClient::new(config_for(&server.url()));
        let profile = client.fetch_profile("ya29.a").await.unwrap();

        assert_eq!(profile.name, "Ada Lovelace");
        assert_eq!(profile.email, "ada@example.com");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn fetch_profile_unauthorized_is_profile_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/oauth2/v2/userinfo")
            .with_status(401)
            .with_body(r#"{"error": {"code": 401}}"#)
            .create_async()
            .await;

        let client = ProviderClient::new(config_for(&server.url()));
        let err = client.fetch_profile("expired").await.unwrap_err();
        assert!(matches!(
            err,
            ProviderError::ProfileFetch(HttpError::Status { status: 401, .. })
        ));
    }
}
