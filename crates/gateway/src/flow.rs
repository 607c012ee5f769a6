//! Per-request login flow: reuse the cached token if it still works,
//! otherwise show the login link or finish the authorization-code callback.

use {
    passgate_oauth::{ProfileInfo, ProviderClient, StoreError, TokenRecord, TokenStore},
    tokio::sync::Mutex,
    tracing::{debug, info, warn},
    url::Url,
};

use crate::error::FlowError;

/// Where an inbound request is headed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Root,
    Callback { code: Option<String> },
    Other(String),
}

/// What a successful request renders.
#[derive(Debug, Clone, PartialEq)]
pub enum Page {
    /// A cached token still works.
    WelcomeBack(ProfileInfo),
    /// The callback just completed a login.
    Welcome(ProfileInfo),
    Login { provider: String, url: Url },
}

pub struct FlowController {
    client: ProviderClient,
    store: TokenStore,
    /// Serializes writes to the token file. Held only around store I/O,
    /// never across a provider call.
    session: Mutex<()>,
}

impl FlowController {
    pub fn new(client: ProviderClient, store: TokenStore) -> Self {
        Self {
            client,
            store,
            session: Mutex::new(()),
        }
    }

    pub fn store(&self) -> &TokenStore {
        &self.store
    }

    /// The session lock only covers token-file writes. Provider calls run
    /// unlocked, so a hung provider stalls the request that made the call
    /// and nothing else.
    pub async fn handle(&self, route: Route) -> Result<Page, FlowError> {
        if let Some(profile) = self.resume_session().await {
            return Ok(Page::WelcomeBack(profile));
        }

        match route {
            Route::Root => Ok(Page::Login {
                provider: self.client.config().provider_name.clone(),
                url: self.client.authorization_url(),
            }),
            Route::Callback { code } => {
                let code = code
                    .filter(|c| !c.is_empty())
                    .ok_or(FlowError::MissingCode)?;
                self.complete_login(&code).await.map(Page::Welcome)
            },
            Route::Other(path) => Err(FlowError::RouteNotFound(path)),
        }
    }

    /// Try the cached token. Every failure here means "no session".
    async fn resume_session(&self) -> Option<ProfileInfo> {
        let record = match self.store.load().await {
            Ok(record) => record,
            Err(StoreError::NotFound { .. }) => {
                debug!("no cached token");
                return None;
            },
            Err(e) => {
                warn!(error = %e, "ignoring unreadable token cache");
                return None;
            },
        };

        match self.renew(record).await {
            Ok(profile) => Some(profile),
            Err(e) => {
                warn!(error = %e, status = ?e.provider_status(), "cached token unusable");
                None
            },
        }
    }

    /// Refresh whenever a refresh token exists, without looking at expiry,
    /// then fetch the profile with the resulting access token.
    async fn renew(&self, mut record: TokenRecord) -> Result<ProfileInfo, FlowError> {
        if let Some(refresh_token) = record.refresh_token.clone() {
            let refreshed = self.client.refresh_token(&refresh_token).await?;
            record = self.store_refreshed(&refresh_token, refreshed).await?;
            debug!("refreshed cached access token");
        }
        Ok(self.client.fetch_profile(&record.access_token).await?)
    }

    /// Merge a refresh response into the record on disk, but only if that
    /// record still carries `used_refresh_token`. A login that finished while
    /// the refresh was in flight wins, and its record is left alone.
    async fn store_refreshed(
        &self,
        used_refresh_token: &str,
        refreshed: TokenRecord,
    ) -> Result<TokenRecord, FlowError> {
        let _guard = self.session.lock().await;
        match self.store.load().await {
            Ok(mut current) if current.refresh_token.as_deref() == Some(used_refresh_token) => {
                current.apply_refresh(refreshed);
                self.store.save(&current).await?;
                Ok(current)
            },
            Ok(_) | Err(StoreError::NotFound { .. }) => {
                debug!("token cache changed during refresh, not overwriting it");
                Ok(refreshed)
            },
            Err(e) => Err(e.into()),
        }
    }

    async fn complete_login(&self, code: &str) -> Result<ProfileInfo, FlowError> {
        let record = self.client.exchange_code(code).await?;
        {
            let _guard = self.session.lock().await;
            self.store.save(&record).await?;
        }
        info!(
            refresh_token = record.refresh_token.is_some(),
            "stored new token record"
        );
        Ok(self.client.fetch_profile(&record.access_token).await?)
    }
}
