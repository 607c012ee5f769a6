use {
    anyhow::Result,
    clap::Subcommand,
    passgate_config::PassgateConfig,
    passgate_oauth::{ProviderClient, StoreError, TokenStore, load_oauth_config},
};

#[derive(Subcommand)]
pub enum AuthAction {
    /// Print the provider's authorization URL.
    Url,
    /// Show whether a token is cached.
    Status,
    /// Delete the cached token. Does not revoke it at the provider.
    Logout,
}

pub async fn handle_auth(action: AuthAction, config: &PassgateConfig) -> Result<()> {
    match action {
        AuthAction::Url => url(config),
        AuthAction::Status => status(config).await,
        AuthAction::Logout => logout(config).await,
    }
}

fn url(config: &PassgateConfig) -> Result<()> {
    let oauth = load_oauth_config(&config.provider)?;
    println!("{}", ProviderClient::new(oauth).authorization_url());
    Ok(())
}

async fn status(config: &PassgateConfig) -> Result<()> {
    let store = TokenStore::new(&config.token_path);
    match store.load().await {
        Ok(record) => {
            let refresh = if record.refresh_token.is_some() {
                "refresh token present"
            } else {
                "no refresh token"
            };
            let scope = record.scope.as_deref().unwrap_or("unknown scope");
            println!(
                "logged in [{refresh}, {scope}] ({})",
                store.path().display()
            );
        },
        Err(StoreError::NotFound { path }) => {
            println!("not logged in (no token at {})", path.display());
        },
        Err(StoreError::Corrupt { path, source }) => {
            println!("token cache at {} is corrupt: {source}", path.display());
        },
        Err(e) => return Err(e.into()),
    }
    Ok(())
}

async fn logout(config: &PassgateConfig) -> Result<()> {
    let store = TokenStore::new(&config.token_path);
    store.delete().await?;
    println!("Removed cached token at {}", store.path().display());
    Ok(())
}
