pub mod client;
pub mod error;
pub mod http;
pub mod resolve;
pub mod storage;
pub mod types;

pub use {
    client::ProviderClient,
    error::{HttpError, ProviderError, StoreError},
    resolve::{callback_path, load_oauth_config},
    storage::TokenStore,
    types::{OAuthConfig, ProfileInfo, TokenRecord},
};
