use std::path::PathBuf;

/// Failure of a single JSON-returning HTTP call.
#[derive(Debug, thiserror::Error)]
pub enum HttpError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("invalid JSON response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl HttpError {
    /// HTTP status of the response, when one was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            Self::Decode(_) => None,
        }
    }
}

/// Failure of one of the provider operations.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("token exchange failed: {0}")]
    Exchange(#[source] HttpError),
    #[error("token refresh failed: {0}")]
    Refresh(#[source] HttpError),
    #[error("profile fetch failed: {0}")]
    ProfileFetch(#[source] HttpError),
}

impl ProviderError {
    /// Status the provider answered with, if it answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Exchange(e) | Self::Refresh(e) | Self::ProfileFetch(e) => e.status(),
        }
    }
}

/// Failure reading or writing the token cache.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("no cached token at {}", path.display())]
    NotFound { path: PathBuf },
    #[error("corrupt token cache at {}: {source}", path.display())]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("token cache I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_status_comes_from_the_http_failure() {
        let refresh = ProviderError::Refresh(HttpError::Status {
            status: 400,
            body: r#"{"error": "invalid_grant"}"#.into(),
        });
        assert_eq!(refresh.status(), Some(400));

        let decode = serde_json::from_str::<serde_json::Value>("<html>").unwrap_err();
        assert_eq!(ProviderError::ProfileFetch(decode.into()).status(), None);
    }
}
