use {
    axum::{
        http::{StatusCode, header},
        response::{Html, IntoResponse, Response},
    },
    passgate_oauth::{ProviderError, StoreError},
    tracing::error,
};

/// Request outcomes that do not render a page.
#[derive(Debug, thiserror::Error)]
pub enum FlowError {
    #[error("No code provided")]
    MissingCode,
    #[error("Not found")]
    RouteNotFound(String),
    #[error(transparent)]
    Provider(#[from] ProviderError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl FlowError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::MissingCode => StatusCode::BAD_REQUEST,
            Self::RouteNotFound(_) => StatusCode::NOT_FOUND,
            Self::Provider(_) | Self::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Upstream HTTP status when the failure came from the provider.
    pub fn provider_status(&self) -> Option<u16> {
        match self {
            Self::Provider(e) => e.status(),
            _ => None,
        }
    }
}

impl IntoResponse for FlowError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            Self::RouteNotFound(_) => (status, Html(self.to_string())).into_response(),
            Self::MissingCode => json_error(status, &self.to_string()),
            Self::Provider(_) | Self::Store(_) => {
                error!(error = %self, "request failed");
                json_error(status, &self.to_string())
            },
        }
    }
}

/// `{"error": message}`, pretty-printed.
fn json_error(status: StatusCode, message: &str) -> Response {
    let body = serde_json::json!({ "error": message });
    let text = serde_json::to_string_pretty(&body).unwrap_or_else(|_| body.to_string());
    (status, [(header::CONTENT_TYPE, "application/json")], text).into_response()
}

#[cfg(test)]
mod tests {
    use {super::*, passgate_oauth::HttpError, std::path::PathBuf};

    #[test]
    fn status_codes() {
        assert_eq!(FlowError::MissingCode.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            FlowError::RouteNotFound("/favicon.ico".into()).status(),
            StatusCode::NOT_FOUND
        );
        let store = FlowError::Store(StoreError::NotFound {
            path: PathBuf::from("token.json"),
        });
        assert_eq!(store.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(store.provider_status(), None);

        let refresh = FlowError::from(ProviderError::Refresh(HttpError::Status {
            status: 401,
            body: String::new(),
        }));
        assert_eq!(refresh.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(refresh.provider_status(), Some(401));
    }

    #[test]
    fn missing_code_is_json() {
        let resp = FlowError::MissingCode.into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            resp.headers().get(header::CONTENT_TYPE).unwrap(),
            "application/json"
        );
    }

    #[test]
    fn not_found_is_html() {
        let resp = FlowError::RouteNotFound("/x".into()).into_response();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert!(
            resp.headers()
                .get(header::CONTENT_TYPE)
                .unwrap()
                .to_str()
                .unwrap()
                .starts_with("text/html")
        );
    }
}
