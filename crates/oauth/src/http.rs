//! The one HTTP primitive behind every provider call: send a request, buffer
//! the whole body, check the status and parse the body as JSON.

use {
    reqwest::{
        Client, Method,
        header::{AUTHORIZATION, HeaderMap, HeaderValue},
    },
    serde::de::DeserializeOwned,
    tracing::debug,
    url::Url,
};

use crate::error::HttpError;

#[derive(Debug, Clone)]
pub enum RequestBody {
    /// `application/x-www-form-urlencoded` body.
    Form(Vec<(String, String)>),
}

/// A JSON-returning request: method, target URL (host and path), headers and
/// an optional body.
#[derive(Debug, Clone)]
pub struct JsonRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Option<RequestBody>,
}

impl JsonRequest {
    pub fn new(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            headers: HeaderMap::new(),
            body: None,
        }
    }

    pub fn get(url: Url) -> Self {
        Self::new(Method::GET, url)
    }

    pub fn post_form<K, V>(url: Url, params: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let params = params
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        let mut req = Self::new(Method::POST, url);
        req.body = Some(RequestBody::Form(params));
        req
    }

    /// Add `Authorization: Bearer {token}`.
    ///
    /// A token that is not a valid header value is sent without the header,
    /// which the provider answers with 401.
    pub fn bearer(mut self, token: &str) -> Self {
        if let Ok(mut value) = HeaderValue::from_str(&format!("Bearer {token}")) {
            value.set_sensitive(true);
            self.headers.insert(AUTHORIZATION, value);
        }
        self
    }
}

/// Send `req` and parse the response body into `T`.
///
/// Transport errors, non-2xx statuses and unparseable bodies each map to
/// their own [`HttpError`] variant; a non-2xx error carries the raw body.
pub async fn send_json<T: DeserializeOwned>(client: &Client, req: JsonRequest) -> Result<T, HttpError> {
    debug!(method = %req.method, url = %req.url, "provider request");

    let mut builder = client.request(req.method, req.url).headers(req.headers);
    if let Some(RequestBody::Form(params)) = &req.body {
        builder = builder.form(params);
    }

    let resp = builder.send().await?;
    let status = resp.status();
    let bytes = resp.bytes().await?;

    if !status.is_success() {
        return Err(HttpError::Status {
            status: status.as_u16(),
            body: String::from_utf8_lossy(&bytes).into_owned(),
        });
    }

    Ok(serde_json::from_slice(&bytes)?)
}
