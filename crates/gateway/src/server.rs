use std::sync::Arc;

use {
    axum::{
        Router,
        extract::{RawQuery, State},
        http::Uri,
        response::{IntoResponse, Response},
        routing::get,
    },
    passgate_config::PassgateConfig,
    passgate_oauth::{ProviderClient, TokenStore, callback_path, load_oauth_config},
    tokio::net::TcpListener,
    tower_http::trace::TraceLayer,
    tracing::{info, warn},
};

use crate::flow::{FlowController, Route};

// ── Shared app state ─────────────────────────────────────────────────────────

#[derive(Clone)]
struct AppState {
    flow: Arc<FlowController>,
}

// ── Server startup ───────────────────────────────────────────────────────────

/// Build the router (shared between production startup and tests).
///
/// `callback` is the path of the redirect URI and must not be `/`.
pub fn build_app(flow: Arc<FlowController>, callback: &str) -> Router {
    Router::new()
        .route("/", get(root_handler))
        .route(callback, get(callback_handler))
        .fallback(fallback_handler)
        .layer(TraceLayer::new_for_http())
        .with_state(AppState { flow })
}

/// Resolve the provider config, then serve until Ctrl-C.
pub async fn start_server(config: &PassgateConfig, bind: &str, port: u16) -> anyhow::Result<()> {
    let oauth = load_oauth_config(&config.provider)?;
    let callback = callback_path(&oauth);
    if callback == "/" || !callback.starts_with('/') {
        anyhow::bail!(
            "redirect URI {} must point at a path other than /",
            oauth.redirect_uri
        );
    }
    if oauth.redirect_uri.port_or_known_default() != Some(port) {
        warn!(
            redirect_uri = %oauth.redirect_uri,
            port,
            "redirect URI port differs from the listening port"
        );
    }

    let store = TokenStore::new(&config.token_path);
    let flow = Arc::new(FlowController::new(ProviderClient::new(oauth), store));
    let app = build_app(Arc::clone(&flow), &callback);

    let listener = bind_listener(bind, port).await?;
    let addr = listener.local_addr()?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        %addr,
        callback = %callback,
        token_path = %flow.store().path().display(),
        "passgate listening on http://{addr}"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

/// Accepts host names and bare IPv6 literals as well as IPv4 addresses.
async fn bind_listener(bind: &str, port: u16) -> std::io::Result<TcpListener> {
    TcpListener::bind((bind, port)).await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}

// ── Handlers ─────────────────────────────────────────────────────────────────

async fn root_handler(State(state): State<AppState>) -> Response {
    respond(&state, Route::Root).await
}

/// The raw query is read by hand so that a repeated or malformed parameter
/// never rejects the request before the cached session is checked.
async fn callback_handler(State(state): State<AppState>, RawQuery(query): RawQuery) -> Response {
    let code = query.as_deref().and_then(first_code);
    respond(&state, Route::Callback { code }).await
}

/// First `code` parameter in the query string, if any.
fn first_code(query: &str) -> Option<String> {
    url::form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == "code")
        .map(|(_, value)| value.into_owned())
}

async fn fallback_handler(State(state): State<AppState>, uri: Uri) -> Response {
    respond(&state, Route::Other(uri.path().to_string())).await
}

async fn respond(state: &AppState, route: Route) -> Response {
    match state.flow.handle(route).await {
        Ok(page) => page.into_response(),
        Err(e) => e.into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_code_takes_the_first_of_repeated_values() {
        assert_eq!(first_code("code=a&code=b").as_deref(), Some("a"));
        assert_eq!(first_code("scope=email&code=4%2F0Ad").as_deref(), Some("4/0Ad"));
        assert_eq!(first_code("code=").as_deref(), Some(""));
        assert_eq!(first_code("error=access_denied"), None);
        assert_eq!(first_code(""), None);
    }

    #[tokio::test]
    async fn listener_binds_host_names() {
        let listener = bind_listener("localhost", 0).await.unwrap();
        assert!(listener.local_addr().unwrap().ip().is_loopback());
    }
}
