use {
    askama::Template,
    axum::{
        http::StatusCode,
        response::{Html, IntoResponse, Response},
    },
    tracing::error,
};

use crate::flow::Page;

#[derive(Template)]
#[template(
    source = "<h1>Welcome back, {{ name }}</h1>\n<p>Email: {{ email }}</p>",
    ext = "html"
)]
struct WelcomeBackPage<'a> {
    name: &'a str,
    email: &'a str,
}

#[derive(Template)]
#[template(
    source = "<h1>Welcome, {{ name }}</h1>\n<p>Email: {{ email }}</p>",
    ext = "html"
)]
struct WelcomePage<'a> {
    name: &'a str,
    email: &'a str,
}

#[derive(Template)]
#[template(source = "<a href=\"{{ url }}\">Login with {{ provider }}</a>", ext = "html")]
struct LoginPage<'a> {
    provider: &'a str,
    url: &'a str,
}

impl IntoResponse for Page {
    fn into_response(self) -> Response {
        match render_page(&self) {
            Ok(html) => Html(html).into_response(),
            Err(e) => {
                error!(error = %e, "failed to render page");
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            },
        }
    }
}

/// Render a page body. Every interpolated value is HTML-escaped.
pub fn render_page(page: &Page) -> askama::Result<String> {
    match page {
        Page::WelcomeBack(profile) => WelcomeBackPage {
            name: &profile.name,
            email: &profile.email,
        }
        .render(),
        Page::Welcome(profile) => WelcomePage {
            name: &profile.name,
            email: &profile.email,
        }
        .render(),
        Page::Login { provider, url } => LoginPage {
            provider,
            url: url.as_str(),
        }
        .render(),
    }
}
