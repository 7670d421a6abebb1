use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;

use crate::state::AppState;

pub const LOGIN_PAGE: &str = "/login";

const PUBLIC_EXACT: &[&str] = &["/api/auth/login", "/api/auth/logout", "/favicon.ico", "/robots.txt"];
/// Anything strictly below these.
const PUBLIC_PREFIXES: &[&str] = &[LOGIN_PAGE, "/api/webhooks", "/_next", "/static", "/assets"];

/// Paths that pass the gate untouched. `/` is never public.
pub fn is_public_path(path: &str) -> bool {
    if path == "/" {
        return false;
    }
    let path = path.trim_end_matches('/');

    path == LOGIN_PAGE
        || PUBLIC_EXACT.contains(&path)
        || PUBLIC_PREFIXES.iter().any(|prefix| {
            path.strip_prefix(prefix)
                .is_some_and(|rest| rest.len() > 1 && rest.starts_with('/'))
        })
        || is_asset_path(path)
}

/// A final path segment like `logo.svg` or `app.3f9a.js`.
fn is_asset_path(path: &str) -> bool {
    let last = path.rsplit('/').next().unwrap_or_default();
    match last.rsplit_once('.') {
        Some((stem, ext)) => {
            !stem.is_empty() && !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric())
        }
        None => false,
    }
}

/// Whether the gate itself insists on a session cookie for `path`.
///
/// API routes outside `/api/user/*` do their own identity checks, so the gate
/// lets them through and they answer with 401 where needed.
pub fn requires_session(path: &str) -> bool {
    if is_public_path(path) {
        return false;
    }
    let is_api = path == "/api" || path.starts_with("/api/");
    !is_api || path.starts_with("/api/user/")
}

/// Login page URL that returns to `path` after signing in.
pub fn login_redirect(path: &str) -> String {
    let query = url::form_urlencoded::Serializer::new(String::new())
        .append_pair("next", path)
        .finish();
    format!("{}?{}", LOGIN_PAGE, query)
}

/// Request filter in front of every route.
///
/// Only the presence of the cookie is checked here. Page composers verify
/// it through `PageSession`; `/api/user/*` handlers resolve the user and
/// answer empty when it does not verify.
pub async fn route_gate(State(state): State<AppState>, jar: CookieJar, request: Request, next: Next) -> Response {
    let path = request.uri().path().to_string();

    if requires_session(&path) && state.cookie.extract(&jar).is_none() {
        tracing::debug!("No session cookie for '{}', redirecting to login", path);
        return Redirect::to(&login_redirect(&path)).into_response();
    }

    next.run(request).await
}
