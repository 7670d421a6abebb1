use axum::{extract::State, response::Json};
use axum_extra::extract::cookie::CookieJar;
use serde_json::{json, Value};

use crate::state::AppState;

/// POST /api/auth/logout - Expire the session cookie
///
/// Tokens are stateless, so logging out only removes the cookie from the
/// browser. Always answers `{ "ok": true }`.
pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> (CookieJar, Json<Value>) {
    (state.cookie.clear(jar), Json(json!({ "ok": true })))
}
