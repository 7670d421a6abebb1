use axum::{
    extract::{rejection::JsonRejection, State},
    response::Json,
};
use axum_extra::extract::cookie::CookieJar;
use chrono::{SecondsFormat, Utc};
use serde::Deserialize;
use serde_json::{json, Value};
use sha2::{Digest, Sha256};

use crate::error::ApiError;
use crate::state::AppState;
use crate::store::normalize_email;

/// Same message for an unknown email and a wrong password.
pub const INVALID_CREDENTIALS: &str = "Invalid email or password";

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Compare digests so the comparison does not depend on the secret's length.
fn password_matches(given: &str, expected: &str) -> bool {
    Sha256::digest(given.as_bytes()) == Sha256::digest(expected.as_bytes())
}

/// POST /api/auth/login - Sign in with email + shared password
///
/// Expected Input:
/// ```json
/// { "email": "ada@example.com", "password": "string" }
/// ```
///
/// Expected Output (Success): `200 { "user": { ... } }` plus the session
/// cookie. A missing field is a 400; a wrong password or an email with no
/// user record is a 401 with the same message either way.
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<(CookieJar, Json<Value>), ApiError> {
    let Json(payload) = payload.map_err(|e| ApiError::bad_request(format!("Invalid login request: {}", e.body_text())))?;

    let email = normalize_email(&payload.email);
    if email.is_empty() || payload.password.is_empty() {
        return Err(ApiError::bad_request("Email and password are required"));
    }

    if !password_matches(&payload.password, &state.config.security.login_password) {
        tracing::warn!("Login rejected: wrong password");
        return Err(ApiError::unauthorized(INVALID_CREDENTIALS));
    }

    let Some(mut user) = state.store.get_user_by_email(&email).await? else {
        tracing::warn!("Login rejected: no user for submitted email");
        return Err(ApiError::unauthorized(INVALID_CREDENTIALS));
    };

    let now = Utc::now();
    match state.store.update_last_login(&user.id, now).await {
        Ok(()) => user.last_login = Some(now.to_rfc3339_opts(SecondsFormat::Millis, true)),
        Err(e) => tracing::warn!("Could not record last login for '{}': {}", user.id, e),
    }

    let token = state.sessions.issue(&user.id)?;

    tracing::info!("User '{}' signed in", user.id);

    Ok((state.cookie.attach(jar, token), Json(json!({ "user": user }))))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_match_is_exact() {
        assert!(password_matches("radar", "radar"));
        assert!(!password_matches("Radar", "radar"));
        assert!(!password_matches("radar ", "radar"));
        assert!(!password_matches("", "radar"));
    }
}
