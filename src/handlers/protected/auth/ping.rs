use axum::{extract::State, response::Json};
use axum_extra::extract::cookie::CookieJar;
use chrono::{DateTime, Duration, SecondsFormat, Utc};
use serde::Serialize;

use crate::error::ApiError;
use crate::state::AppState;

/// Minimum gap between two recorded logins, to bound writes to the store.
pub const TOUCH_INTERVAL_HOURS: i64 = 24;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PingResponse {
    pub ok: bool,
    pub updated: bool,
    pub last_login: Option<String>,
}

/// True when `last_login` is absent, unreadable, or at least a day old.
pub fn needs_touch(last_login: Option<&str>, now: DateTime<Utc>) -> bool {
    let Some(previous) = last_login.and_then(|s| DateTime::parse_from_rfc3339(s).ok()) else {
        return true;
    };
    now.signed_duration_since(previous.with_timezone(&Utc)) >= Duration::hours(TOUCH_INTERVAL_HOURS)
}

/// POST /api/auth/ping - Record activity for the signed-in user
///
/// Expected Output: `{ "ok": true, "updated": bool, "lastLogin": string|null }`.
/// 401 without a valid session, 404 when the session's user is gone.
pub async fn ping(State(state): State<AppState>, jar: CookieJar) -> Result<Json<PingResponse>, ApiError> {
    let token = state
        .cookie
        .extract(&jar)
        .ok_or_else(|| ApiError::unauthorized("Not authenticated"))?;
    let user_id = state.sessions.verify(&token)?;

    let user = state
        .store
        .get_user(&user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    let now = Utc::now();
    if !needs_touch(user.last_login.as_deref(), now) {
        return Ok(Json(PingResponse {
            ok: true,
            updated: false,
            last_login: user.last_login,
        }));
    }

    state.store.update_last_login(&user.id, now).await?;
    tracing::debug!("Recorded last login for '{}'", user.id);

    Ok(Json(PingResponse {
        ok: true,
        updated: true,
        last_login: Some(now.to_rfc3339_opts(SecondsFormat::Millis, true)),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn touch_when_never_logged_in_or_unparseable() {
        let now = Utc::now();
        assert!(needs_touch(None, now));
        assert!(needs_touch(Some("yesterday-ish"), now));
    }

    #[test]
    fn touch_only_after_a_full_day() {
        let now = Utc::now();
        let recent = (now - Duration::hours(23)).to_rfc3339();
        let day_old = (now - Duration::hours(24)).to_rfc3339();
        assert!(!needs_touch(Some(&recent), now));
        assert!(needs_touch(Some(&day_old), now));
    }
}
