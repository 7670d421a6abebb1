use axum::{
    extract::State,
    http::HeaderMap,
    response::Json,
};
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::state::AppState;

pub const WEBHOOK_SECRET_HEADER: &str = "x-webhook-secret";

/// POST /api/webhooks/airtable - Drop cached content after a base changes
///
/// When `WEBHOOK_SECRET` is configured the caller must send it in the
/// `x-webhook-secret` header. The body is ignored.
pub async fn airtable_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Value>, ApiError> {
    if let Some(secret) = &state.config.security.webhook_secret {
        let given = headers
            .get(WEBHOOK_SECRET_HEADER)
            .and_then(|value| value.to_str().ok());
        if given != Some(secret.as_str()) {
            tracing::warn!("Rejected webhook call with missing or wrong secret");
            return Err(ApiError::unauthorized("Invalid webhook secret"));
        }
    }

    state.store.invalidate().await;
    Ok(Json(json!({ "ok": true })))
}
