use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use serde_json::{json, Value};
use std::fmt::Display;

/// The degraded answer of a route that must never fail the client.
///
/// Renders as HTTP 200 with the (empty) payload plus `"error": true`, so a
/// handler returning `Result<Json<T>, Fallback<T>>` states its "always 200"
/// contract in its signature.
#[derive(Debug)]
pub struct Fallback<T: Serialize>(pub T);

/// Result type for routes that degrade instead of erroring.
pub type Degradable<T> = Result<Json<T>, Fallback<T>>;

/// A failure that has been logged and is on its way to becoming the
/// route's empty [`Fallback`].
#[derive(Debug)]
pub struct Degraded;

impl<T: Serialize + Default> From<Degraded> for Fallback<T> {
    fn from(_: Degraded) -> Self {
        Self(T::default())
    }
}

impl<T: Serialize> IntoResponse for Fallback<T> {
    fn into_response(self) -> Response {
        let body = match serde_json::to_value(&self.0) {
            Ok(Value::Object(mut map)) => {
                map.insert("error".to_string(), Value::Bool(true));
                Value::Object(map)
            }
            Ok(other) => json!({ "data": other, "error": true }),
            Err(e) => {
                tracing::error!("Failed to serialize fallback body: {}", e);
                json!({ "error": true })
            }
        };

        (StatusCode::OK, Json(body)).into_response()
    }
}

/// Log a failed call and mark it for the route's empty fallback.
pub trait OrFallback<T> {
    fn or_fallback(self, route: &str) -> Result<T, Degraded>;
}

impl<T, E: Display> OrFallback<T> for Result<T, E> {
    fn or_fallback(self, route: &str) -> Result<T, Degraded> {
        self.map_err(|e| {
            tracing::error!("{} degraded to empty response: {}", route, e);
            Degraded
        })
    }
}
