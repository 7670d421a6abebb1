// Page composers: gather the props a page renders, as JSON.
//
// List pages never fail. Each collection falls back to empty on its own and
// `loadError` is raised. Detail pages answer 404 only when the record is
// definitely missing. Every composer takes a `PageSession`, so a forged
// token or one for a vanished user is sent back to the login page.
pub mod directory;
pub mod library;
pub mod trends;

use axum::response::Redirect;

use crate::store::StoreError;

pub use directory::directory;
pub use library::{library, report_detail};
pub use trends::{trend_detail, trends};

/// Unwrap one fetch of a page, recording a failure instead of raising it.
fn settle<T: Default>(result: Result<T, StoreError>, what: &str, load_error: &mut bool) -> T {
    result.unwrap_or_else(|e| {
        tracing::error!("Failed to load {}: {}", what, e);
        *load_error = true;
        T::default()
    })
}

/// GET / - The dashboard opens on the library
pub async fn home() -> Redirect {
    Redirect::to("/library")
}
