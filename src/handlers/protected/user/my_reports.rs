use axum::{extract::State, response::Json};
use axum_extra::extract::cookie::CookieJar;
use serde::Serialize;

use crate::auth::current_user;
use crate::middleware::response::{Degradable, OrFallback};
use crate::state::AppState;
use crate::store::models::{retain_bookmarked, sort_reports};
use crate::store::Report;

const ROUTE: &str = "GET /api/user/my-reports";

#[derive(Debug, Default, Serialize)]
pub struct MyReports {
    pub reports: Vec<Report>,
}

/// GET /api/user/my-reports - Bookmarked reports, newest year first
pub async fn my_reports(State(state): State<AppState>, jar: CookieJar) -> Degradable<MyReports> {
    let Some(user) = current_user(&state, &jar).await.or_fallback(ROUTE)? else {
        return Ok(Json(MyReports::default()));
    };
    if user.report_ids.is_empty() {
        return Ok(Json(MyReports::default()));
    }

    let all = state.store.get_all_reports().await.or_fallback(ROUTE)?;
    let mut reports = retain_bookmarked(all, &user.report_ids);
    sort_reports(&mut reports);

    Ok(Json(MyReports { reports }))
}
