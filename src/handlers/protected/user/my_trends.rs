use axum::{extract::State, response::Json};
use axum_extra::extract::cookie::CookieJar;
use serde::Serialize;

use crate::auth::current_user;
use crate::middleware::response::{Degradable, OrFallback};
use crate::state::AppState;
use crate::store::models::{retain_bookmarked, sort_by_name};
use crate::store::Trend;

const ROUTE: &str = "GET /api/user/my-trends";

#[derive(Debug, Default, Serialize)]
pub struct MyTrends {
    pub trends: Vec<Trend>,
}

/// GET /api/user/my-trends - Bookmarked trends by name
pub async fn my_trends(State(state): State<AppState>, jar: CookieJar) -> Degradable<MyTrends> {
    let Some(user) = current_user(&state, &jar).await.or_fallback(ROUTE)? else {
        return Ok(Json(MyTrends::default()));
    };
    if user.trend_ids.is_empty() {
        return Ok(Json(MyTrends::default()));
    }

    let all = state.store.get_all_trends().await.or_fallback(ROUTE)?;
    let mut trends = retain_bookmarked(all, &user.trend_ids);
    sort_by_name(&mut trends);

    Ok(Json(MyTrends { trends }))
}
