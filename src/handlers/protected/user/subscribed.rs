use axum::{extract::State, response::Json};
use axum_extra::extract::cookie::CookieJar;
use serde::Serialize;

use crate::auth::current_user;
use crate::middleware::response::{Degradable, OrFallback};
use crate::state::AppState;
use crate::store::User;

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscribedDomains {
    pub domain_ids: Vec<String>,
}

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscribedReports {
    pub report_ids: Vec<String>,
}

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscribedTrends {
    pub trend_ids: Vec<String>,
}

async fn bookmark_ids<T, F>(state: &AppState, jar: &CookieJar, route: &str, pick: F) -> Degradable<T>
where
    T: Serialize + Default,
    F: FnOnce(User) -> T,
{
    let user = current_user(state, jar).await.or_fallback(route)?;
    Ok(Json(user.map(pick).unwrap_or_default()))
}

/// GET /api/user/subscribed-domains
pub async fn subscribed_domains(State(state): State<AppState>, jar: CookieJar) -> Degradable<SubscribedDomains> {
    bookmark_ids(&state, &jar, "GET /api/user/subscribed-domains", |user| SubscribedDomains {
        domain_ids: user.domain_ids,
    })
    .await
}

/// GET /api/user/subscribed-reports
pub async fn subscribed_reports(State(state): State<AppState>, jar: CookieJar) -> Degradable<SubscribedReports> {
    bookmark_ids(&state, &jar, "GET /api/user/subscribed-reports", |user| SubscribedReports {
        report_ids: user.report_ids,
    })
    .await
}

/// GET /api/user/subscribed-trends
pub async fn subscribed_trends(State(state): State<AppState>, jar: CookieJar) -> Degradable<SubscribedTrends> {
    bookmark_ids(&state, &jar, "GET /api/user/subscribed-trends", |user| SubscribedTrends {
        trend_ids: user.trend_ids,
    })
    .await
}
