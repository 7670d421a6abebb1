use axum::{
    extract::{Path, State},
    response::Json,
};
use serde::Serialize;
use std::collections::HashMap;

use super::settle;
use crate::auth::PageSession;
use crate::error::ApiError;
use crate::state::AppState;
use crate::store::models::{name_map, sort_by_name};
use crate::store::{Cluster, Trend};

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendsProps {
    pub trends: Vec<Trend>,
    pub clusters: Vec<Cluster>,
    pub cluster_names: HashMap<String, String>,
    pub load_error: bool,
}

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendProps {
    pub trend: Option<Trend>,
    pub cluster_names: HashMap<String, String>,
    pub load_error: bool,
}

/// GET /trends - The radar: every trend and the clusters grouping them
pub async fn trends(_: PageSession, State(state): State<AppState>) -> Json<TrendsProps> {
    let (trends, clusters) = futures::join!(state.store.get_all_trends(), state.store.get_clusters());

    let mut load_error = false;
    let mut trends = settle(trends, "trends", &mut load_error);
    let mut clusters = settle(clusters, "clusters", &mut load_error);
    sort_by_name(&mut trends);
    sort_by_name(&mut clusters);

    Json(TrendsProps {
        cluster_names: name_map(&clusters),
        trends,
        clusters,
        load_error,
    })
}

/// GET /trends/:id - One trend
pub async fn trend_detail(
    _: PageSession,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<TrendProps>, ApiError> {
    let (trend, clusters) = futures::join!(state.store.get_trend(&id), state.store.get_clusters());

    let mut load_error = false;
    let trend = match trend {
        Ok(Some(trend)) => Some(trend),
        Ok(None) => return Err(ApiError::not_found("Trend not found")),
        Err(e) => {
            tracing::error!("Failed to load trend '{}': {}", id, e);
            load_error = true;
            None
        }
    };
    let clusters = settle(clusters, "clusters", &mut load_error);

    Ok(Json(TrendProps {
        trend,
        cluster_names: name_map(&clusters),
        load_error,
    }))
}
