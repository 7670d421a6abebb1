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
use crate::store::models::{name_map, sort_by_name, sort_reports};
use crate::store::{Domain, Report};

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LibraryProps {
    pub reports: Vec<Report>,
    pub domains: Vec<Domain>,
    pub domain_names: HashMap<String, String>,
    pub load_error: bool,
}

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportProps {
    pub report: Option<Report>,
    pub domain_names: HashMap<String, String>,
    pub load_error: bool,
}

/// GET /library - All reports with their domain names
pub async fn library(_: PageSession, State(state): State<AppState>) -> Json<LibraryProps> {
    let (reports, domains) = futures::join!(state.store.get_all_reports(), state.store.get_all_domains());

    let mut load_error = false;
    let mut reports = settle(reports, "reports", &mut load_error);
    let mut domains = settle(domains, "domains", &mut load_error);
    sort_reports(&mut reports);
    sort_by_name(&mut domains);

    Json(LibraryProps {
        domain_names: name_map(&domains),
        reports,
        domains,
        load_error,
    })
}

/// GET /library/:id - One report
pub async fn report_detail(
    _: PageSession,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ReportProps>, ApiError> {
    let (report, domains) = futures::join!(state.store.get_report(&id), state.store.get_all_domains());

    let mut load_error = false;
    let report = match report {
        Ok(Some(report)) => Some(report),
        Ok(None) => return Err(ApiError::not_found("Report not found")),
        Err(e) => {
            tracing::error!("Failed to load report '{}': {}", id, e);
            load_error = true;
            None
        }
    };
    let domains = settle(domains, "domains", &mut load_error);

    Ok(Json(ReportProps {
        report,
        domain_names: name_map(&domains),
        load_error,
    }))
}
