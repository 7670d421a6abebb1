use axum::{extract::State, response::Json};
use serde::Serialize;
use std::collections::HashMap;

use super::settle;
use crate::auth::PageSession;
use crate::state::AppState;
use crate::store::models::{name_map, sort_by_name};
use crate::store::{Actor, Domain};

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectoryProps {
    pub actors: Vec<Actor>,
    /// Only domains some actor is linked to, for the filter bar.
    pub domains: Vec<Domain>,
    pub domain_names: HashMap<String, String>,
    pub load_error: bool,
}

/// GET /directory - Actors and the domains they work in
pub async fn directory(_: PageSession, State(state): State<AppState>) -> Json<DirectoryProps> {
    let (actors, domains) = futures::join!(state.store.get_all_actors(), state.store.get_actors_domains());

    let mut load_error = false;
    let mut actors = settle(actors, "actors", &mut load_error);
    let mut domains = settle(domains, "actor domains", &mut load_error);
    sort_by_name(&mut actors);
    sort_by_name(&mut domains);

    Json(DirectoryProps {
        domain_names: name_map(&domains),
        actors,
        domains,
        load_error,
    })
}
