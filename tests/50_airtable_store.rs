use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use chrono::{TimeZone, Utc};
use serde_json::{json, Value};

use radar_dashboard::config::{AirtableConfig, TableNames};
use radar_dashboard::store::{AirtableStore, Store, StoreError};

const API_KEY: &str = "patTEST";
const BASE: &str = "appTest";

#[derive(Clone, Default)]
struct Fake {
    /// Every (table, query) pair the fake received.
    seen: Arc<Mutex<Vec<(String, HashMap<String, String>)>>>,
    patches: Arc<Mutex<Vec<(String, Value)>>>,
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == format!("Bearer {}", API_KEY))
}

async fn list(
    State(fake): State<Fake>,
    Path((base, table)): Path<(String, String)>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Response {
    if !authorized(&headers) || base != BASE {
        return (StatusCode::UNAUTHORIZED, Json(json!({ "error": "AUTHENTICATION_REQUIRED" }))).into_response();
    }
    fake.seen.lock().unwrap().push((table.clone(), query.clone()));

    let body = match (table.as_str(), query.get("offset").map(String::as_str)) {
        ("Reports", None) => json!({
            "records": [{ "id": "rec1", "fields": { "Name": "First", "Year": 2021, "Domains": ["recD"] } }],
            "offset": "page2"
        }),
        ("Reports", Some("page2")) => json!({
            "records": [{ "id": "rec2", "fields": { "Name": "Second", "Year": "2019" } }]
        }),
        ("Users", _) => json!({
            "records": [{
                "id": "recU",
                "fields": { "Name": "Ada", "Email": "ada@example.com", "Reports": ["rec1"], "Library Access": true }
            }]
        }),
        ("Domains", _) => json!({ "records": [{ "id": "recD", "fields": { "Name": "Climate" } }] }),
        _ => json!({ "records": [] }),
    };
    Json(body).into_response()
}

async fn record(
    State(fake): State<Fake>,
    Path((_base, table, id)): Path<(String, String, String)>,
    headers: HeaderMap,
    body: Option<Json<Value>>,
) -> Response {
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    if let Some(Json(body)) = body {
        fake.patches.lock().unwrap().push((id.clone(), body));
    }
    match (table.as_str(), id.as_str()) {
        ("Users", "recU") => Json(json!({ "id": "recU", "fields": { "Email": "ada@example.com" } })).into_response(),
        ("Trends", "recT") => Json(json!({ "id": "recT", "fields": { "Name": "Heat pumps", "Clusters": ["recC"] } })).into_response(),
        _ => (StatusCode::NOT_FOUND, Json(json!({ "error": "NOT_FOUND" }))).into_response(),
    }
}

async fn spawn_fake(fake: Fake) -> Result<String> {
    let port = portpicker::pick_unused_port().context("failed to pick free port")?;
    let listener = tokio::net::TcpListener::bind(("127.0.0.1", port)).await?;
    let router = Router::new()
        .route("/v0/:base/:table", get(list))
        .route("/v0/:base/:table/:id", get(record).patch(record))
        .with_state(fake);
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });
    Ok(format!("http://127.0.0.1:{}/v0", port))
}

fn store_for(api_url: String, api_key: &str) -> Result<AirtableStore> {
    let config = AirtableConfig {
        api_url,
        api_key: api_key.to_string(),
        base_id: BASE.to_string(),
        tables: TableNames::default(),
        cache_ttl_secs: 0,
    };
    Ok(AirtableStore::new(&config)?)
}

#[tokio::test]
async fn list_follows_pagination_and_decodes_fields() -> Result<()> {
    let fake = Fake::default();
    let store = store_for(spawn_fake(fake.clone()).await?, API_KEY)?;

    let reports = store.get_all_reports().await?;
    let summary: Vec<_> = reports.iter().map(|r| (r.id.as_str(), r.year)).collect();
    assert_eq!(summary, [("rec1", Some(2021)), ("rec2", Some(2019))]);
    assert_eq!(reports[0].domain_ids, ["recD"]);

    let seen = fake.seen.lock().unwrap();
    assert_eq!(seen.len(), 2);
    assert_eq!(seen[0].1.get("pageSize").map(String::as_str), Some("100"));
    assert_eq!(seen[1].1.get("offset").map(String::as_str), Some("page2"));

    Ok(())
}

#[tokio::test]
async fn user_lookup_uses_lowercased_formula() -> Result<()> {
    let fake = Fake::default();
    let store = store_for(spawn_fake(fake.clone()).await?, API_KEY)?;

    let user = store.get_user_by_email("ada@example.com").await?.context("user missing")?;
    assert_eq!(user.id, "recU");
    assert!(user.access.library);
    assert_eq!(user.report_ids, ["rec1"]);

    let seen = fake.seen.lock().unwrap();
    let (table, query) = &seen[0];
    assert_eq!(table, "Users");
    assert_eq!(
        query.get("filterByFormula").map(String::as_str),
        Some("LOWER({Email}) = 'ada@example.com'")
    );
    assert_eq!(query.get("maxRecords").map(String::as_str), Some("1"));

    Ok(())
}

#[tokio::test]
async fn single_record_fetch_maps_404_to_none() -> Result<()> {
    let store = store_for(spawn_fake(Fake::default()).await?, API_KEY)?;

    let trend = store.get_trend("recT").await?.context("trend missing")?;
    assert_eq!(trend.name, "Heat pumps");
    assert_eq!(trend.cluster_ids, ["recC"]);

    assert!(store.get_trend("recMissing").await?.is_none());
    assert!(store.get_user("recMissing").await?.is_none());

    Ok(())
}

#[tokio::test]
async fn update_last_login_patches_field() -> Result<()> {
    let fake = Fake::default();
    let store = store_for(spawn_fake(fake.clone()).await?, API_KEY)?;

    let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).single().context("bad date")?;
    store.update_last_login("recU", at).await?;

    let patches = fake.patches.lock().unwrap();
    assert_eq!(patches.len(), 1);
    assert_eq!(patches[0].0, "recU");
    assert_eq!(patches[0].1, json!({ "fields": { "Last Login": "2024-05-01T12:30:00.000Z" } }));

    Ok(())
}

#[tokio::test]
async fn actors_domains_filter_on_actor_link() -> Result<()> {
    let fake = Fake::default();
    let store = store_for(spawn_fake(fake.clone()).await?, API_KEY)?;

    let domains = store.get_actors_domains().await?;
    assert_eq!(domains.len(), 1);

    let seen = fake.seen.lock().unwrap();
    assert_eq!(
        seen[0].1.get("filterByFormula").map(String::as_str),
        Some("LEN(ARRAYJOIN({Actors})) > 0")
    );

    Ok(())
}

#[tokio::test]
async fn rejected_credentials_surface_as_status_error() -> Result<()> {
    let store = store_for(spawn_fake(Fake::default()).await?, "wrong-key")?;

    match store.get_all_domains().await {
        Err(StoreError::Status { status, .. }) => assert_eq!(status, 401),
        other => panic!("expected status error, got {:?}", other),
    }

    Ok(())
}

#[tokio::test]
async fn unreachable_store_is_a_transport_error() -> Result<()> {
    let port = portpicker::pick_unused_port().context("failed to pick free port")?;
    let store = store_for(format!("http://127.0.0.1:{}/v0", port), API_KEY)?;

    assert!(matches!(store.get_all_reports().await, Err(StoreError::Transport(_))));

    Ok(())
}
