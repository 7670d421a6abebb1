#![allow(dead_code)]

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::body::{to_bytes, Body};
use axum::http::{header, HeaderMap, Method, Request, StatusCode};
use axum::Router;
use chrono::{Duration, Utc};
use serde_json::Value;
use tower::ServiceExt;

use radar_dashboard::config::{AppConfig, Environment};
use radar_dashboard::store::{Actor, Cluster, Domain, MemoryStore, Report, Trend, User};
use radar_dashboard::{app, AppState};

pub const PASSWORD: &str = "shared-secret";

pub struct TestApp {
    pub state: AppState,
    pub store: Arc<MemoryStore>,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

impl TestResponse {
    pub fn header(&self, name: header::HeaderName) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

pub fn test_config() -> AppConfig {
    let mut config = AppConfig::for_environment(Environment::Development);
    config.security.login_password = PASSWORD.to_string();
    config.security.session_secret = "integration-test-secret".to_string();
    config.security.cookie_secure = true;
    config
}

fn user(id: &str, email: &str) -> User {
    User {
        id: id.to_string(),
        name: id.trim_start_matches("rec").to_string(),
        email: email.to_string(),
        ..Default::default()
    }
}

fn report(id: &str, name: &str, year: Option<i32>, domains: &[&str]) -> Report {
    Report {
        id: id.to_string(),
        name: name.to_string(),
        year,
        domain_ids: domains.iter().map(|d| d.to_string()).collect(),
        ..Default::default()
    }
}

fn named<T: Default>(build: impl FnOnce(&mut T)) -> T {
    let mut item = T::default();
    build(&mut item);
    item
}

/// Seed data shared by the integration tests.
///
/// - `recAda` bookmarks three reports (plus one id that no longer exists),
///   two trends and one domain, and has never logged in.
/// - `recBob` has no bookmarks and logged in an hour ago.
/// - `recCal` logged in 30 hours ago.
pub fn seeded_store() -> MemoryStore {
    let store = MemoryStore::new();

    let mut ada = user("recAda", "Ada@Example.com");
    ada.report_ids = vec!["recR1".into(), "recR2".into(), "recR3".into(), "recGone".into()];
    ada.trend_ids = vec!["recT1".into(), "recT2".into()];
    ada.domain_ids = vec!["recD1".into()];
    ada.access.library = true;
    store.insert_user(ada);

    let mut bob = user("recBob", "bob@example.com");
    bob.last_login = Some((Utc::now() - Duration::hours(1)).to_rfc3339());
    store.insert_user(bob);

    let mut cal = user("recCal", "cal@example.com");
    cal.last_login = Some((Utc::now() - Duration::hours(30)).to_rfc3339());
    store.insert_user(cal);

    store.insert_report(report("recR1", "B", Some(2020), &["recD1"]));
    store.insert_report(report("recR2", "A", Some(2021), &["recD2"]));
    store.insert_report(report("recR3", "C", Some(2020), &[]));
    store.insert_report(report("recR4", "D", Some(2019), &[]));

    for (id, name, clusters) in [("recT1", "Zeta", vec!["recC1"]), ("recT2", "Alpha", vec![]), ("recT3", "Mu", vec!["recC2"])] {
        store.insert_trend(named(|t: &mut Trend| {
            t.id = id.into();
            t.name = name.into();
            t.cluster_ids = clusters.iter().map(|c| c.to_string()).collect();
        }));
    }

    store.insert_cluster(Cluster { id: "recC1".into(), name: "Energy".into() });
    store.insert_cluster(Cluster { id: "recC2".into(), name: "Mobility".into() });

    store.insert_domain(Domain { id: "recD1".into(), name: "Climate".into() });
    store.insert_domain(Domain { id: "recD2".into(), name: "Health".into() });
    store.insert_domain(Domain { id: "recD3".into(), name: "Unused".into() });

    store.insert_actor(named(|a: &mut Actor| {
        a.id = "recA1".into();
        a.name = "Org B".into();
        a.domain_ids = vec!["recD1".into()];
    }));
    store.insert_actor(named(|a: &mut Actor| {
        a.id = "recA2".into();
        a.name = "Org A".into();
        a.domain_ids = vec!["recD2".into()];
    }));

    store
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_config(test_config())
    }

    pub fn with_config(config: AppConfig) -> Self {
        let store = Arc::new(seeded_store());
        let state = AppState::new(config, store.clone());
        Self { state, store }
    }

    pub fn router(&self) -> Router {
        app(self.state.clone())
    }

    /// `Cookie` header value carrying a fresh session for `user_id`.
    pub fn session_cookie(&self, user_id: &str) -> Result<String> {
        let token = self.state.sessions.issue(user_id)?;
        Ok(format!("{}={}", self.state.cookie.name(), token))
    }

    pub async fn request(&self, request: Request<Body>) -> Result<TestResponse> {
        let response = self.router().oneshot(request).await.context("router failed")?;
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = to_bytes(response.into_body(), usize::MAX).await?;
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        Ok(TestResponse { status, headers, body })
    }

    pub async fn get(&self, path: &str, cookie: Option<&str>) -> Result<TestResponse> {
        let mut builder = Request::builder().method(Method::GET).uri(path);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        self.request(builder.body(Body::empty())?).await
    }

    pub async fn post_json(&self, path: &str, body: &Value, cookie: Option<&str>) -> Result<TestResponse> {
        let mut builder = Request::builder()
            .method(Method::POST)
            .uri(path)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        self.request(builder.body(Body::from(body.to_string()))?).await
    }

    /// Serve the app on a free local port and return its base URL.
    pub async fn spawn(&self) -> Result<String> {
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let listener = tokio::net::TcpListener::bind(("127.0.0.1", port)).await?;
        let router = self.router();
        tokio::spawn(async move {
            let _ = axum::serve(listener, router).await;
        });
        Ok(format!("http://127.0.0.1:{}", port))
    }
}

/// Token value out of a `Set-Cookie` header.
pub fn cookie_value<'a>(set_cookie: &'a str, name: &str) -> Option<&'a str> {
    set_cookie
        .split(';')
        .next()?
        .trim()
        .strip_prefix(name)?
        .strip_prefix('=')
}
