use axum::{
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod state;
pub mod store;

pub use state::AppState;

/// Every route behind the session gate.
pub fn app(state: AppState) -> Router {
    Router::new()
        // Pages
        .route("/", get(handlers::pages::home))
        .route("/login", get(handlers::public::login_page))
        .merge(page_routes())
        // API
        .merge(auth_routes())
        .merge(user_routes())
        .merge(webhook_routes())
        // Global middleware: trace outermost, then the session gate
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(from_fn_with_state(state.clone(), middleware::route_gate)),
        )
        .with_state(state)
}

fn auth_routes() -> Router<AppState> {
    use handlers::protected::auth::ping;
    use handlers::public::auth::{login, logout};

    Router::new()
        .route("/api/auth/login", post(login))
        .route("/api/auth/logout", post(logout))
        .route("/api/auth/ping", post(ping))
}

fn user_routes() -> Router<AppState> {
    use handlers::protected::user;

    Router::new()
        .route("/api/user/my-reports", get(user::my_reports))
        .route("/api/user/my-trends", get(user::my_trends))
        .route("/api/user/subscribed-domains", get(user::subscribed_domains))
        .route("/api/user/subscribed-reports", get(user::subscribed_reports))
        .route("/api/user/subscribed-trends", get(user::subscribed_trends))
}

fn page_routes() -> Router<AppState> {
    use handlers::pages;

    Router::new()
        .route("/library", get(pages::library))
        .route("/library/:id", get(pages::report_detail))
        .route("/trends", get(pages::trends))
        .route("/trends/:id", get(pages::trend_detail))
        .route("/directory", get(pages::directory))
}

fn webhook_routes() -> Router<AppState> {
    Router::new().route("/api/webhooks/airtable", post(handlers::public::airtable_webhook))
}
