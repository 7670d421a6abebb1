use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use radar_dashboard::config::AppConfig;
use radar_dashboard::store::{AirtableStore, CachedStore};
use radar_dashboard::{app, AppState};

#[derive(Parser)]
#[command(name = "radar-dashboard")]
#[command(about = "Library, trend radar and actor directory backed by Airtable")]
#[command(version)]
struct Args {
    #[arg(long, help = "Port to listen on (defaults to $PORT or 3000)")]
    port: Option<u16>,

    #[arg(long, default_value = "0.0.0.0", help = "Address to bind")]
    bind: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up AIRTABLE_API_KEY, SESSION_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,tower_http=info")),
        )
        .init();

    let args = Args::parse();

    let config = AppConfig::from_env();
    config.validate().context("invalid configuration")?;
    tracing::info!("Starting radar dashboard in {:?} mode", config.environment);

    let airtable = AirtableStore::new(&config.airtable).context("failed to build Airtable client")?;
    let store = CachedStore::new(airtable, Duration::from_secs(config.airtable.cache_ttl_secs));
    let state = AppState::new(config, Arc::new(store));

    let port = args
        .port
        .or_else(|| std::env::var("PORT").ok().and_then(|s| s.parse().ok()))
        .unwrap_or(3000);
    let bind_addr = format!("{}:{}", args.bind, port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("Listening on http://{}", bind_addr);

    axum::serve(listener, app(state)).await.context("server error")?;
    Ok(())
}
