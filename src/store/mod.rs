//! Access to the external record store (Airtable) that owns users and content.
//!
//! Everything behind [`Store`] is a plain read or a single-field upsert;
//! there are no transactions and no retries. A failed call is reported once
//! and the caller decides whether to surface or degrade it.

pub mod airtable;
pub mod cache;
pub mod memory;
pub mod models;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

pub use airtable::AirtableStore;
pub use cache::CachedStore;
pub use memory::MemoryStore;
pub use models::{Actor, Cluster, Domain, Report, Trend, User};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("store responded with {status}: {body}")]
    Status { status: u16, body: String },

    #[error("could not decode store response: {0}")]
    Decode(String),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait Store: Send + Sync {
    /// `email` is expected to be normalized (trimmed, lower-cased) already.
    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;
    async fn get_user(&self, id: &str) -> Result<Option<User>, StoreError>;
    async fn update_last_login(&self, id: &str, at: DateTime<Utc>) -> Result<(), StoreError>;

    async fn get_all_reports(&self) -> Result<Vec<Report>, StoreError>;
    async fn get_report(&self, id: &str) -> Result<Option<Report>, StoreError>;
    async fn get_all_trends(&self) -> Result<Vec<Trend>, StoreError>;
    async fn get_trend(&self, id: &str) -> Result<Option<Trend>, StoreError>;
    async fn get_clusters(&self) -> Result<Vec<Cluster>, StoreError>;
    async fn get_all_domains(&self) -> Result<Vec<Domain>, StoreError>;
    async fn get_all_actors(&self) -> Result<Vec<Actor>, StoreError>;
    /// Domains linked to at least one actor.
    async fn get_actors_domains(&self) -> Result<Vec<Domain>, StoreError>;

    /// Drop any memoized reads. Stores without a cache ignore this.
    async fn invalidate(&self) {}
}

/// Normalize an email the way lookups expect it.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
