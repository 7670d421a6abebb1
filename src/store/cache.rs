use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::future::Future;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

use super::models::{Actor, Cluster, Domain, Report, Trend, User};
use super::{Store, StoreError};

/// One memoized collection. Failed loads are never stored.
struct Memo<T> {
    entry: RwLock<Option<(Instant, Vec<T>)>>,
}

impl<T: Clone> Memo<T> {
    fn new() -> Self {
        Self { entry: RwLock::new(None) }
    }

    async fn get_or_load<F, Fut>(&self, ttl: Duration, load: F) -> Result<Vec<T>, StoreError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<T>, StoreError>>,
    {
        if let Some((loaded_at, items)) = self.entry.read().await.as_ref() {
            if loaded_at.elapsed() < ttl {
                return Ok(items.clone());
            }
        }

        let fresh = load().await?;
        *self.entry.write().await = Some((Instant::now(), fresh.clone()));
        Ok(fresh)
    }

    async fn clear(&self) {
        *self.entry.write().await = None;
    }
}

/// Read-through cache over the content collections of another [`Store`].
///
/// User records are always read from and written to the inner store, since
/// login and ping need the current value. Concurrent misses may both hit the
/// inner store; the last writer wins, which is fine for read-only content.
pub struct CachedStore<S> {
    inner: S,
    ttl: Duration,
    reports: Memo<Report>,
    trends: Memo<Trend>,
    clusters: Memo<Cluster>,
    domains: Memo<Domain>,
    actors: Memo<Actor>,
    actors_domains: Memo<Domain>,
}

impl<S: Store> CachedStore<S> {
    pub fn new(inner: S, ttl: Duration) -> Self {
        Self {
            inner,
            ttl,
            reports: Memo::new(),
            trends: Memo::new(),
            clusters: Memo::new(),
            domains: Memo::new(),
            actors: Memo::new(),
            actors_domains: Memo::new(),
        }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }
}

#[async_trait]
impl<S: Store> Store for CachedStore<S> {
    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        self.inner.get_user_by_email(email).await
    }

    async fn get_user(&self, id: &str) -> Result<Option<User>, StoreError> {
        self.inner.get_user(id).await
    }

    async fn update_last_login(&self, id: &str, at: DateTime<Utc>) -> Result<(), StoreError> {
        self.inner.update_last_login(id, at).await
    }

    async fn get_all_reports(&self) -> Result<Vec<Report>, StoreError> {
        self.reports.get_or_load(self.ttl, || self.inner.get_all_reports()).await
    }

    async fn get_report(&self, id: &str) -> Result<Option<Report>, StoreError> {
        self.inner.get_report(id).await
    }

    async fn get_all_trends(&self) -> Result<Vec<Trend>, StoreError> {
        self.trends.get_or_load(self.ttl, || self.inner.get_all_trends()).await
    }

    async fn get_trend(&self, id: &str) -> Result<Option<Trend>, StoreError> {
        self.inner.get_trend(id).await
    }

    async fn get_clusters(&self) -> Result<Vec<Cluster>, StoreError> {
        self.clusters.get_or_load(self.ttl, || self.inner.get_clusters()).await
    }

    async fn get_all_domains(&self) -> Result<Vec<Domain>, StoreError> {
        self.domains.get_or_load(self.ttl, || self.inner.get_all_domains()).await
    }

    async fn get_all_actors(&self) -> Result<Vec<Actor>, StoreError> {
        self.actors.get_or_load(self.ttl, || self.inner.get_all_actors()).await
    }

    async fn get_actors_domains(&self) -> Result<Vec<Domain>, StoreError> {
        self.actors_domains
            .get_or_load(self.ttl, || self.inner.get_actors_domains())
            .await
    }

    async fn invalidate(&self) {
        futures::join!(
            self.reports.clear(),
            self.trends.clear(),
            self.clusters.clear(),
            self.domains.clear(),
            self.actors.clear(),
            self.actors_domains.clear(),
        );
        self.inner.invalidate().await;
        tracing::info!("Store cache invalidated");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn seeded() -> MemoryStore {
        let store = MemoryStore::new();
        store.insert_report(Report {
            id: "rec1".into(),
            name: "First".into(),
            ..Default::default()
        });
        store
    }

    #[tokio::test]
    async fn collection_reads_are_memoized_within_ttl() {
        let cached = CachedStore::new(seeded(), Duration::from_secs(60));

        assert_eq!(cached.get_all_reports().await.unwrap().len(), 1);
        assert_eq!(cached.get_all_reports().await.unwrap().len(), 1);
        assert_eq!(cached.inner().read_count(), 1);
    }

    #[tokio::test]
    async fn zero_ttl_always_reads_through() {
        let cached = CachedStore::new(seeded(), Duration::ZERO);

        cached.get_all_reports().await.unwrap();
        cached.get_all_reports().await.unwrap();
        assert_eq!(cached.inner().read_count(), 2);
    }

    #[tokio::test]
    async fn invalidate_forces_reload() {
        let cached = CachedStore::new(seeded(), Duration::from_secs(60));
        cached.get_all_reports().await.unwrap();

        cached.inner().insert_report(Report {
            id: "rec2".into(),
            name: "Second".into(),
            ..Default::default()
        });
        assert_eq!(cached.get_all_reports().await.unwrap().len(), 1);

        cached.invalidate().await;
        assert_eq!(cached.get_all_reports().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn failures_are_not_memoized() {
        let cached = CachedStore::new(seeded(), Duration::from_secs(60));
        cached.inner().set_failing(true);
        assert!(cached.get_all_reports().await.is_err());

        cached.inner().set_failing(false);
        assert_eq!(cached.get_all_reports().await.unwrap().len(), 1);
    }
}
