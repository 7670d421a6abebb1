use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use std::collections::{BTreeMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};

use super::models::{Actor, Cluster, Domain, Report, Trend, User};
use super::{normalize_email, Store, StoreError};

#[derive(Default)]
struct Tables {
    users: BTreeMap<String, User>,
    reports: BTreeMap<String, Report>,
    trends: BTreeMap<String, Trend>,
    clusters: BTreeMap<String, Cluster>,
    domains: BTreeMap<String, Domain>,
    actors: BTreeMap<String, Actor>,
}

/// In-process [`Store`] holding seeded records.
///
/// `set_failing(true)` makes every call return [`StoreError::Unavailable`],
/// which is how the degrade paths are exercised without a network.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
    failing: AtomicBool,
    reads: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn tables(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn check(&self) -> Result<(), StoreError> {
        self.reads.fetch_add(1, Ordering::Relaxed);
        if self.failing.load(Ordering::Relaxed) {
            return Err(StoreError::Unavailable("memory store set to fail".to_string()));
        }
        Ok(())
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::Relaxed);
    }

    /// Number of store calls made so far, failed ones included.
    pub fn read_count(&self) -> usize {
        self.reads.load(Ordering::Relaxed)
    }

    pub fn insert_user(&self, user: User) {
        self.tables().users.insert(user.id.clone(), user);
    }

    pub fn insert_report(&self, report: Report) {
        self.tables().reports.insert(report.id.clone(), report);
    }

    pub fn insert_trend(&self, trend: Trend) {
        self.tables().trends.insert(trend.id.clone(), trend);
    }

    pub fn insert_cluster(&self, cluster: Cluster) {
        self.tables().clusters.insert(cluster.id.clone(), cluster);
    }

    pub fn insert_domain(&self, domain: Domain) {
        self.tables().domains.insert(domain.id.clone(), domain);
    }

    pub fn insert_actor(&self, actor: Actor) {
        self.tables().actors.insert(actor.id.clone(), actor);
    }

    /// Current copy of a user, bypassing the failure switch.
    pub fn user(&self, id: &str) -> Option<User> {
        self.tables().users.get(id).cloned()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        self.check()?;
        let wanted = normalize_email(email);
        Ok(self
            .tables()
            .users
            .values()
            .find(|user| normalize_email(&user.email) == wanted)
            .cloned())
    }

    async fn get_user(&self, id: &str) -> Result<Option<User>, StoreError> {
        self.check()?;
        Ok(self.tables().users.get(id).cloned())
    }

    async fn update_last_login(&self, id: &str, at: DateTime<Utc>) -> Result<(), StoreError> {
        self.check()?;
        match self.tables().users.get_mut(id) {
            Some(user) => {
                user.last_login = Some(at.to_rfc3339_opts(SecondsFormat::Millis, true));
                Ok(())
            }
            None => Err(StoreError::Status {
                status: 404,
                body: format!("no user {}", id),
            }),
        }
    }

    async fn get_all_reports(&self) -> Result<Vec<Report>, StoreError> {
        self.check()?;
        Ok(self.tables().reports.values().cloned().collect())
    }

    async fn get_report(&self, id: &str) -> Result<Option<Report>, StoreError> {
        self.check()?;
        Ok(self.tables().reports.get(id).cloned())
    }

    async fn get_all_trends(&self) -> Result<Vec<Trend>, StoreError> {
        self.check()?;
        Ok(self.tables().trends.values().cloned().collect())
    }

    async fn get_trend(&self, id: &str) -> Result<Option<Trend>, StoreError> {
        self.check()?;
        Ok(self.tables().trends.get(id).cloned())
    }

    async fn get_clusters(&self) -> Result<Vec<Cluster>, StoreError> {
        self.check()?;
        Ok(self.tables().clusters.values().cloned().collect())
    }

    async fn get_all_domains(&self) -> Result<Vec<Domain>, StoreError> {
        self.check()?;
        Ok(self.tables().domains.values().cloned().collect())
    }

    async fn get_all_actors(&self) -> Result<Vec<Actor>, StoreError> {
        self.check()?;
        Ok(self.tables().actors.values().cloned().collect())
    }

    async fn get_actors_domains(&self) -> Result<Vec<Domain>, StoreError> {
        self.check()?;
        let tables = self.tables();
        let linked: HashSet<&str> = tables
            .actors
            .values()
            .flat_map(|actor| actor.domain_ids.iter().map(String::as_str))
            .collect();
        Ok(tables
            .domains
            .values()
            .filter(|domain| linked.contains(domain.id.as_str()))
            .cloned()
            .collect())
    }
}
