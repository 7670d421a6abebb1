use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::de::{DeserializeOwned, Deserializer};
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use url::Url;

use super::models::{Access, Actor, Cluster, Domain, Report, Trend, User};
use super::{Store, StoreError};
use crate::config::{AirtableConfig, TableNames};

const PAGE_SIZE: &str = "100";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);
const LINKED_TO_ACTOR: &str = "LEN(ARRAYJOIN({Actors})) > 0";

/// Airtable REST client implementing [`Store`].
pub struct AirtableStore {
    client: reqwest::Client,
    base_url: Url,
    api_key: String,
    tables: TableNames,
}

#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "F: Deserialize<'de> + Default"))]
struct RecordPage<F> {
    records: Vec<Record<F>>,
    offset: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "F: Deserialize<'de> + Default"))]
struct Record<F> {
    id: String,
    #[serde(default)]
    fields: F,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct UserFields {
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "Email")]
    email: String,
    #[serde(rename = "Library Access")]
    library: bool,
    #[serde(rename = "Radar Access")]
    radar: bool,
    #[serde(rename = "Directory Access")]
    directory: bool,
    #[serde(rename = "Reports")]
    reports: Vec<String>,
    #[serde(rename = "Trends")]
    trends: Vec<String>,
    #[serde(rename = "Domains")]
    domains: Vec<String>,
    #[serde(rename = "Last Login")]
    last_login: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ReportFields {
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "Summary")]
    summary: Option<String>,
    #[serde(rename = "Text")]
    body: Option<String>,
    #[serde(rename = "Year", deserialize_with = "lenient_year")]
    year: Option<i32>,
    #[serde(rename = "Domains")]
    domains: Vec<String>,
    #[serde(rename = "URL")]
    url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct TrendFields {
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "Description")]
    description: Option<String>,
    #[serde(rename = "Clusters")]
    clusters: Vec<String>,
    #[serde(rename = "Reports")]
    reports: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ActorFields {
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "Description")]
    description: Option<String>,
    #[serde(rename = "Website")]
    website: Option<String>,
    #[serde(rename = "Domains")]
    domains: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct NameFields {
    #[serde(rename = "Name")]
    name: String,
}

/// Year columns show up as numbers, numeric strings or not at all.
fn lenient_year<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f.trunc() as i64))
            .and_then(|y| i32::try_from(y).ok()),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    })
}

impl From<Record<UserFields>> for User {
    fn from(record: Record<UserFields>) -> Self {
        let f = record.fields;
        User {
            id: record.id,
            name: f.name,
            email: f.email,
            access: Access {
                library: f.library,
                radar: f.radar,
                directory: f.directory,
            },
            report_ids: f.reports,
            trend_ids: f.trends,
            domain_ids: f.domains,
            last_login: f.last_login.filter(|s| !s.is_empty()),
        }
    }
}

impl From<Record<ReportFields>> for Report {
    fn from(record: Record<ReportFields>) -> Self {
        let f = record.fields;
        Report {
            id: record.id,
            name: f.name,
            summary: f.summary,
            body: f.body,
            year: f.year,
            domain_ids: f.domains,
            url: f.url,
        }
    }
}

impl From<Record<TrendFields>> for Trend {
    fn from(record: Record<TrendFields>) -> Self {
        let f = record.fields;
        Trend {
            id: record.id,
            name: f.name,
            description: f.description,
            cluster_ids: f.clusters,
            report_ids: f.reports,
        }
    }
}

impl From<Record<ActorFields>> for Actor {
    fn from(record: Record<ActorFields>) -> Self {
        let f = record.fields;
        Actor {
            id: record.id,
            name: f.name,
            description: f.description,
            website: f.website,
            domain_ids: f.domains,
        }
    }
}

impl From<Record<NameFields>> for Cluster {
    fn from(record: Record<NameFields>) -> Self {
        Cluster { id: record.id, name: record.fields.name }
    }
}

impl From<Record<NameFields>> for Domain {
    fn from(record: Record<NameFields>) -> Self {
        Domain { id: record.id, name: record.fields.name }
    }
}

/// Quote a value for use inside an Airtable formula string literal.
fn formula_literal(value: &str) -> String {
    let escaped = value.replace('\\', "\\\\").replace('\'', "\\'");
    format!("'{}'", escaped)
}

impl AirtableStore {
    pub fn new(config: &AirtableConfig) -> Result<Self, StoreError> {
        let mut base_url = Url::parse(config.api_url.trim_end_matches('/'))
            .map_err(|e| StoreError::Unavailable(format!("invalid Airtable API url: {}", e)))?;
        base_url
            .path_segments_mut()
            .map_err(|_| StoreError::Unavailable("Airtable API url cannot be a base".to_string()))?
            .pop_if_empty()
            .push(&config.base_id);

        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("radar-dashboard/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url,
            api_key: config.api_key.clone(),
            tables: config.tables.clone(),
        })
    }

    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.extend(segments);
        }
        url
    }

    async fn send<T: DeserializeOwned>(&self, request: reqwest::RequestBuilder) -> Result<T, StoreError> {
        let response = request.bearer_auth(&self.api_key).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::Status { status: status.as_u16(), body });
        }
        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| StoreError::Decode(e.to_string()))
    }

    /// List every record of `table`, following the pagination cursor.
    async fn list<F>(
        &self,
        table: &str,
        formula: Option<&str>,
        max_records: Option<usize>,
    ) -> Result<Vec<Record<F>>, StoreError>
    where
        F: DeserializeOwned + Default,
    {
        let url = self.url(&[table]);
        let mut records = Vec::new();
        let mut offset: Option<String> = None;

        loop {
            let mut query: Vec<(&str, String)> = vec![("pageSize", PAGE_SIZE.to_string())];
            if let Some(formula) = formula {
                query.push(("filterByFormula", formula.to_string()));
            }
            if let Some(max) = max_records {
                query.push(("maxRecords", max.to_string()));
            }
            if let Some(cursor) = &offset {
                query.push(("offset", cursor.clone()));
            }

            let page: RecordPage<F> = self.send(self.client.get(url.clone()).query(&query)).await?;
            records.extend(page.records);

            match page.offset {
                Some(next) if max_records.map_or(true, |max| records.len() < max) => offset = Some(next),
                _ => break,
            }
        }

        tracing::debug!("Listed {} records from Airtable table '{}'", records.len(), table);
        Ok(records)
    }

    async fn fetch<F>(&self, table: &str, id: &str) -> Result<Option<Record<F>>, StoreError>
    where
        F: DeserializeOwned + Default,
    {
        match self.send(self.client.get(self.url(&[table, id]))).await {
            Ok(record) => Ok(Some(record)),
            Err(StoreError::Status { status: 404, .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn list_as<F, T>(&self, table: &str, formula: Option<&str>) -> Result<Vec<T>, StoreError>
    where
        F: DeserializeOwned + Default,
        T: From<Record<F>>,
    {
        let records = self.list::<F>(table, formula, None).await?;
        Ok(records.into_iter().map(T::from).collect())
    }
}

#[async_trait]
impl Store for AirtableStore {
    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let formula = format!("LOWER({{Email}}) = {}", formula_literal(email));
        let mut records = self
            .list::<UserFields>(&self.tables.users, Some(formula.as_str()), Some(1))
            .await?;
        Ok(records.pop().map(User::from))
    }

    async fn get_user(&self, id: &str) -> Result<Option<User>, StoreError> {
        Ok(self.fetch::<UserFields>(&self.tables.users, id).await?.map(User::from))
    }

    async fn update_last_login(&self, id: &str, at: DateTime<Utc>) -> Result<(), StoreError> {
        let body = json!({
            "fields": { "Last Login": at.to_rfc3339_opts(SecondsFormat::Millis, true) }
        });
        let request = self.client.patch(self.url(&[self.tables.users.as_str(), id])).json(&body);
        let _: Value = self.send(request).await?;
        Ok(())
    }

    async fn get_all_reports(&self) -> Result<Vec<Report>, StoreError> {
        self.list_as::<ReportFields, Report>(&self.tables.reports, None).await
    }

    async fn get_report(&self, id: &str) -> Result<Option<Report>, StoreError> {
        Ok(self.fetch::<ReportFields>(&self.tables.reports, id).await?.map(Report::from))
    }

    async fn get_all_trends(&self) -> Result<Vec<Trend>, StoreError> {
        self.list_as::<TrendFields, Trend>(&self.tables.trends, None).await
    }

    async fn get_trend(&self, id: &str) -> Result<Option<Trend>, StoreError> {
        Ok(self.fetch::<TrendFields>(&self.tables.trends, id).await?.map(Trend::from))
    }

    async fn get_clusters(&self) -> Result<Vec<Cluster>, StoreError> {
        self.list_as::<NameFields, Cluster>(&self.tables.clusters, None).await
    }

    async fn get_all_domains(&self) -> Result<Vec<Domain>, StoreError> {
        self.list_as::<NameFields, Domain>(&self.tables.domains, None).await
    }

    async fn get_all_actors(&self) -> Result<Vec<Actor>, StoreError> {
        self.list_as::<ActorFields, Actor>(&self.tables.actors, None).await
    }

    async fn get_actors_domains(&self) -> Result<Vec<Domain>, StoreError> {
        self.list_as::<NameFields, Domain>(&self.tables.domains, Some(LINKED_TO_ACTOR))
            .await
    }
}
