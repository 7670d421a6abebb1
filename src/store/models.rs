use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

/// Feature areas a user may open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Access {
    pub library: bool,
    pub radar: bool,
    pub directory: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub access: Access,
    pub report_ids: Vec<String>,
    pub trend_ids: Vec<String>,
    pub domain_ids: Vec<String>,
    /// RFC 3339 timestamp of the last recorded login.
    pub last_login: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub id: String,
    pub name: String,
    pub summary: Option<String>,
    pub body: Option<String>,
    pub year: Option<i32>,
    pub domain_ids: Vec<String>,
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trend {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub cluster_ids: Vec<String>,
    pub report_ids: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cluster {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Actor {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub website: Option<String>,
    pub domain_ids: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Domain {
    pub id: String,
    pub name: String,
}

/// Records that carry a display name, used for id → name lookup maps.
pub trait Named {
    fn id(&self) -> &str;
    fn name(&self) -> &str;
}

macro_rules! impl_named {
    ($($ty:ty),*) => {
        $(impl Named for $ty {
            fn id(&self) -> &str { &self.id }
            fn name(&self) -> &str { &self.name }
        })*
    };
}

impl_named!(Report, Trend, Cluster, Actor, Domain);

/// Year descending, reports without a year last, then name ascending.
pub fn compare_reports(a: &Report, b: &Report) -> Ordering {
    match (a.year, b.year) {
        (Some(x), Some(y)) => y.cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
    .then_with(|| a.name.cmp(&b.name))
}

pub fn sort_reports(reports: &mut [Report]) {
    reports.sort_by(compare_reports);
}

pub fn sort_by_name<T: Named>(items: &mut [T]) {
    items.sort_by(|a, b| a.name().cmp(b.name()));
}

/// Keep only the records whose id is in `ids`.
pub fn retain_bookmarked<T: Named>(items: Vec<T>, ids: &[String]) -> Vec<T> {
    let wanted: HashSet<&str> = ids.iter().map(String::as_str).collect();
    items
        .into_iter()
        .filter(|item| wanted.contains(item.id()))
        .collect()
}

pub fn name_map<T: Named>(items: &[T]) -> HashMap<String, String> {
    items
        .iter()
        .map(|item| (item.id().to_string(), item.name().to_string()))
        .collect()
}
