use serde::{Deserialize, Serialize};
use std::env;
use thiserror::Error;

/// Development-only signing secret. Rejected by `validate()` outside development.
pub const DEV_SESSION_SECRET: &str = "radar-dev-session-secret";

/// Shared login password used when `LOGIN_PASSWORD` is not set.
pub const DEFAULT_LOGIN_PASSWORD: &str = "radar";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub security: SecurityConfig,
    pub airtable: AirtableConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    /// One password shared by every user; identity comes from the email lookup.
    #[serde(skip_serializing)]
    pub login_password: String,
    #[serde(skip_serializing)]
    pub session_secret: String,
    pub session_expiry_hours: u64,
    pub cookie_name: String,
    /// Adds `Secure` to the session cookie. Off only in the development
    /// preset so the dashboard works over plain `http://localhost`; staging
    /// and production turn it on.
    pub cookie_secure: bool,
    #[serde(skip_serializing)]
    pub webhook_secret: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AirtableConfig {
    pub api_url: String,
    #[serde(skip_serializing)]
    pub api_key: String,
    pub base_id: String,
    pub tables: TableNames,
    pub cache_ttl_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableNames {
    pub users: String,
    pub reports: String,
    pub trends: String,
    pub clusters: String,
    pub domains: String,
    pub actors: String,
}

impl Default for TableNames {
    fn default() -> Self {
        Self {
            users: "Users".to_string(),
            reports: "Reports".to_string(),
            trends: "Trends".to_string(),
            clusters: "Clusters".to_string(),
            domains: "Domains".to_string(),
            actors: "Actors".to_string(),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing configuration: {0}")]
    Missing(&'static str),

    #[error("SESSION_SECRET must be set to a non-default value in {0:?}")]
    InsecureSessionSecret(Environment),
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        Self::for_environment(environment).with_env_overrides()
    }

    pub fn for_environment(environment: Environment) -> Self {
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
    }

    fn with_env_overrides(mut self) -> Self {
        // Security overrides
        if let Ok(v) = env::var("LOGIN_PASSWORD") {
            if !v.is_empty() {
                self.security.login_password = v;
            }
        }
        if let Ok(v) = env::var("SESSION_SECRET") {
            self.security.session_secret = v;
        }
        if let Ok(v) = env::var("SESSION_EXPIRY_HOURS") {
            self.security.session_expiry_hours = v.parse().unwrap_or(self.security.session_expiry_hours);
        }
        if let Ok(v) = env::var("SESSION_COOKIE_NAME") {
            if !v.trim().is_empty() {
                self.security.cookie_name = v.trim().to_string();
            }
        }
        if let Ok(v) = env::var("SESSION_COOKIE_SECURE") {
            self.security.cookie_secure = v.parse().unwrap_or(self.security.cookie_secure);
        }
        if let Ok(v) = env::var("WEBHOOK_SECRET") {
            self.security.webhook_secret = Some(v).filter(|s| !s.is_empty());
        }

        // Airtable overrides
        if let Ok(v) = env::var("AIRTABLE_API_URL") {
            self.airtable.api_url = v.trim_end_matches('/').to_string();
        }
        if let Ok(v) = env::var("AIRTABLE_API_KEY") {
            self.airtable.api_key = v;
        }
        if let Ok(v) = env::var("AIRTABLE_BASE_ID") {
            self.airtable.base_id = v;
        }
        if let Ok(v) = env::var("AIRTABLE_CACHE_TTL_SECS") {
            self.airtable.cache_ttl_secs = v.parse().unwrap_or(self.airtable.cache_ttl_secs);
        }

        let tables = &mut self.airtable.tables;
        for (var, slot) in [
            ("AIRTABLE_TABLE_USERS", &mut tables.users),
            ("AIRTABLE_TABLE_REPORTS", &mut tables.reports),
            ("AIRTABLE_TABLE_TRENDS", &mut tables.trends),
            ("AIRTABLE_TABLE_CLUSTERS", &mut tables.clusters),
            ("AIRTABLE_TABLE_DOMAINS", &mut tables.domains),
            ("AIRTABLE_TABLE_ACTORS", &mut tables.actors),
        ] {
            if let Ok(v) = env::var(var) {
                if !v.is_empty() {
                    *slot = v;
                }
            }
        }

        self
    }

    /// Check the settings the server cannot run without.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.airtable.api_key.is_empty() {
            return Err(ConfigError::Missing("AIRTABLE_API_KEY"));
        }
        if self.airtable.base_id.is_empty() {
            return Err(ConfigError::Missing("AIRTABLE_BASE_ID"));
        }
        if !self.is_development()
            && (self.security.session_secret.is_empty()
                || self.security.session_secret == DEV_SESSION_SECRET)
        {
            return Err(ConfigError::InsecureSessionSecret(self.environment));
        }
        if self.security.session_secret.is_empty() {
            return Err(ConfigError::Missing("SESSION_SECRET"));
        }
        Ok(())
    }

    pub fn is_development(&self) -> bool {
        self.environment == Environment::Development
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            security: SecurityConfig {
                login_password: DEFAULT_LOGIN_PASSWORD.to_string(),
                session_secret: DEV_SESSION_SECRET.to_string(),
                session_expiry_hours: 24 * 30,
                cookie_name: "radar_session".to_string(),
                cookie_secure: false,
                webhook_secret: None,
            },
            airtable: AirtableConfig {
                api_url: "https://api.airtable.com/v0".to_string(),
                api_key: String::new(),
                base_id: String::new(),
                tables: TableNames::default(),
                cache_ttl_secs: 30,
            },
        }
    }

    fn staging() -> Self {
        let mut config = Self::development();
        config.environment = Environment::Staging;
        config.security.session_secret = String::new();
        config.security.cookie_secure = true;
        config.airtable.cache_ttl_secs = 60;
        config
    }

    fn production() -> Self {
        let mut config = Self::development();
        config.environment = Environment::Production;
        config.security.session_secret = String::new();
        config.security.cookie_secure = true;
        config.airtable.cache_ttl_secs = 300;
        config
    }
}
