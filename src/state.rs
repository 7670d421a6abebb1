use std::sync::Arc;

use crate::auth::{cookie::SessionCookie, SessionCodec};
use crate::config::AppConfig;
use crate::store::Store;

/// Shared handler state. Built once at startup; cheap to clone per request.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Arc<dyn Store>,
    pub sessions: SessionCodec,
    pub cookie: SessionCookie,
}

impl AppState {
    pub fn new(config: AppConfig, store: Arc<dyn Store>) -> Self {
        let sessions = SessionCodec::from_config(&config.security);
        let cookie = SessionCookie::new(
            config.security.cookie_name.clone(),
            config.security.cookie_secure,
            sessions.lifetime(),
        );
        Self {
            config: Arc::new(config),
            store,
            sessions,
            cookie,
        }
    }
}
