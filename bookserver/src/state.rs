//! Shared application state injected into every Axum handler.

use std::sync::Arc;

use chrono::Duration;
use tracing::warn;
use uuid::Uuid;

use crate::config::Config;
use crate::entities::SqliteStore;
use crate::middleware::SessionKeys;

/// State shared across all HTTP handlers and middleware.
#[derive(Clone, Debug)]
pub struct AppState {
    /// Server configuration (env-derived).
    pub config: Arc<Config>,
    /// Users, courses and recorded answers.
    pub store: Arc<SqliteStore>,
    /// Session token signing keys.
    pub keys: Arc<SessionKeys>,
}

impl AppState {
    pub fn new(config: Config, store: SqliteStore) -> Self {
        let secret = match &config.jwt_secret {
            Some(secret) => secret.clone(),
            None => {
                warn!("BOOK_JWT_SECRET not set; using a random secret, sessions end on restart");
                format!("{}{}", Uuid::new_v4(), Uuid::new_v4())
            }
        };
        Self {
            keys: Arc::new(SessionKeys::from_secret(secret.as_bytes())),
            config: Arc::new(config),
            store: Arc::new(store),
        }
    }

    /// Issue a session token for `username` with the configured lifetime.
    pub fn issue_token(&self, username: &str) -> Result<String, crate::error::ServerError> {
        self.keys
            .issue_token(username, Duration::seconds(self.config.token_ttl_secs))
    }
}
