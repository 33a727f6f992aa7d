//! Shared application state.

use std::sync::Arc;

use tally_db::Database;

use crate::auth::JwtManager;
use crate::config::ServerConfig;

/// State handed to every handler. Cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub jwt: Arc<JwtManager>,
}

impl AppState {
    pub fn new(db: Database, config: &ServerConfig) -> Self {
        AppState {
            db,
            jwt: Arc::new(JwtManager::new(
                config.jwt_secret.clone(),
                config.jwt_lifetime_secs,
            )),
        }
    }
}
