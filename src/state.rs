use crate::config::Config;
use sqlx::PgPool;
use std::sync::Arc;

/// Shared application state: the connection pool plus the parsed config.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(db: PgPool, config: Config) -> Self {
        let config = Arc::new(config);
        Self { db, config }
    }
}
