use std::sync::Arc;

use qalab_pipeline::{Aggregator, PgQaStore};

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: qalab_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// The aggregation pipeline shared by the scheduler and request handlers.
    pub aggregator: Arc<Aggregator>,
}

impl AppState {
    pub fn new(pool: qalab_db::DbPool, config: ServerConfig) -> Self {
        let store = Arc::new(PgQaStore::new(pool.clone()));
        Self {
            pool,
            config: Arc::new(config),
            aggregator: Arc::new(Aggregator::new(store)),
        }
    }
}
