use std::sync::Arc;

use crate::config::Config;
use crate::locks::UserLocks;
use crate::store::Store;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Pluggable persistence backend (JSON files or PostgreSQL).
    pub store: Arc<dyn Store>,
    pub config: Config,
    pub locks: UserLocks,
}
