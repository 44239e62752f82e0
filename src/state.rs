//! Application state for Axum web framework.
//!
//! Contains shared services and resources that are accessible
//! across all request handlers.

use std::sync::Arc;

use crate::repositories::{PlayerStore, Repositories};
use crate::services::Services;

/// Application state containing all shared services and resources.
///
/// Cloning is cheap since everything inside is behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// All business logic services
    pub services: Services,
    /// Direct store access for health probes
    pub store: Arc<dyn PlayerStore>,
}

impl AppState {
    /// Wires repositories and services over the given store.
    ///
    /// # Example
    /// ```ignore
    /// let pool = establish_async_connection_pool(&settings.database).await?;
    /// let state = AppState::new(Arc::new(PgPlayerStore::new(pool)));
    /// ```
    pub fn new(store: Arc<dyn PlayerStore>) -> Self {
        let repos = Repositories::new(store.clone());
        let services = Services::new(repos);
        Self { services, store }
    }
}
