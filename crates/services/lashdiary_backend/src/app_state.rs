// --- File: crates/services/lashdiary_backend/src/app_state.rs ---
use crate::service_factory::LabsServiceFactory;
use lashdiary_common::services::ServiceFactory;
use lashdiary_config::AppConfig;
use lashdiary_store::JsonStore;
use std::sync::Arc;

/// Application state that is shared across all routes.
///
/// Built once at startup: the configuration, the JSON data store, and the
/// service factory that wires up whichever external collaborators the
/// runtime flags enable.
#[derive(Clone)]
pub struct AppState {
    /// The application configuration.
    #[allow(dead_code)]
    pub config: Arc<AppConfig>,

    /// Service factory for accessing external collaborators.
    pub service_factory: Arc<dyn ServiceFactory>,

    /// The shared data store holding the booking collections.
    pub store: Arc<JsonStore>,
}

impl AppState {
    /// Create a new AppState with the given configuration.
    pub async fn new(
        config: Arc<AppConfig>,
    ) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let store = Arc::new(JsonStore::new(&config.store)?);
        let service_factory = Arc::new(LabsServiceFactory::new(config.clone()).await);

        Ok(Self {
            config,
            service_factory,
            store,
        })
    }
}
