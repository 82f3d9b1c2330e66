use std::sync::Arc;

use crate::messaging::tabs::TabRegistry;
use crate::settings::SettingsStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub tabs: Arc<TabRegistry>,
    /// Written only by the options routes; the pipeline re-reads it per attempt.
    pub settings: Arc<dyn SettingsStore>,
}
