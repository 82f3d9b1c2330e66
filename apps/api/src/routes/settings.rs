//! Options surface: the only writer of provider settings.

use std::collections::BTreeMap;

use axum::{extract::State, Json};
use serde::Deserialize;
use tracing::info;

use crate::errors::AppError;
use crate::models::generation::Provider;
use crate::settings::ProviderSettings;
use crate::state::AppState;

/// Partial update. Omitted fields keep their stored value; a blank key or
/// model removes that provider's entry.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsUpdate {
    pub active_provider: Option<Provider>,
    #[serde(default)]
    pub api_key_by_provider: BTreeMap<Provider, String>,
    #[serde(default)]
    pub model_by_provider: BTreeMap<Provider, String>,
}

fn merge(target: &mut BTreeMap<Provider, String>, changes: BTreeMap<Provider, String>) {
    for (provider, value) in changes {
        let value = value.trim();
        if value.is_empty() {
            target.remove(&provider);
        } else {
            target.insert(provider, value.to_string());
        }
    }
}

/// GET /api/v1/settings
///
/// API keys are masked.
pub async fn handle_get_settings(
    State(state): State<AppState>,
) -> Result<Json<ProviderSettings>, AppError> {
    let settings = ProviderSettings::load(state.settings.as_ref()).await?;
    Ok(Json(settings.masked()))
}

/// PUT /api/v1/settings
pub async fn handle_put_settings(
    State(state): State<AppState>,
    Json(update): Json<SettingsUpdate>,
) -> Result<Json<ProviderSettings>, AppError> {
    let mut settings = ProviderSettings::load(state.settings.as_ref()).await?;

    if let Some(provider) = update.active_provider {
        settings.active_provider = provider;
    }
    merge(&mut settings.api_key_by_provider, update.api_key_by_provider);
    merge(&mut settings.model_by_provider, update.model_by_provider);

    settings.save(state.settings.as_ref()).await?;
    info!("Settings updated (active provider: {})", settings.active_provider);

    Ok(Json(settings.masked()))
}
