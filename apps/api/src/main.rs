mod config;
mod errors;
mod generation;
mod llm_client;
mod messaging;
mod models;
mod page;
mod routes;
mod settings;
mod state;

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::generation::orchestrator::GenerationOrchestrator;
use crate::llm_client::{build_http_client, GeminiClient, OpenAiClient};
use crate::messaging::background::BackgroundContext;
use crate::messaging::tabs::TabRegistry;
use crate::models::generation::Provider;
use crate::page::selectors::SelectorTable;
use crate::routes::build_router;
use crate::settings::{InMemorySettingsStore, JsonFileSettingsStore, ProviderSettings, SettingsStore};
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting BidPilot v{}", env!("CARGO_PKG_VERSION"));

    let settings = build_settings_store(&config).await?;

    let selectors = match &config.selectors_path {
        Some(path) => {
            info!("Loading selector overrides from {}", path.display());
            SelectorTable::from_json_file(path)
                .with_context(|| format!("Could not load selectors from {}", path.display()))?
        }
        None => SelectorTable::default(),
    };

    // Initialize provider clients (one shared HTTP client)
    let http = build_http_client(config.provider_timeout).context("Could not build HTTP client")?;
    let orchestrator = GenerationOrchestrator::new(Arc::clone(&settings), config.temperature)
        .with_provider(Arc::new(GeminiClient::new(http.clone(), &config.gemini_base_url)))
        .with_provider(Arc::new(OpenAiClient::new(http, &config.openai_base_url)));
    info!(
        "Provider clients initialized (timeout {:?}, temperature {})",
        config.provider_timeout, config.temperature
    );

    let background = BackgroundContext::spawn(Arc::new(orchestrator));
    let tabs = TabRegistry::new(background, Arc::new(selectors), config.ping_timeout);

    let state = AppState {
        tabs: Arc::new(tabs),
        settings,
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// File-backed store when `SETTINGS_PATH` is set; otherwise an in-memory
/// store seeded from the provider key environment variables.
async fn build_settings_store(config: &Config) -> Result<Arc<dyn SettingsStore>> {
    if let Some(path) = &config.settings_path {
        info!("Settings file: {}", path.display());
        return Ok(Arc::new(JsonFileSettingsStore::new(path)));
    }

    let store = InMemorySettingsStore::new();
    let mut seeded = ProviderSettings::default();
    for (provider, key) in [
        (Provider::Gemini, &config.gemini_api_key),
        (Provider::OpenAi, &config.openai_api_key),
    ] {
        if let Some(key) = key {
            seeded.api_key_by_provider.insert(provider, key.clone());
        }
    }
    if seeded.api_key_by_provider.len() == 1 {
        if let Some(provider) = seeded.api_key_by_provider.keys().next() {
            seeded.active_provider = *provider;
        }
    }
    seeded.save(&store).await?;
    info!(
        "In-memory settings (seeded keys: {:?})",
        seeded.api_key_by_provider.keys().collect::<Vec<_>>()
    );

    Ok(Arc::new(store))
}
