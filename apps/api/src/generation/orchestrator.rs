//! Generation orchestrator: picks the active provider and runs one attempt.
//!
//! Flow per attempt: require description → classify → build prompt →
//! load settings → key check → one provider call.
//!
//! The orchestrator is plumbing only. It never edits prompt text and holds no
//! provider-specific logic; that lives behind `ProviderClient`.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{info, warn};

use crate::generation::classifier::classify;
use crate::generation::prompt_builder::{build_proposal_prompt, build_questions_prompt};
use crate::llm_client::ProviderClient;
use crate::models::generation::{ErrorKind, GenerationRequest, GenerationResult, Provider};
use crate::models::job::{JobDetails, ProposalContext};
use crate::settings::{ProviderSettings, SettingsStore};

pub const DEFAULT_TEMPERATURE: f32 = 0.7;

pub struct GenerationOrchestrator {
    providers: HashMap<Provider, Arc<dyn ProviderClient>>,
    settings: Arc<dyn SettingsStore>,
    temperature: f32,
}

impl GenerationOrchestrator {
    pub fn new(settings: Arc<dyn SettingsStore>, temperature: f32) -> Self {
        Self {
            providers: HashMap::new(),
            settings,
            temperature,
        }
    }

    /// Registers a provider variant, replacing any previous one for the same provider.
    pub fn with_provider(mut self, client: Arc<dyn ProviderClient>) -> Self {
        self.providers.insert(client.provider(), client);
        self
    }

    /// Drafts a proposal for `job`. A job without a description fails with
    /// `ExtractionFailed` before any prompt is built.
    pub async fn generate_proposal(&self, job: &JobDetails) -> GenerationResult {
        let ctx = match ProposalContext::from_job(job) {
            Ok(ctx) => ctx,
            Err(e) => {
                warn!("Refusing to generate: {e}");
                return e.into();
            }
        };

        let specialization = classify(Some(ctx.description));
        info!("Classified job as {}", specialization.label());

        let prompt = build_proposal_prompt(&ctx, specialization);
        self.run(prompt).await
    }

    pub async fn generate_clarifying_questions(&self, description: &str) -> GenerationResult {
        let job = JobDetails {
            description: Some(description.to_string()),
            ..Default::default()
        };
        let ctx = match ProposalContext::from_job(&job) {
            Ok(ctx) => ctx,
            Err(e) => return e.into(),
        };
        self.run(build_questions_prompt(&ctx)).await
    }

    async fn run(&self, prompt_text: String) -> GenerationResult {
        // Settings are re-read per attempt; the user may have changed them since the last one.
        let settings = match ProviderSettings::load(self.settings.as_ref()).await {
            Ok(s) => s,
            Err(e) => {
                warn!("Could not load provider settings: {e}");
                return GenerationResult::failure(
                    ErrorKind::Unknown,
                    format!("Could not read provider settings: {e}"),
                );
            }
        };

        let provider = settings.active_provider;
        let Some(api_key) = settings.api_key(provider) else {
            info!("No credential configured for {provider}; skipping request");
            return GenerationResult::failure(
                ErrorKind::MissingCredential,
                format!("No API key is configured for {provider}. Add one in the options page."),
            );
        };

        let Some(client) = self.providers.get(&provider) else {
            warn!("{provider} selected but no client is registered");
            return GenerationResult::failure(
                ErrorKind::Unknown,
                format!("{provider} is not available in this build."),
            );
        };

        let request = GenerationRequest {
            prompt_text,
            provider,
            model_name: settings.model(provider).to_string(),
            temperature: self.temperature,
        };

        info!("Generating with {provider} (model {})", request.model_name);
        let result = client.generate_text(&request, api_key).await;

        match &result {
            GenerationResult::Success { text } => {
                info!("{provider} generation succeeded ({} chars)", text.len())
            }
            GenerationResult::Failure { kind, message } => {
                warn!("{provider} generation failed: {kind:?}: {message}")
            }
        }
        result
    }
}
