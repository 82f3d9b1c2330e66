//! Gemini `generateContent` client.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::llm_client::prompts::SYSTEM_INSTRUCTION;
use crate::llm_client::{
    classify_http_failure, finish_text, malformed, transport_failure, ProviderClient,
};
use crate::models::generation::{ErrorKind, GenerationRequest, GenerationResult, Provider};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const API_KEY_HEADER: &str = "x-goog-api-key";
const MAX_OUTPUT_TOKENS: u32 = 2048;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    system_instruction: Content<'a>,
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(Clone)]
pub struct GeminiClient {
    http: Client,
    base_url: String,
}

impl GeminiClient {
    pub fn new(http: Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn endpoint(&self, model: &str) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.base_url, model)
    }
}

#[async_trait]
impl ProviderClient for GeminiClient {
    fn provider(&self) -> Provider {
        Provider::Gemini
    }

    async fn generate_text(&self, request: &GenerationRequest, api_key: &str) -> GenerationResult {
        let body = GenerateContentRequest {
            system_instruction: Content {
                parts: vec![Part {
                    text: SYSTEM_INSTRUCTION,
                }],
            },
            contents: vec![Content {
                parts: vec![Part {
                    text: &request.prompt_text,
                }],
            }],
            generation_config: GenerationConfig {
                temperature: request.temperature,
                max_output_tokens: MAX_OUTPUT_TOKENS,
            },
        };

        debug!("POST Gemini generateContent (model {})", request.model_name);
        let response = match self
            .http
            .post(self.endpoint(&request.model_name))
            .header(API_KEY_HEADER, api_key)
            .json(&body)
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) => return transport_failure(Provider::Gemini, e),
        };

        let status = response.status();
        let text = match response.text().await {
            Ok(t) => t,
            Err(e) => return transport_failure(Provider::Gemini, e),
        };

        if !status.is_success() {
            return classify_http_failure(Provider::Gemini, status, &text);
        }

        parse_response(&text)
    }
}

fn parse_response(body: &str) -> GenerationResult {
    let parsed: GenerateContentResponse = match serde_json::from_str(body) {
        Ok(p) => p,
        Err(e) => return malformed(Provider::Gemini, e),
    };

    if let Some(reason) = parsed.prompt_feedback.and_then(|f| f.block_reason) {
        return GenerationResult::failure(
            ErrorKind::ContentBlocked,
            format!("Gemini blocked the request: {reason}"),
        );
    }

    let Some(candidate) = parsed.candidates.into_iter().next() else {
        return malformed(Provider::Gemini, "no candidates");
    };

    let text = candidate
        .content
        .and_then(|c| c.parts.into_iter().next())
        .and_then(|p| p.text);

    match (text, candidate.finish_reason.as_deref()) {
        (Some(text), _) => finish_text(Provider::Gemini, &text),
        (None, Some("SAFETY")) => GenerationResult::failure(
            ErrorKind::ContentBlocked,
            "Gemini blocked the request: SAFETY",
        ),
        (None, _) => malformed(Provider::Gemini, "candidate has no text"),
    }
}
