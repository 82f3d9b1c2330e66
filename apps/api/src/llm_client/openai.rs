//! OpenAI chat-completions client.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::llm_client::prompts::SYSTEM_INSTRUCTION;
use crate::llm_client::{
    classify_http_failure, finish_text, malformed, transport_failure, ProviderClient,
};
use crate::models::generation::{ErrorKind, GenerationRequest, GenerationResult, Provider};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com";

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Option<ResponseMessage>,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
    refusal: Option<String>,
}

#[derive(Clone)]
pub struct OpenAiClient {
    http: Client,
    base_url: String,
}

impl OpenAiClient {
    pub fn new(http: Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl ProviderClient for OpenAiClient {
    fn provider(&self) -> Provider {
        Provider::OpenAi
    }

    async fn generate_text(&self, request: &GenerationRequest, api_key: &str) -> GenerationResult {
        let body = ChatCompletionRequest {
            model: &request.model_name,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_INSTRUCTION,
                },
                ChatMessage {
                    role: "user",
                    content: &request.prompt_text,
                },
            ],
            temperature: request.temperature,
        };

        debug!("POST OpenAI chat/completions (model {})", request.model_name);
        let response = match self
            .http
            .post(format!("{}/v1/chat/completions", self.base_url))
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) => return transport_failure(Provider::OpenAi, e),
        };

        let status = response.status();
        let text = match response.text().await {
            Ok(t) => t,
            Err(e) => return transport_failure(Provider::OpenAi, e),
        };

        if !status.is_success() {
            return classify_http_failure(Provider::OpenAi, status, &text);
        }

        parse_response(&text)
    }
}

fn parse_response(body: &str) -> GenerationResult {
    let parsed: ChatCompletionResponse = match serde_json::from_str(body) {
        Ok(p) => p,
        Err(e) => return malformed(Provider::OpenAi, e),
    };

    let Some(message) = parsed.choices.into_iter().next().and_then(|c| c.message) else {
        return malformed(Provider::OpenAi, "no choices");
    };

    match (message.content, message.refusal) {
        (Some(content), _) => finish_text(Provider::OpenAi, &content),
        (None, Some(refusal)) => GenerationResult::failure(
            ErrorKind::ContentBlocked,
            format!("OpenAI refused the request: {refusal}"),
        ),
        (None, None) => malformed(Provider::OpenAi, "message has no content"),
    }
}
