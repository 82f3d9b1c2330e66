//! Provider clients: the only code that talks to text-generation APIs.
//!
//! ARCHITECTURAL RULE: every provider variant implements `ProviderClient` and
//! normalizes its own wire format into a `GenerationResult`. Callers never see
//! provider-specific shapes, status codes, or reqwest errors.
//!
//! No automatic retries: one call per attempt, failures are classified and
//! surfaced to the user, who decides whether to try again.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::warn;

use crate::models::generation::{ErrorKind, GenerationRequest, GenerationResult, Provider};

pub mod gemini;
pub mod openai;
pub mod prompts;

pub use gemini::GeminiClient;
pub use openai::OpenAiClient;

/// Capability shared by every provider variant.
#[async_trait]
pub trait ProviderClient: Send + Sync {
    fn provider(&self) -> Provider;

    /// Sends one generation request. Never panics and never returns a bare
    /// transport error: every outcome is a `GenerationResult`.
    async fn generate_text(&self, request: &GenerationRequest, api_key: &str) -> GenerationResult;
}

/// Builds the HTTP client shared by the provider variants. The request timeout
/// is the only timeout the generation path has.
pub fn build_http_client(timeout: Duration) -> Result<Client, reqwest::Error> {
    Client::builder().timeout(timeout).build()
}

#[derive(Debug, Deserialize)]
struct ProviderErrorEnvelope {
    error: ProviderErrorBody,
}

#[derive(Debug, Deserialize)]
struct ProviderErrorBody {
    message: String,
}

/// Classifies a non-success HTTP status into the shared taxonomy.
///
/// 429 and 503 are the "busy, come back later" class. Anything else carrying a
/// provider `{"error": {"message": ...}}` body is a rejection; the rest is unknown.
pub(crate) fn classify_http_failure(provider: Provider, status: StatusCode, body: &str) -> GenerationResult {
    warn!("{provider} API returned {status}");

    if status == StatusCode::TOO_MANY_REQUESTS || status == StatusCode::SERVICE_UNAVAILABLE {
        return GenerationResult::failure(
            ErrorKind::RateLimitedOrOverloaded,
            format!(
                "{provider} is overloaded or rate limited (HTTP {}). Please try again shortly.",
                status.as_u16()
            ),
        );
    }

    match serde_json::from_str::<ProviderErrorEnvelope>(body) {
        Ok(envelope) if !envelope.error.message.trim().is_empty() => GenerationResult::failure(
            ErrorKind::ProviderRejected,
            format!(
                "{provider} API error (status {}): {}",
                status.as_u16(),
                envelope.error.message.trim()
            ),
        ),
        _ => GenerationResult::failure(
            ErrorKind::Unknown,
            format!("{provider} request failed with HTTP {}", status.as_u16()),
        ),
    }
}

/// A request that never produced an HTTP response (DNS, connect, timeout).
///
/// The URL is stripped from the error before it is logged or surfaced.
pub(crate) fn transport_failure(provider: Provider, err: reqwest::Error) -> GenerationResult {
    let err = err.without_url();
    warn!("{provider} request did not complete: {err}");
    let message = if err.is_timeout() {
        format!("{provider} did not answer in time. Please try again.")
    } else {
        format!("Could not reach {provider}: {err}")
    };
    GenerationResult::failure(ErrorKind::Unknown, message)
}

pub(crate) fn malformed(provider: Provider, detail: impl std::fmt::Display) -> GenerationResult {
    warn!("{provider} response could not be read: {detail}");
    GenerationResult::failure(
        ErrorKind::MalformedResponse,
        format!("{provider} returned an unexpected response: {detail}"),
    )
}

/// Trims the generated text; an empty result counts as malformed.
pub(crate) fn finish_text(provider: Provider, text: &str) -> GenerationResult {
    let text = text.trim();
    if text.is_empty() {
        malformed(provider, "empty text")
    } else {
        GenerationResult::success(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_503_is_rate_limited_with_try_again() {
        let result = classify_http_failure(Provider::Gemini, StatusCode::SERVICE_UNAVAILABLE, "");
        match result {
            GenerationResult::Failure { kind, message } => {
                assert_eq!(kind, ErrorKind::RateLimitedOrOverloaded);
                assert!(message.contains("try again"));
            }
            other => panic!("expected failure, got {other:?}"),
        }
    }

    #[test]
    fn test_429_is_rate_limited() {
        let result = classify_http_failure(Provider::OpenAi, StatusCode::TOO_MANY_REQUESTS, "{}");
        assert!(matches!(
            result,
            GenerationResult::Failure { kind: ErrorKind::RateLimitedOrOverloaded, .. }
        ));
    }

    #[test]
    fn test_error_with_provider_message_is_rejected() {
        let body = r#"{"error": {"code": 400, "message": "API key not valid.", "status": "INVALID_ARGUMENT"}}"#;
        let result = classify_http_failure(Provider::Gemini, StatusCode::BAD_REQUEST, body);
        assert_eq!(
            result,
            GenerationResult::failure(
                ErrorKind::ProviderRejected,
                "Gemini API error (status 400): API key not valid."
            )
        );
    }

    #[test]
    fn test_error_without_message_is_unknown() {
        let result =
            classify_http_failure(Provider::OpenAi, StatusCode::INTERNAL_SERVER_ERROR, "<html>oops</html>");
        assert!(matches!(
            result,
            GenerationResult::Failure { kind: ErrorKind::Unknown, .. }
        ));
    }

    #[test]
    fn test_finish_text_trims_and_rejects_empty() {
        assert_eq!(
            finish_text(Provider::Gemini, "  \nHello\n "),
            GenerationResult::success("Hello")
        );
        assert!(matches!(
            finish_text(Provider::Gemini, "   "),
            GenerationResult::Failure { kind: ErrorKind::MalformedResponse, .. }
        ));
    }
}
