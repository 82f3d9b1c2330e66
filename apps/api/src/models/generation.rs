use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Text-generation backends the orchestrator can route to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Gemini,
    #[serde(rename = "openai")]
    OpenAi,
}

impl Provider {
    /// Model used when the settings store names none for this provider.
    pub fn default_model(self) -> &'static str {
        match self {
            Provider::Gemini => "gemini-2.0-flash",
            Provider::OpenAi => "gpt-4o-mini",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Provider::Gemini => "Gemini",
            Provider::OpenAi => "OpenAI",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Failure taxonomy shared by every stage of the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    MissingCredential,
    RateLimitedOrOverloaded,
    ContentBlocked,
    ProviderRejected,
    MalformedResponse,
    ExtractionFailed,
    FieldNotFound,
    TransportUnavailable,
    GenerationInProgress,
    Unknown,
}

impl ErrorKind {
    /// Actionable text shown to the user for this kind of failure.
    pub fn user_message(self) -> &'static str {
        match self {
            ErrorKind::MissingCredential => {
                "No API key is configured for the selected provider. Add one in the options page."
            }
            ErrorKind::RateLimitedOrOverloaded => {
                "The AI service is busy or rate limited. Please try again shortly."
            }
            ErrorKind::ContentBlocked => {
                "The AI provider blocked this request for safety reasons. Edit the job text or switch providers."
            }
            ErrorKind::ProviderRejected => {
                "The AI provider rejected the request. Check the API key and model name in the options page."
            }
            ErrorKind::MalformedResponse => {
                "The AI provider returned a response that could not be read. Please try again."
            }
            ErrorKind::ExtractionFailed => {
                "Could not read the job details. Make sure a project page is open."
            }
            ErrorKind::FieldNotFound => {
                "Could not find the bid form on this page. Open the bid form and try again."
            }
            ErrorKind::TransportUnavailable => {
                "Lost connection to the page. Refresh the project page and reopen the assistant."
            }
            ErrorKind::GenerationInProgress => {
                "A proposal is already being generated. Wait for it to finish."
            }
            ErrorKind::Unknown => "Something went wrong. Please try again.",
        }
    }

    /// Stable machine-readable code, the same string the kind serializes to.
    pub fn code(self) -> &'static str {
        match self {
            ErrorKind::MissingCredential => "MISSING_CREDENTIAL",
            ErrorKind::RateLimitedOrOverloaded => "RATE_LIMITED_OR_OVERLOADED",
            ErrorKind::ContentBlocked => "CONTENT_BLOCKED",
            ErrorKind::ProviderRejected => "PROVIDER_REJECTED",
            ErrorKind::MalformedResponse => "MALFORMED_RESPONSE",
            ErrorKind::ExtractionFailed => "EXTRACTION_FAILED",
            ErrorKind::FieldNotFound => "FIELD_NOT_FOUND",
            ErrorKind::TransportUnavailable => "TRANSPORT_UNAVAILABLE",
            ErrorKind::GenerationInProgress => "GENERATION_IN_PROGRESS",
            ErrorKind::Unknown => "UNKNOWN",
        }
    }
}

/// A typed pipeline failure. The message is surfaced to the user verbatim.
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
#[error("{message}")]
pub struct PipelineError {
    pub kind: ErrorKind,
    pub message: String,
}

impl PipelineError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Builds an error whose message is the kind's standard user message.
    pub fn of(kind: ErrorKind) -> Self {
        Self::new(kind, kind.user_message())
    }
}

/// One generation attempt, fully resolved before the network call.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub prompt_text: String,
    pub provider: Provider,
    pub model_name: String,
    pub temperature: f32,
}

/// Outcome of one generation attempt. Always exactly one variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "camelCase")]
pub enum GenerationResult {
    Success { text: String },
    Failure { kind: ErrorKind, message: String },
}

impl GenerationResult {
    pub fn success(text: impl Into<String>) -> Self {
        GenerationResult::Success { text: text.into() }
    }

    pub fn failure(kind: ErrorKind, message: impl Into<String>) -> Self {
        GenerationResult::Failure {
            kind,
            message: message.into(),
        }
    }
}

impl From<PipelineError> for GenerationResult {
    fn from(err: PipelineError) -> Self {
        GenerationResult::Failure {
            kind: err.kind,
            message: err.message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_serde_uses_settings_keys() {
        assert_eq!(serde_json::to_string(&Provider::Gemini).unwrap(), r#""gemini""#);
        assert_eq!(serde_json::to_string(&Provider::OpenAi).unwrap(), r#""openai""#);
        let parsed: Provider = serde_json::from_str(r#""openai""#).unwrap();
        assert_eq!(parsed, Provider::OpenAi);
    }

    #[test]
    fn test_every_error_kind_has_distinct_message() {
        let kinds = [
            ErrorKind::MissingCredential,
            ErrorKind::RateLimitedOrOverloaded,
            ErrorKind::ContentBlocked,
            ErrorKind::ProviderRejected,
            ErrorKind::MalformedResponse,
            ErrorKind::ExtractionFailed,
            ErrorKind::FieldNotFound,
            ErrorKind::TransportUnavailable,
            ErrorKind::GenerationInProgress,
            ErrorKind::Unknown,
        ];
        let messages: std::collections::HashSet<_> =
            kinds.iter().map(|k| k.user_message()).collect();
        assert_eq!(messages.len(), kinds.len());
    }

    #[test]
    fn test_code_matches_serialized_form() {
        for kind in [ErrorKind::RateLimitedOrOverloaded, ErrorKind::FieldNotFound, ErrorKind::Unknown] {
            assert_eq!(serde_json::to_value(kind).unwrap(), kind.code());
        }
    }

    #[test]
    fn test_rate_limit_message_says_try_again() {
        assert!(ErrorKind::RateLimitedOrOverloaded
            .user_message()
            .contains("try again"));
    }
}
