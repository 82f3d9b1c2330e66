use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::generation::orchestrator::DEFAULT_TEMPERATURE;
use crate::llm_client::{gemini, openai};
use crate::messaging::ui::DEFAULT_PING_TIMEOUT;

/// Application configuration loaded from environment variables.
/// Nothing is required; every variable has a default.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    /// JSON settings file. Settings are kept in memory when unset.
    pub settings_path: Option<PathBuf>,
    /// JSON selector overrides merged over the built-in chains.
    pub selectors_path: Option<PathBuf>,
    pub ping_timeout: Duration,
    pub provider_timeout: Duration,
    pub gemini_base_url: String,
    pub openai_base_url: String,
    pub temperature: f32,
    /// Seed credentials for the in-memory settings store.
    pub gemini_api_key: Option<String>,
    pub openai_api_key: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            port: parse_env("PORT", 8080u16)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            settings_path: optional_env("SETTINGS_PATH").map(PathBuf::from),
            selectors_path: optional_env("SELECTORS_PATH").map(PathBuf::from),
            ping_timeout: Duration::from_millis(parse_env(
                "PING_TIMEOUT_MS",
                DEFAULT_PING_TIMEOUT.as_millis() as u64,
            )?),
            provider_timeout: Duration::from_secs(parse_env("PROVIDER_TIMEOUT_SECS", 60u64)?),
            gemini_base_url: optional_env("GEMINI_BASE_URL")
                .unwrap_or_else(|| gemini::DEFAULT_BASE_URL.to_string()),
            openai_base_url: optional_env("OPENAI_BASE_URL")
                .unwrap_or_else(|| openai::DEFAULT_BASE_URL.to_string()),
            temperature: parse_env("GENERATION_TEMPERATURE", DEFAULT_TEMPERATURE)?,
            gemini_api_key: optional_env("GEMINI_API_KEY"),
            openai_api_key: optional_env("OPENAI_API_KEY"),
        })
    }
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match optional_env(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} has an invalid value: '{raw}'")),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_env_default_and_invalid() {
        std::env::remove_var("BIDPILOT_TEST_UNSET");
        assert_eq!(parse_env("BIDPILOT_TEST_UNSET", 42u16).unwrap(), 42);

        std::env::set_var("BIDPILOT_TEST_PORT", "not-a-port");
        let err = parse_env("BIDPILOT_TEST_PORT", 8080u16).unwrap_err();
        assert!(err.to_string().contains("BIDPILOT_TEST_PORT"));
        std::env::remove_var("BIDPILOT_TEST_PORT");
    }

    #[test]
    fn test_ping_timeout_defaults_to_session_default() {
        std::env::remove_var("PING_TIMEOUT_MS");
        let config = Config::from_env().unwrap();
        assert_eq!(config.ping_timeout, DEFAULT_PING_TIMEOUT);
    }

    #[test]
    fn test_blank_is_unset() {
        std::env::set_var("BIDPILOT_TEST_BLANK", "   ");
        assert!(optional_env("BIDPILOT_TEST_BLANK").is_none());
        std::env::remove_var("BIDPILOT_TEST_BLANK");
    }
}
