use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::generation::Provider;
use crate::settings::store::{SettingsError, SettingsStore};

pub const ACTIVE_PROVIDER_KEY: &str = "activeProvider";
pub const API_KEYS_KEY: &str = "apiKeyByProvider";
pub const MODELS_KEY: &str = "modelByProvider";

/// Provider choice, credentials and model names as persisted by the options surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderSettings {
    pub active_provider: Provider,
    #[serde(default)]
    pub api_key_by_provider: BTreeMap<Provider, String>,
    #[serde(default)]
    pub model_by_provider: BTreeMap<Provider, String>,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            active_provider: Provider::Gemini,
            api_key_by_provider: BTreeMap::new(),
            model_by_provider: BTreeMap::new(),
        }
    }
}

impl ProviderSettings {
    /// Reads the three settings keys in one store read. Missing keys fall
    /// back to defaults.
    pub async fn load(store: &dyn SettingsStore) -> Result<Self, SettingsError> {
        let mut values = store
            .get_many(&[ACTIVE_PROVIDER_KEY, API_KEYS_KEY, MODELS_KEY])
            .await?
            .into_iter();
        let mut next = || values.next().flatten();

        let active_provider = decode(ACTIVE_PROVIDER_KEY, next())?;
        let api_key_by_provider = decode(API_KEYS_KEY, next())?;
        let model_by_provider = decode(MODELS_KEY, next())?;
        Ok(Self {
            active_provider: active_provider.unwrap_or(Self::default().active_provider),
            api_key_by_provider: api_key_by_provider.unwrap_or_default(),
            model_by_provider: model_by_provider.unwrap_or_default(),
        })
    }

    /// Writes all three keys in one store operation.
    pub async fn save(&self, store: &dyn SettingsStore) -> Result<(), SettingsError> {
        store
            .set_many(vec![
                (ACTIVE_PROVIDER_KEY, serde_json::to_value(self.active_provider)?),
                (API_KEYS_KEY, serde_json::to_value(&self.api_key_by_provider)?),
                (MODELS_KEY, serde_json::to_value(&self.model_by_provider)?),
            ])
            .await
    }

    /// Credential for `provider`, if one is set and not blank.
    pub fn api_key(&self, provider: Provider) -> Option<&str> {
        self.api_key_by_provider
            .get(&provider)
            .map(|k| k.trim())
            .filter(|k| !k.is_empty())
    }

    pub fn model(&self, provider: Provider) -> &str {
        self.model_by_provider
            .get(&provider)
            .map(|m| m.trim())
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| provider.default_model())
    }

    /// Copy safe to show in a UI: keys reduced to their last four characters.
    pub fn masked(&self) -> Self {
        let api_key_by_provider = self
            .api_key_by_provider
            .iter()
            .map(|(provider, key)| (*provider, mask_secret(key)))
            .collect();
        Self {
            api_key_by_provider,
            ..self.clone()
        }
    }
}

fn decode<T: DeserializeOwned>(key: &str, value: Option<Value>) -> Result<Option<T>, SettingsError> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(value) => serde_json::from_value(value)
            .map(Some)
            .map_err(|e| SettingsError::Invalid {
                key: key.to_string(),
                reason: e.to_string(),
            }),
    }
}

fn mask_secret(secret: &str) -> String {
    let chars: Vec<char> = secret.trim().chars().collect();
    if chars.len() <= 4 {
        return "****".to_string();
    }
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("****{tail}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::settings::store::InMemorySettingsStore;
    use serde_json::json;

    #[tokio::test]
    async fn test_empty_store_loads_defaults() {
        let store = InMemorySettingsStore::new();
        let settings = ProviderSettings::load(&store).await.unwrap();
        assert_eq!(settings, ProviderSettings::default());
        assert!(settings.api_key(Provider::Gemini).is_none());
        assert_eq!(settings.model(Provider::Gemini), "gemini-2.0-flash");
    }

    #[tokio::test]
    async fn test_load_reads_schema_keys() {
        let store = InMemorySettingsStore::new();
        store.set_many(vec![(ACTIVE_PROVIDER_KEY, json!("openai"))]).await.unwrap();
        store
            .set_many(vec![(API_KEYS_KEY, json!({"openai": "sk-abc", "gemini": "  "}))])
            .await
            .unwrap();
        store.set_many(vec![(MODELS_KEY, json!({"openai": "gpt-4o"}))]).await.unwrap();

        let settings = ProviderSettings::load(&store).await.unwrap();
        assert_eq!(settings.active_provider, Provider::OpenAi);
        assert_eq!(settings.api_key(Provider::OpenAi), Some("sk-abc"));
        assert!(settings.api_key(Provider::Gemini).is_none(), "blank key is no key");
        assert_eq!(settings.model(Provider::OpenAi), "gpt-4o");
    }

    #[tokio::test]
    async fn test_unknown_provider_is_invalid() {
        let store = InMemorySettingsStore::new();
        store.set_many(vec![(ACTIVE_PROVIDER_KEY, json!("claude"))]).await.unwrap();
        let err = ProviderSettings::load(&store).await.unwrap_err();
        assert!(matches!(err, SettingsError::Invalid { .. }));
    }

    #[tokio::test]
    async fn test_save_then_load() {
        let store = InMemorySettingsStore::new();
        let mut settings = ProviderSettings::default();
        settings.active_provider = Provider::OpenAi;
        settings
            .api_key_by_provider
            .insert(Provider::OpenAi, "sk-123456".to_string());
        settings.save(&store).await.unwrap();
        assert_eq!(ProviderSettings::load(&store).await.unwrap(), settings);
    }

    /// Counts store round-trips so a save or load can be checked to be one operation.
    #[derive(Default)]
    struct CountingStore {
        inner: InMemorySettingsStore,
        reads: AtomicUsize,
        writes: AtomicUsize,
    }

    #[async_trait::async_trait]
    impl SettingsStore for CountingStore {
        async fn get_many(&self, keys: &[&str]) -> Result<Vec<Option<Value>>, SettingsError> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            self.inner.get_many(keys).await
        }

        async fn set_many(&self, entries: Vec<(&str, Value)>) -> Result<(), SettingsError> {
            self.writes.fetch_add(1, Ordering::SeqCst);
            self.inner.set_many(entries).await
        }
    }

    #[tokio::test]
    async fn test_save_and_load_are_single_store_operations() {
        let store = CountingStore::default();
        let mut settings = ProviderSettings::default();
        settings.active_provider = Provider::OpenAi;
        settings
            .api_key_by_provider
            .insert(Provider::OpenAi, "sk-123456".to_string());
        settings
            .model_by_provider
            .insert(Provider::OpenAi, "gpt-4o".to_string());

        settings.save(&store).await.unwrap();
        assert_eq!(store.writes.load(Ordering::SeqCst), 1);

        assert_eq!(ProviderSettings::load(&store).await.unwrap(), settings);
        assert_eq!(store.reads.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_masked_hides_keys() {
        let mut settings = ProviderSettings::default();
        settings
            .api_key_by_provider
            .insert(Provider::Gemini, "AIzaSyExample1234".to_string());
        settings
            .api_key_by_provider
            .insert(Provider::OpenAi, "abc".to_string());
        let masked = settings.masked();
        assert_eq!(masked.api_key_by_provider[&Provider::Gemini], "****1234");
        assert_eq!(masked.api_key_by_provider[&Provider::OpenAi], "****");
    }
}
