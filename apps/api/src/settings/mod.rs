pub mod provider;
pub mod store;

pub use provider::ProviderSettings;
pub use store::{InMemorySettingsStore, JsonFileSettingsStore, SettingsError, SettingsStore};
