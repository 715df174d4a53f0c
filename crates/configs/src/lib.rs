//! # configs
//!
//! Layered settings: built-in defaults, then an optional TOML file, then
//! `RC__SECTION__KEY` environment variables. A `.env` file is read first so
//! its values take part as environment variables.

use std::path::{Path, PathBuf};
use std::time::Duration;

use config::{Config, Environment, File};
use secrecy::SecretString;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

/// File consulted when `RC_CONFIG` is not set. Missing is fine.
pub const DEFAULT_CONFIG_FILE: &str = "rusty-community.toml";
pub const CONFIG_PATH_VAR: &str = "RC_CONFIG";
pub const ENV_PREFIX: &str = "RC";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to load settings: {0}")]
    Load(#[from] config::ConfigError),
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub store: StoreSettings,
    #[serde(default)]
    pub identity: IdentitySettings,
    pub log: LogSettings,
}

#[derive(Debug, Deserialize)]
pub struct StoreSettings {
    /// Delay before create operations resolve
    pub simulated_latency_ms: u64,
    /// Load the built-in mock dataset at startup
    pub seed: bool,
    /// JSON dataset to load instead of the built-in one
    pub seed_file: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
pub struct IdentitySettings {
    /// Username signed in at startup
    pub default_user: Option<String>,
    /// Key for the hosted identity provider. Never logged.
    pub publishable_key: Option<SecretString>,
}

#[derive(Debug, Deserialize)]
pub struct LogSettings {
    /// Default filter when `RUST_LOG` is unset
    pub level: String,
    pub json: bool,
}

impl Settings {
    /// Loads `.env`, then `$RC_CONFIG` (or `rusty-community.toml`), then the
    /// environment.
    pub fn load() -> Result<Self, ConfigError> {
        if let Ok(path) = dotenvy::dotenv() {
            debug!(path = %path.display(), "loaded .env");
        }
        let file = std::env::var_os(CONFIG_PATH_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
        Self::build(Some(&file), ENV_PREFIX)
    }

    /// Defaults and `RC__*` variables only.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::build(None, ENV_PREFIX)
    }

    fn build(file: Option<&Path>, env_prefix: &str) -> Result<Self, ConfigError> {
        let mut builder = Config::builder()
            .set_default("store.simulated_latency_ms", 800)?
            .set_default("store.seed", true)?
            .set_default("log.level", "info")?
            .set_default("log.json", false)?;

        if let Some(file) = file {
            builder = builder.add_source(File::from(file).required(false));
        }

        let settings: Settings = builder
            .add_source(
                Environment::with_prefix(env_prefix)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        debug!(?settings, "settings loaded");
        Ok(settings)
    }

    pub fn simulated_latency(&self) -> Duration {
        Duration::from_millis(self.store.simulated_latency_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn defaults_need_no_sources() {
        let settings = Settings::build(None, "RC_TEST_UNSET").unwrap();
        assert_eq!(settings.store.simulated_latency_ms, 800);
        assert_eq!(settings.simulated_latency(), Duration::from_millis(800));
        assert!(settings.store.seed);
        assert!(settings.store.seed_file.is_none());
        assert!(settings.identity.default_user.is_none());
        assert!(settings.identity.publishable_key.is_none());
        assert_eq!(settings.log.level, "info");
        assert!(!settings.log.json);
    }

    #[test]
    fn missing_file_is_ignored() {
        let settings =
            Settings::build(Some(Path::new("/no/such/rusty-community.toml")), "RC_TEST_UNSET")
                .unwrap();
        assert_eq!(settings.store.simulated_latency_ms, 800);
    }

    #[test]
    fn file_overrides_defaults() {
        let path = std::env::temp_dir().join(format!("rc-settings-{}.toml", std::process::id()));
        std::fs::write(
            &path,
            "[store]\nsimulated_latency_ms = 0\nseed = false\n\n[identity]\ndefault_user = \"techguru\"\npublishable_key = \"pk_test_123\"\n",
        )
        .unwrap();

        let settings = Settings::build(Some(&path), "RC_TEST_UNSET").unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(settings.simulated_latency(), Duration::ZERO);
        assert!(!settings.store.seed);
        assert_eq!(settings.identity.default_user.as_deref(), Some("techguru"));
        let key = settings.identity.publishable_key.as_ref().unwrap();
        assert_eq!(key.expose_secret(), "pk_test_123");
        assert!(!format!("{settings:?}").contains("pk_test_123"));
    }

    #[test]
    fn environment_overrides_defaults() {
        std::env::set_var("RC_TEST_ENV__STORE__SIMULATED_LATENCY_MS", "5");
        std::env::set_var("RC_TEST_ENV__LOG__JSON", "true");
        let settings = Settings::build(None, "RC_TEST_ENV").unwrap();
        assert_eq!(settings.store.simulated_latency_ms, 5);
        assert!(settings.log.json);
    }
}
