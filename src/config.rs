//! Application configuration.
//!
//! Read from `<config_dir>/clearskin/config.toml`. Every field has a default,
//! and a handful of environment variables override the file:
//!
//! - `CLEARSKIN_PROVIDER`, `CLEARSKIN_MODEL`, `CLEARSKIN_API_KEY`
//! - `GEMINI_API_KEY` / `ANTHROPIC_API_KEY` / `OPENAI_API_KEY` when no key
//!   is configured otherwise
//! - `CLEARSKIN_DATA_DIR`

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::analyzer::vision::DEFAULT_TIMEOUT_SECS;
use crate::analyzer::{Provider, ProviderConfig};
use crate::error::{ClearSkinError, Result};

const APP_DIR: &str = "clearskin";
const DB_FILE: &str = "analyses.db";
const PREFS_FILE: &str = "preferences.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub provider: Provider,
    /// Defaults to the provider's recommended vision model
    pub model: Option<String>,
    pub api_key: Option<String>,
    pub request_timeout_secs: u64,
    /// Overrides the provider's public endpoint
    pub endpoint: Option<String>,
    pub data_dir: Option<PathBuf>,
    /// History owner. Single-user installs keep the default.
    pub user_id: String,
    /// Custom product catalog; the embedded one is used when unset
    pub products_path: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            provider: Provider::default(),
            model: None,
            api_key: None,
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
            endpoint: None,
            data_dir: None,
            user_id: "local".to_string(),
            products_path: None,
        }
    }
}

impl AppConfig {
    /// Load from `path` (or the default location) and apply environment
    /// overrides. A missing file is not an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(p) => Some(p.to_path_buf()),
            None => default_config_path(),
        };

        let mut config = match path {
            Some(ref p) if p.exists() => {
                let config = Self::from_file(p)?;
                info!("Loaded config from {:?}", p);
                config
            }
            _ => {
                debug!("No config file found, using defaults");
                Self::default()
            }
        };

        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| ClearSkinError::Config(format!("Invalid config {:?}: {}", path, e)))
    }

    /// Apply overrides from an environment-like lookup.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        let lookup = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(provider) = lookup("CLEARSKIN_PROVIDER") {
            self.provider = provider
                .parse()
                .map_err(|e| ClearSkinError::Config(format!("CLEARSKIN_PROVIDER: {}", e)))?;
        }
        if let Some(model) = lookup("CLEARSKIN_MODEL") {
            self.model = Some(model);
        }
        if let Some(key) = lookup("CLEARSKIN_API_KEY") {
            self.api_key = Some(key);
        }
        if self.api_key.is_none() {
            self.api_key = lookup(self.provider.api_key_env());
        }
        if let Some(dir) = lookup("CLEARSKIN_DATA_DIR") {
            self.data_dir = Some(PathBuf::from(dir));
        }
        Ok(())
    }

    /// Settings for the vision client. The key may still be missing; the
    /// client reports that before making any request.
    pub fn provider_config(&self) -> ProviderConfig {
        let mut config = ProviderConfig::new(self.provider, self.api_key.clone());
        if let Some(ref model) = self.model {
            config.model = model.clone();
        }
        config.timeout = Duration::from_secs(self.request_timeout_secs.max(1));
        config.endpoint = self.endpoint.clone();
        config
    }

    pub fn data_dir(&self) -> PathBuf {
        self.data_dir
            .clone()
            .or_else(|| dirs::data_dir().map(|d| d.join(APP_DIR)))
            .unwrap_or_else(|| PathBuf::from(".").join(APP_DIR))
    }

    pub fn db_path(&self) -> PathBuf {
        self.data_dir().join(DB_FILE)
    }

    pub fn prefs_path(&self) -> PathBuf {
        self.data_dir().join(PREFS_FILE)
    }
}

pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(APP_DIR).join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.provider, Provider::Gemini);
        assert_eq!(config.request_timeout_secs, 60);
        assert_eq!(config.user_id, "local");

        let provider = config.provider_config();
        assert_eq!(provider.model, "gemini-2.0-flash");
        assert_eq!(provider.timeout, Duration::from_secs(60));
        assert!(provider.api_key.is_none());
    }

    #[test]
    fn test_parse_partial_toml() {
        let config: AppConfig = toml::from_str(
            r#"
provider = "claude"
request_timeout_secs = 30
data_dir = "/tmp/clearskin-test"
"#,
        )
        .unwrap();
        assert_eq!(config.provider, Provider::Claude);
        assert_eq!(config.request_timeout_secs, 30);
        assert_eq!(config.db_path(), PathBuf::from("/tmp/clearskin-test/analyses.db"));
        assert_eq!(
            config.prefs_path(),
            PathBuf::from("/tmp/clearskin-test/preferences.json")
        );
        assert_eq!(config.user_id, "local");
    }

    #[test]
    fn test_env_overrides() {
        let mut config = AppConfig::default();
        config
            .apply_overrides(env(&[
                ("CLEARSKIN_PROVIDER", "openai"),
                ("CLEARSKIN_MODEL", "gpt-4o-mini"),
                ("CLEARSKIN_API_KEY", "sk-test"),
                ("CLEARSKIN_DATA_DIR", "/data"),
            ]))
            .unwrap();

        assert_eq!(config.provider, Provider::OpenAi);
        assert_eq!(config.api_key.as_deref(), Some("sk-test"));
        assert_eq!(config.data_dir(), PathBuf::from("/data"));
        assert_eq!(config.provider_config().model, "gpt-4o-mini");
    }

    #[test]
    fn test_provider_specific_key_fallback() {
        let mut config = AppConfig {
            provider: Provider::Claude,
            ..AppConfig::default()
        };
        config
            .apply_overrides(env(&[
                ("ANTHROPIC_API_KEY", "anthropic-key"),
                ("GEMINI_API_KEY", "gemini-key"),
            ]))
            .unwrap();
        assert_eq!(config.api_key.as_deref(), Some("anthropic-key"));
    }

    #[test]
    fn test_configured_key_wins_over_provider_env() {
        let mut config = AppConfig {
            api_key: Some("from-file".to_string()),
            ..AppConfig::default()
        };
        config
            .apply_overrides(env(&[("GEMINI_API_KEY", "from-env")]))
            .unwrap();
        assert_eq!(config.api_key.as_deref(), Some("from-file"));
    }

    #[test]
    fn test_unknown_provider_is_config_error() {
        let mut config = AppConfig::default();
        let err = config
            .apply_overrides(env(&[("CLEARSKIN_PROVIDER", "kimi")]))
            .unwrap_err();
        assert!(matches!(err, ClearSkinError::Config(_)));
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = AppConfig::from_file(&dir.path().join("nope.toml"));
        assert!(config.is_err());

        let path = dir.path().join("config.toml");
        std::fs::write(&path, "user_id = \"sam\"\n").unwrap();
        let config = AppConfig::from_file(&path).unwrap();
        assert_eq!(config.user_id, "sam");
        assert_eq!(config.provider, Provider::Gemini);
    }
}
