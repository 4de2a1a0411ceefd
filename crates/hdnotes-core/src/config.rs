//! Application configuration management.
//!
//! This module handles loading and saving the application configuration,
//! which includes the API base URL, session lifetime, where the session is
//! persisted, and the last email used to sign in.
//!
//! Configuration is stored at `~/.config/hdnotes/config.json`.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::api::DEFAULT_API_BASE_URL;
use crate::auth::{FileStore, KeyValueStore, KeyringStore, DEFAULT_SESSION_TTL_DAYS};

/// Application name used for config/cache directory paths
const APP_NAME: &str = "hdnotes";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Environment variable that overrides the configured API base URL
pub const API_URL_ENV: &str = "HDNOTES_API_URL";

/// Where the session keys are persisted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// `session.json` in the cache directory
    #[default]
    File,
    /// The OS keychain
    Keyring,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub api_base_url: Option<String>,
    pub last_email: Option<String>,
    pub session_ttl_days: Option<i64>,
    pub storage: StorageBackend,
    pub log_dir: Option<PathBuf>,
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    /// Missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            serde_json::from_str(&contents)
                .with_context(|| format!("Invalid config file {}", path.display()))
        } else {
            Ok(Self::default())
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(())
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    pub fn cache_dir(&self) -> Result<PathBuf> {
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find cache directory"))?;
        Ok(cache_dir.join(APP_NAME))
    }

    /// Base URL in effect: environment, then config file, then the default.
    pub fn resolved_base_url(&self) -> String {
        self.base_url_with(std::env::var(API_URL_ENV).ok())
    }

    fn base_url_with(&self, env_override: Option<String>) -> String {
        env_override
            .filter(|url| !url.trim().is_empty())
            .or_else(|| self.api_base_url.clone())
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string())
    }

    /// Session lifetime granted at login. Non-positive or out-of-range
    /// values fall back to the default.
    pub fn session_ttl(&self) -> chrono::Duration {
        self.session_ttl_days
            .filter(|days| *days > 0)
            .and_then(chrono::Duration::try_days)
            .unwrap_or_else(|| chrono::Duration::days(DEFAULT_SESSION_TTL_DAYS))
    }

    /// Open the configured session storage backend.
    pub fn open_storage(&self) -> Result<Arc<dyn KeyValueStore>> {
        match self.storage {
            StorageBackend::File => {
                let dir = self.cache_dir()?;
                std::fs::create_dir_all(&dir)
                    .with_context(|| format!("Failed to create {}", dir.display()))?;
                Ok(Arc::new(FileStore::in_dir(&dir)))
            }
            StorageBackend::Keyring => {
                let store = KeyringStore::new().context("Failed to open the OS keychain")?;
                Ok(Arc::new(store))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{MemoryStore, SessionStore};
    use crate::models::User;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("config.json")).unwrap();
        assert_eq!(config.storage, StorageBackend::File);
        assert!(config.api_base_url.is_none());
        assert_eq!(config.session_ttl(), chrono::Duration::days(DEFAULT_SESSION_TTL_DAYS));
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let config = Config {
            api_base_url: Some("https://notes.example.com/api".into()),
            last_email: Some("ana@example.com".into()),
            session_ttl_days: Some(30),
            storage: StorageBackend::Keyring,
            log_dir: None,
        };
        config.save_to(&path).unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.contains("\"keyring\""));

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.last_email.as_deref(), Some("ana@example.com"));
        assert_eq!(loaded.storage, StorageBackend::Keyring);
        assert_eq!(loaded.session_ttl(), chrono::Duration::days(30));
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"last_email":"a@b.co"}"#).unwrap();
        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.last_email.as_deref(), Some("a@b.co"));
        assert_eq!(config.storage, StorageBackend::File);
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "not json").unwrap();
        assert!(Config::load_from(&path).is_err());
    }

    #[test]
    fn test_base_url_precedence() {
        let mut config = Config::default();
        assert_eq!(config.base_url_with(None), DEFAULT_API_BASE_URL);

        config.api_base_url = Some("https://config.example.com/api".into());
        assert_eq!(config.base_url_with(None), "https://config.example.com/api");
        assert_eq!(
            config.base_url_with(Some("https://env.example.com/api".into())),
            "https://env.example.com/api"
        );
        assert_eq!(
            config.base_url_with(Some("  ".into())),
            "https://config.example.com/api"
        );
    }

    #[test]
    fn test_non_positive_ttl_uses_default() {
        let config = Config {
            session_ttl_days: Some(0),
            ..Config::default()
        };
        assert_eq!(config.session_ttl(), chrono::Duration::days(DEFAULT_SESSION_TTL_DAYS));
    }

    #[test]
    fn test_huge_ttl_uses_default() {
        let config = Config {
            session_ttl_days: Some(i64::MAX),
            ..Config::default()
        };
        assert_eq!(config.session_ttl(), chrono::Duration::days(DEFAULT_SESSION_TTL_DAYS));

        // In range for a duration, still clamped at login.
        let config = Config {
            session_ttl_days: Some(100_000_000),
            ..Config::default()
        };
        let store = SessionStore::new(Arc::new(MemoryStore::new())).with_default_ttl(config.session_ttl());
        let session = store.login(User::new("u1", "ana", "ana@example.com"), "tok".into());
        assert!(store.is_authenticated());
        assert!(session.expires_at > chrono::Utc::now());
    }
}
