//! Application configuration management.
//!
//! This module handles loading and saving the shell configuration: backend
//! address, admin policy, which durable storage backs the session, and the
//! last used username.
//!
//! Configuration is stored at `~/.config/salon-shell/config.json` and can be
//! overridden with `SALON_API_URL`, `SALON_PRIVILEGED_USERNAME` and
//! `SALON_STORAGE`.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::api::DEFAULT_BASE_URL;
use crate::auth::{AdminPolicy, PrivilegedUsername, RoleClaim};
use crate::storage::{FileStore, KeyValueStore, KeyringStore, MemoryStore};

/// Application name used for config/cache directory paths
pub const APP_NAME: &str = "salon-shell";

/// Config file name
const CONFIG_FILE: &str = "config.json";

pub const ENV_API_URL: &str = "SALON_API_URL";
pub const ENV_PRIVILEGED_USERNAME: &str = "SALON_PRIVILEGED_USERNAME";
pub const ENV_STORAGE: &str = "SALON_STORAGE";

/// Where the session mirror is kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    File,
    Keyring,
    Memory,
}

impl FromStr for StorageBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "file" => Ok(StorageBackend::File),
            "keyring" => Ok(StorageBackend::Keyring),
            "memory" => Ok(StorageBackend::Memory),
            other => Err(anyhow::anyhow!(
                "Unknown storage backend '{}' (expected file, keyring or memory)",
                other
            )),
        }
    }
}

impl fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            StorageBackend::File => "file",
            StorageBackend::Keyring => "keyring",
            StorageBackend::Memory => "memory",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_base_url: String,
    /// Username that gets the admin flag. When unset, the role claim from the
    /// login response decides.
    pub privileged_username: Option<String>,
    pub storage: StorageBackend,
    pub last_username: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_BASE_URL.to_string(),
            privileged_username: None,
            storage: StorageBackend::default(),
            last_username: None,
        }
    }
}

impl Config {
    /// Load from the default location, falling back to defaults when the file
    /// is missing.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse config file {}", path.display()))
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    pub fn cache_dir(&self) -> Result<PathBuf> {
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find cache directory"))?;
        Ok(cache_dir.join(APP_NAME))
    }

    /// Apply environment overrides from the process environment.
    pub fn apply_env(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides from `lookup`. Empty values are ignored; an unknown
    /// storage backend is logged and ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(url) = lookup(ENV_API_URL) {
            self.api_base_url = url;
        }
        if let Some(username) = lookup(ENV_PRIVILEGED_USERNAME) {
            self.privileged_username = Some(username);
        }
        if let Some(raw) = lookup(ENV_STORAGE) {
            match raw.parse() {
                Ok(backend) => self.storage = backend,
                Err(e) => warn!(error = %e, "Ignoring {}", ENV_STORAGE),
            }
        }
    }

    /// Build the admin policy this configuration asks for.
    pub fn admin_policy(&self) -> Box<dyn AdminPolicy> {
        match self.privileged_username {
            Some(ref username) => Box::new(PrivilegedUsername::new(username.clone())),
            None => Box::new(RoleClaim),
        }
    }

    /// Open the configured storage backend.
    ///
    /// If the backend cannot be opened the session still works, just without
    /// persistence, so this falls back to an in-memory store.
    pub fn open_storage(&self, cache_dir: &Path) -> Box<dyn KeyValueStore> {
        match self.storage {
            StorageBackend::File => match FileStore::in_dir(cache_dir) {
                Ok(store) => {
                    debug!(path = %store.path().display(), "Using file storage");
                    Box::new(store)
                }
                Err(e) => {
                    warn!(error = %e, "Failed to open storage file, session will not persist");
                    Box::new(MemoryStore::new())
                }
            },
            StorageBackend::Keyring => Box::new(KeyringStore::new(APP_NAME)),
            StorageBackend::Memory => Box::new(MemoryStore::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    use crate::auth::UserData;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.api_base_url, "http://localhost:8000");
        assert_eq!(config.privileged_username, None);
        assert_eq!(config.storage, StorageBackend::File);
    }

    #[test]
    fn test_load_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("config.json")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let config = Config {
            api_base_url: "https://salon.example".to_string(),
            privileged_username: Some("danil".to_string()),
            storage: StorageBackend::Keyring,
            last_username: Some("alice".to_string()),
        };
        config.save_to(&path).unwrap();
        assert_eq!(Config::load_from(&path).unwrap(), config);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"storage": "memory"}"#).unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.storage, StorageBackend::Memory);
        assert_eq!(config.api_base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn test_broken_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "not json").unwrap();
        assert!(Config::load_from(&path).is_err());
    }

    #[test]
    fn test_overrides() {
        let env: HashMap<&str, &str> = [
            (ENV_API_URL, "http://10.0.0.5:8000"),
            (ENV_PRIVILEGED_USERNAME, "danil"),
            (ENV_STORAGE, "Keyring"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config.apply_overrides(|key| env.get(key).map(|v| v.to_string()));
        assert_eq!(config.api_base_url, "http://10.0.0.5:8000");
        assert_eq!(config.privileged_username.as_deref(), Some("danil"));
        assert_eq!(config.storage, StorageBackend::Keyring);
    }

    #[test]
    fn test_overrides_ignore_empty_and_invalid() {
        let mut config = Config::default();
        config.apply_overrides(|key| match key {
            ENV_API_URL => Some("  ".to_string()),
            ENV_STORAGE => Some("floppy".to_string()),
            _ => None,
        });
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_storage_backend_parse_and_display() {
        for backend in [StorageBackend::File, StorageBackend::Keyring, StorageBackend::Memory] {
            assert_eq!(backend.to_string().parse::<StorageBackend>().unwrap(), backend);
        }
        assert!("tape".parse::<StorageBackend>().is_err());
    }

    #[test]
    fn test_admin_policy_selection() {
        let danil = UserData::new(1, "danil", "t");
        let claimed = UserData::new(2, "kate", "t").with_admin_claim(true);

        let by_name = Config {
            privileged_username: Some("danil".to_string()),
            ..Config::default()
        };
        assert!(by_name.admin_policy().is_admin(&danil));
        assert!(!by_name.admin_policy().is_admin(&claimed));

        let by_claim = Config::default();
        assert!(!by_claim.admin_policy().is_admin(&danil));
        assert!(by_claim.admin_policy().is_admin(&claimed));
    }

    #[test]
    fn test_open_file_storage() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::default();
        {
            let mut store = config.open_storage(dir.path());
            store.set("token", "abc").unwrap();
        }
        let store = config.open_storage(dir.path());
        assert_eq!(store.get("token").unwrap().as_deref(), Some("abc"));
    }

    #[test]
    fn test_open_memory_storage_does_not_persist() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            storage: StorageBackend::Memory,
            ..Config::default()
        };
        {
            let mut store = config.open_storage(dir.path());
            store.set("token", "abc").unwrap();
        }
        let store = config.open_storage(dir.path());
        assert_eq!(store.get("token").unwrap(), None);
    }
}
