//! Host-supplied configuration.
//!
//! A TOML file is optional; every key has a default and environment variables
//! override whatever the file says.
//!
//! ```toml
//! api_base_url = "https://restcountries.com/v3.1"
//! theme_file = "/data/user/0/app/files/preferences.json"
//! log_filter = "countries_core=debug"
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::client::{CountriesClient, DEFAULT_BASE_URL};
use crate::error::ConfigError;
use crate::storage::JsonFileStore;

pub const ENV_API_URL: &str = "COUNTRIES_API_URL";
pub const ENV_LOG: &str = "COUNTRIES_LOG";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    pub api_base_url: String,
    /// Preferences file for the theme store. `None` keeps the theme in memory.
    pub theme_file: Option<PathBuf>,
    /// `tracing-subscriber` `EnvFilter` directive.
    pub log_filter: String,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_BASE_URL.to_string(),
            theme_file: None,
            log_filter: "info".to_string(),
        }
    }
}

impl CoreConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Load `path`; a missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Apply `COUNTRIES_API_URL` and `COUNTRIES_LOG` from the process
    /// environment.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(url) = lookup(ENV_API_URL).filter(|v| !v.trim().is_empty()) {
            self.api_base_url = url;
        }
        if let Some(filter) = lookup(ENV_LOG).filter(|v| !v.trim().is_empty()) {
            self.log_filter = filter;
        }
        self
    }

    pub fn client(&self) -> CountriesClient {
        CountriesClient::new(&self.api_base_url)
    }

    pub fn theme_storage(&self) -> Option<JsonFileStore> {
        self.theme_file.as_ref().map(JsonFileStore::new)
    }
}
