use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::messages::Locale;
use crate::usecase::services::prober::{DEFAULT_COLLABORATOR_TABLE, DEFAULT_PROBE_PAGE_SIZES};

pub const ENV_API_URL: &str = "TABLE_BROWSER_API_URL";
pub const ENV_LOCALE: &str = "TABLE_BROWSER_LOCALE";
const CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub api_base_url: String,
    pub request_timeout_secs: u64,
    pub page_size_options: Vec<u32>,
    pub default_page_size: u32,
    pub search_debounce_ms: u64,
    pub locale: Locale,
    pub log_filter: String,
    /// Columns rendered through the owner map once it is loaded.
    pub owner_columns: Vec<String>,
    pub probe: ProbeConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbeConfig {
    pub collaborator_table: String,
    pub page_sizes: Vec<u32>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://127.0.0.1:8080/api/db".to_string(),
            request_timeout_secs: 30,
            page_size_options: vec![25, 50, 100],
            default_page_size: 25,
            search_debounce_ms: 300,
            locale: Locale::En,
            log_filter: "table_browser=info".to_string(),
            owner_columns: vec![
                "owner_id".to_string(),
                "user_id".to_string(),
                "created_by".to_string(),
            ],
            probe: ProbeConfig::default(),
        }
    }
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            collaborator_table: DEFAULT_COLLABORATOR_TABLE.to_string(),
            page_sizes: DEFAULT_PROBE_PAGE_SIZES.to_vec(),
        }
    }
}

impl AppConfig {
    /// Defaults, then the user's config file, then environment overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = match default_config_path() {
            Some(path) => Self::from_file(&path)?,
            None => AppConfig::default(),
        };
        config.apply_env(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// A missing file is not an error.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(AppConfig::default());
        }
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_API_URL).filter(|url| !url.trim().is_empty()) {
            self.api_base_url = url.trim().to_string();
        }
        if let Some(tag) = lookup(ENV_LOCALE) {
            match Locale::parse(&tag) {
                Some(locale) => self.locale = locale,
                None => tracing::warn!(%tag, "ignoring unknown locale override"),
            }
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api_base_url.trim().is_empty() {
            return Err(ConfigError::Invalid("api_base_url must not be empty".to_string()));
        }
        if self.page_size_options.is_empty() || self.page_size_options.contains(&0) {
            return Err(ConfigError::Invalid(
                "page_size_options must list page sizes greater than zero".to_string(),
            ));
        }
        if !self.page_size_options.contains(&self.default_page_size) {
            return Err(ConfigError::Invalid(format!(
                "default_page_size {} is not one of page_size_options {:?}",
                self.default_page_size, self.page_size_options
            )));
        }
        if self.search_debounce_ms == 0 {
            return Err(ConfigError::Invalid(
                "search_debounce_ms must be greater than zero".to_string(),
            ));
        }
        if self.probe.collaborator_table.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "probe.collaborator_table must not be empty".to_string(),
            ));
        }
        let sizes = &self.probe.page_sizes;
        if sizes.is_empty()
            || sizes.contains(&0)
            || sizes.windows(2).any(|pair| pair[0] <= pair[1])
        {
            return Err(ConfigError::Invalid(format!(
                "probe.page_sizes must be non-empty, non-zero and strictly decreasing: {sizes:?}"
            )));
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }
}

pub fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "tablebrowser", "table-browser")
}

pub fn default_config_path() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.config_dir().join(CONFIG_FILE))
}
