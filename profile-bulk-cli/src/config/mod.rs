//! Runtime configuration
//!
//! Loaded from `<config_dir>/profile-bulk/config.toml` (or `--config`), with a
//! small set of environment overrides applied on top. Every section has
//! defaults so an empty file is a valid configuration.

pub mod repository;

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::bulk::types::SchemaChoice;

pub const ENV_DATABASE_URL: &str = "PROFILE_BULK_DATABASE_URL";
pub const ENV_DIRECTORY_URL: &str = "PROFILE_BULK_DIRECTORY_URL";
pub const ENV_PROFILE_URL: &str = "PROFILE_BULK_PROFILE_URL";
pub const ENV_CACHE_TTL_SECS: &str = "PROFILE_BULK_CACHE_TTL_SECS";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub database: DatabaseConfig,
    pub directory: DirectoryConfig,
    pub profile: ProfileConfig,
    pub storage: StorageConfig,
    pub cache: CacheConfig,
    pub validation: ValidationConfig,
    pub batch: BatchConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub url: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        let path = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("profile-bulk")
            .join("profile-bulk.db");
        Self {
            url: format!("sqlite://{}?mode=rwc", path.display()),
        }
    }
}

/// User directory search service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DirectoryConfig {
    pub base_url: String,
    pub search_endpoint: String,
    pub timeout_secs: u64,
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:9000".to_string(),
            search_endpoint: "/private/user/v1/search".to_string(),
            timeout_secs: 30,
        }
    }
}

/// Profile update service invoked when a workflow request is settled
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileConfig {
    pub base_url: String,
    pub update_endpoint: String,
    pub timeout_secs: u64,
}

impl Default for ProfileConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:7001".to_string(),
            update_endpoint: "/private/user/v1/profile/update".to_string(),
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Uploaded source files
    pub inbox_dir: PathBuf,
    /// Local copies while a batch runs
    pub work_dir: PathBuf,
    /// Result files, under `result_folder`
    pub outbox_dir: PathBuf,
    pub result_folder: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            inbox_dir: PathBuf::from("bulk/inbox"),
            work_dir: PathBuf::from("bulk/work"),
            outbox_dir: PathBuf::from("bulk/outbox"),
            result_folder: "user-bulk-update".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { ttl_secs: 84_600 }
    }
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

/// Allow-lists for the statically validated fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    pub gender_values: Vec<String>,
    pub category_values: Vec<String>,
    pub group_values: Vec<String>,
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            gender_values: strings(&["Male", "Female", "Others"]),
            category_values: strings(&["General", "OBC", "SC", "ST", "Others"]),
            group_values: strings(&[
                "Group A", "Group B", "Group C", "Group D", "Others",
            ]),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Row layout when the trigger message does not name one
    pub row_schema: SchemaChoice,
    /// Persist counters after every row instead of only at start and end
    pub persist_progress_per_row: bool,
}

impl Config {
    /// `<config_dir>/profile-bulk/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("profile-bulk").join("config.toml"))
    }

    pub fn from_toml_str(content: &str) -> Result<Config> {
        toml::from_str(content).context("Failed to parse configuration")
    }

    /// Load configuration and apply environment overrides.
    ///
    /// An explicit path must exist; a missing default file means defaults.
    pub fn load(path: Option<&Path>) -> Result<Config> {
        let mut config = match path {
            Some(path) => {
                let content = std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read config file: {}", path.display()))?;
                Self::from_toml_str(&content)
                    .with_context(|| format!("Invalid config file: {}", path.display()))?
            }
            None => match Self::default_path().filter(|p| p.exists()) {
                Some(path) => {
                    log::debug!("Loading configuration from {}", path.display());
                    let content = std::fs::read_to_string(&path).with_context(|| {
                        format!("Failed to read config file: {}", path.display())
                    })?;
                    Self::from_toml_str(&content)?
                }
                None => Config::default(),
            },
        };

        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Apply `PROFILE_BULK_*` overrides from `lookup`
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_DATABASE_URL) {
            self.database.url = url;
        }
        if let Some(url) = lookup(ENV_DIRECTORY_URL) {
            self.directory.base_url = url;
        }
        if let Some(url) = lookup(ENV_PROFILE_URL) {
            self.profile.base_url = url;
        }
        if let Some(ttl) = lookup(ENV_CACHE_TTL_SECS) {
            self.cache.ttl_secs = ttl
                .trim()
                .parse()
                .with_context(|| format!("{} must be a number of seconds, got '{}'", ENV_CACHE_TTL_SECS, ttl))?;
        }
        Ok(())
    }
}
