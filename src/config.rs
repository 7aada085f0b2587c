//! Configuration management
//!
//! Settings come from an optional JSON file, then environment variables
//! (a `.env` file is honored) override individual fields.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::client::{ClientConfig, API_BASE_URL};

pub const ENV_API_URL: &str = "STRATEGY_API_URL";
pub const ENV_TOKEN_DB: &str = "STRATEGY_TOKEN_DB";

/// CLI settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Strategy service base URL
    pub api_base_url: String,
    /// SQLite file holding the session token
    pub token_db: PathBuf,
    pub request_timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base_url: API_BASE_URL.to_string(),
            token_db: PathBuf::from(".strategy-builder").join("session.db"),
            request_timeout_secs: 30,
        }
    }
}

impl Settings {
    /// Load settings from JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file {}", path.display()))?;
        let settings: Settings =
            serde_json::from_str(&contents).context("Failed to parse settings JSON")?;
        Ok(settings)
    }

    /// File (if given) plus environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self> {
        dotenv::dotenv().ok();

        let mut settings = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        settings.apply_env(|key| std::env::var(key).ok());
        Ok(settings)
    }

    fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(url) = var(ENV_API_URL) {
            self.api_base_url = url;
        }
        if let Some(db) = var(ENV_TOKEN_DB) {
            self.token_db = PathBuf::from(db);
        }
    }

    pub fn client_config(&self) -> ClientConfig {
        ClientConfig::default()
            .with_base_url(self.api_base_url.clone())
            .with_timeout(Duration::from_secs(self.request_timeout_secs))
    }
}
