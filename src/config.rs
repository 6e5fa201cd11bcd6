use anyhow::{anyhow, Context, Result};
use chatbot_core::ai::gemini::{DEFAULT_BASE_URL, DEFAULT_MODEL};
use chatbot_core::RetryPolicy;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Config {
    pub api_key: Option<String>,
    pub model: Option<String>,
    pub base_url: Option<String>,
    pub max_attempts: Option<u32>,
    pub base_delay_ms: Option<u64>,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load() -> Result<Self> {
        Self::load_from(&Self::get_config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::new());
        }

        let config_content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Config = serde_json::from_str(&config_content)
            .with_context(|| format!("Invalid config file {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::get_config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Create config directory if it doesn't exist
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let config_content = serde_json::to_string_pretty(self)?;
        fs::write(path, config_content)?;
        Ok(())
    }

    /// Store a new API key, keeping everything else in the file.
    pub fn save_api_key(api_key: &str) -> Result<()> {
        Self::save_api_key_to(&Self::get_config_path()?, api_key)
    }

    /// Fails without touching the file when the existing config can't be read.
    pub fn save_api_key_to(path: &Path, api_key: &str) -> Result<()> {
        let mut config = Self::load_from(path)?;
        config.api_key = Some(api_key.trim().to_string());
        config.save_to(path)
    }

    fn validate(&self) -> Result<()> {
        if let Some(url) = self.base_url.as_deref() {
            reqwest::Url::parse(url).with_context(|| format!("Invalid base_url: {}", url))?;
        }
        Ok(())
    }

    /// `GEMINI_API_KEY` wins over the stored key; blank values count as unset.
    pub fn resolve_api_key(&self) -> Option<String> {
        let from_env = std::env::var(API_KEY_ENV).ok();
        pick_api_key(from_env, self.api_key.clone())
    }

    pub fn model(&self) -> &str {
        self.model.as_deref().unwrap_or(DEFAULT_MODEL)
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        let defaults = RetryPolicy::default();
        RetryPolicy::new(
            self.max_attempts.unwrap_or(defaults.max_attempts()),
            self.base_delay_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.base_delay()),
        )
    }

    fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow!("Could not determine config directory"))?;

        Ok(config_dir.join("gemini-chat").join("config.json"))
    }
}

fn pick_api_key(from_env: Option<String>, from_config: Option<String>) -> Option<String> {
    [from_env, from_config]
        .into_iter()
        .flatten()
        .map(|key| key.trim().to_string())
        .find(|key| !key.is_empty())
}
