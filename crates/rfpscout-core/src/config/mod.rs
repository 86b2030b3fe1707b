//! Configuration management
//!
//! Credentials and defaults resolve in three layers: caller overrides,
//! then the YAML config file, then environment variables.

use crate::error::{Result, RfpScoutError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default search index holding the scraped solicitations
pub const DEFAULT_INDEX_NAME: &str = "solicitations";

/// Default Gemini model
pub const DEFAULT_MODEL: &str = "gemini-flash-latest";

/// Default Gemini REST endpoint
pub const DEFAULT_LLM_URL: &str = "https://generativelanguage.googleapis.com";

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Hosted search index configuration
    #[serde(default)]
    pub search: SearchServiceConfig,

    /// LLM service configuration
    #[serde(default)]
    pub llm: LLMServiceConfig,
}

/// Search service (Algolia) configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchServiceConfig {
    /// Application identifier
    #[serde(default = "default_app_id")]
    pub app_id: Option<String>,

    /// Search-only API key
    #[serde(default = "default_search_api_key")]
    pub api_key: Option<String>,

    /// Index to query
    #[serde(default = "default_index_name")]
    pub index_name: String,

    /// Host override (defaults to the application's DSN host)
    #[serde(default)]
    pub host: Option<String>,

    /// Request timeout in seconds
    #[serde(default = "default_search_timeout")]
    pub timeout_secs: u64,
}

impl SearchServiceConfig {
    /// Base URL for search requests
    pub fn base_url(&self) -> String {
        match (&self.host, &self.app_id) {
            (Some(host), _) => host.trim_end_matches('/').to_string(),
            (None, Some(app_id)) => format!("https://{}-dsn.algolia.net", app_id.to_lowercase()),
            (None, None) => String::new(),
        }
    }
}

impl Default for SearchServiceConfig {
    fn default() -> Self {
        Self {
            app_id: default_app_id(),
            api_key: default_search_api_key(),
            index_name: default_index_name(),
            host: None,
            timeout_secs: default_search_timeout(),
        }
    }
}

/// LLM service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LLMServiceConfig {
    /// Base URL of the generative language API
    #[serde(default = "default_llm_url")]
    pub url: String,

    /// Model identifier
    #[serde(default = "default_model")]
    pub model: String,

    /// API key
    #[serde(default = "default_llm_api_key")]
    pub api_key: Option<String>,

    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Maximum tokens per model turn
    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,

    /// Request timeout in seconds
    #[serde(default = "default_llm_timeout")]
    pub timeout_secs: u64,
}

impl Default for LLMServiceConfig {
    fn default() -> Self {
        Self {
            url: default_llm_url(),
            model: default_model(),
            api_key: default_llm_api_key(),
            temperature: default_temperature(),
            max_output_tokens: default_max_output_tokens(),
            timeout_secs: default_llm_timeout(),
        }
    }
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn default_app_id() -> Option<String> {
    env_var("ALGOLIA_APP_ID")
}

fn default_search_api_key() -> Option<String> {
    env_var("ALGOLIA_SEARCH_API_KEY")
}

fn default_index_name() -> String {
    env_var("ALGOLIA_INDEX_NAME").unwrap_or_else(|| DEFAULT_INDEX_NAME.to_string())
}

fn default_search_timeout() -> u64 {
    30
}

fn default_llm_url() -> String {
    env_var("GEMINI_API_URL").unwrap_or_else(|| DEFAULT_LLM_URL.to_string())
}

fn default_model() -> String {
    env_var("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string())
}

fn default_llm_api_key() -> Option<String> {
    env_var("GEMINI_API_KEY")
}

fn default_temperature() -> f32 {
    0.7
}

fn default_max_output_tokens() -> u32 {
    2048
}

fn default_llm_timeout() -> u64 {
    60
}

/// Caller-supplied values that take precedence over file and environment
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub algolia_app_id: Option<String>,
    pub algolia_search_api_key: Option<String>,
    pub algolia_index: Option<String>,
    pub gemini_api_key: Option<String>,
    pub model: Option<String>,
}

impl Config {
    /// Load config from default path
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::default_path())
    }

    /// Load config from a YAML file, falling back to the environment when it does not exist
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            Self::from_yaml_str(&content)
        } else {
            Ok(Config::default())
        }
    }

    /// Parse config from YAML text
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Config::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }

    /// Load, apply overrides and validate
    pub fn resolve(overrides: ConfigOverrides) -> Result<Self> {
        let mut config = Self::load()?;
        config.apply(overrides);
        config.validate()?;
        Ok(config)
    }

    /// Get default config path
    pub fn default_path() -> PathBuf {
        if let Some(path) = env_var("RFPSCOUT_CONFIG") {
            return PathBuf::from(path);
        }
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(crate::CONFIG_DIR_NAME)
            .join("config.yml")
    }

    /// Apply caller overrides on top of the loaded values
    pub fn apply(&mut self, overrides: ConfigOverrides) {
        if let Some(app_id) = overrides.algolia_app_id {
            self.search.app_id = Some(app_id);
        }
        if let Some(api_key) = overrides.algolia_search_api_key {
            self.search.api_key = Some(api_key);
        }
        if let Some(index) = overrides.algolia_index {
            self.search.index_name = index;
        }
        if let Some(api_key) = overrides.gemini_api_key {
            self.llm.api_key = Some(api_key);
        }
        if let Some(model) = overrides.model {
            self.llm.model = model;
        }
    }

    /// Fail fast on missing credentials
    pub fn validate(&self) -> Result<()> {
        let present = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.trim().is_empty());

        if !present(&self.search.app_id) || !present(&self.search.api_key) {
            return Err(RfpScoutError::Config(
                "Missing Algolia configuration".to_string(),
            ));
        }
        if !present(&self.llm.api_key) {
            return Err(RfpScoutError::Config("Missing Gemini API key".to_string()));
        }
        if self.search.index_name.trim().is_empty() {
            return Err(RfpScoutError::Config("Index name cannot be empty".to_string()));
        }
        Ok(())
    }
}
