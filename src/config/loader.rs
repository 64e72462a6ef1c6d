// Configuration file loading

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::llm::RetryPolicy;

/// PRD Rails configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct PrdRailsConfig {
    /// Storage locations
    #[serde(default)]
    pub storage: StorageConfig,
    /// Language model settings
    #[serde(default)]
    pub llm: LlmConfig,
    /// HTTP server settings
    #[serde(default)]
    pub server: ServerConfig,
}

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StorageConfig {
    /// Root of the project store (defaults to ~/.prd-rails)
    #[serde(rename = "dataDir", alias = "data_dir", default)]
    pub data_dir: Option<String>,
    /// Directory holding the static rule templates used by exports
    #[serde(rename = "ruleTemplatesDir", alias = "rule_templates_dir", default = "default_rule_templates_dir")]
    pub rule_templates_dir: String,
    /// Directory with `{name}.tera` prompt overrides
    #[serde(rename = "promptsDir", alias = "prompts_dir", default)]
    pub prompts_dir: Option<String>,
}

fn default_rule_templates_dir() -> String { "rule_templates".to_string() }

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            rule_templates_dir: default_rule_templates_dir(),
            prompts_dir: None,
        }
    }
}

impl StorageConfig {
    pub fn data_dir_path(&self) -> PathBuf {
        self.data_dir
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(crate::file_storage::get_default_data_dir)
    }
}

/// Sampling parameters for one kind of model call
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Sampling {
    pub temperature: f32,
    #[serde(rename = "maxTokens", alias = "max_tokens")]
    pub max_tokens: u32,
}

impl Sampling {
    pub const fn new(temperature: f32, max_tokens: u32) -> Self {
        Self { temperature, max_tokens }
    }
}

fn default_questions_sampling() -> Sampling { Sampling::new(0.7, 2000) }
fn default_refinement_sampling() -> Sampling { Sampling::new(0.3, 4000) }
fn default_docs_sampling() -> Sampling { Sampling::new(0.7, 4000) }

/// Language model configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LlmConfig {
    /// OpenAI-compatible API base URL
    #[serde(rename = "baseUrl", alias = "base_url", default = "default_base_url")]
    pub base_url: String,
    /// API key (usually supplied through OPENAI_API_KEY)
    #[serde(rename = "apiKey", alias = "api_key", default, skip_serializing)]
    pub api_key: Option<String>,
    /// Model name
    #[serde(default = "default_model")]
    pub model: String,
    /// Temperature for ad-hoc calls such as the connectivity check
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Token limit for ad-hoc calls
    #[serde(rename = "maxTokens", alias = "max_tokens", default = "default_max_tokens")]
    pub max_tokens: u32,
    /// Per-request timeout
    #[serde(rename = "timeoutSecs", alias = "timeout_secs", default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Retries after the first attempt for transient failures
    #[serde(rename = "maxRetries", alias = "max_retries", default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(rename = "baseBackoffMs", alias = "base_backoff_ms", default = "default_backoff")]
    pub base_backoff_ms: u64,
    #[serde(rename = "maxBackoffMs", alias = "max_backoff_ms", default = "default_max_backoff")]
    pub max_backoff_ms: u64,
    /// Refinement question generation
    #[serde(default = "default_questions_sampling")]
    pub questions: Sampling,
    /// Refined PRD synthesis
    #[serde(default = "default_refinement_sampling")]
    pub refinement: Sampling,
    /// Target documentation generation
    #[serde(default = "default_docs_sampling")]
    pub docs: Sampling,
}

fn default_base_url() -> String { "https://api.openai.com/v1".to_string() }
fn default_model() -> String { "gpt-4o".to_string() }
fn default_temperature() -> f32 { 0.7 }
fn default_max_tokens() -> u32 { 2000 }
fn default_timeout_secs() -> u64 { 120 }
fn default_max_retries() -> u32 { 2 }
fn default_backoff() -> u64 { 1000 }
fn default_max_backoff() -> u64 { 8000 }

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: None,
            model: default_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
            base_backoff_ms: default_backoff(),
            max_backoff_ms: default_max_backoff(),
            questions: default_questions_sampling(),
            refinement: default_refinement_sampling(),
            docs: default_docs_sampling(),
        }
    }
}

impl LlmConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.max_retries,
            base_backoff: Duration::from_millis(self.base_backoff_ms),
            max_backoff: Duration::from_millis(self.max_backoff_ms),
        }
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Allowed CORS origins (empty allows any)
    #[serde(rename = "corsOrigins", alias = "cors_origins", default)]
    pub cors_origins: Vec<String>,
}

fn default_port() -> u16 { 3420 }
fn default_bind() -> String { "127.0.0.1".to_string() }

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            bind: default_bind(),
            cors_origins: Vec::new(),
        }
    }
}

/// Loads configuration from the global config file or an explicit path
pub struct ConfigLoader {
    global_path: Option<PathBuf>,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self {
            global_path: Self::get_global_config_path(),
        }
    }

    /// Use an explicit config file instead of the global one
    pub fn with_path(path: &Path) -> Self {
        Self {
            global_path: Some(path.to_path_buf()),
        }
    }

    fn get_global_config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|p| p.join(".prd-rails").join("config.toml"))
    }

    pub fn config_path(&self) -> Option<&Path> {
        self.global_path.as_deref()
    }

    /// Load the config file, `None` if there is none
    pub fn load(&self) -> Result<Option<PrdRailsConfig>> {
        match self.global_path {
            Some(ref path) => self.load_from_path(path),
            None => Ok(None),
        }
    }

    pub fn load_from_path(&self, path: &Path) -> Result<Option<PrdRailsConfig>> {
        if !path.exists() {
            return Ok(None);
        }

        let contents = fs::read_to_string(path)
            .map_err(|e| anyhow!("Failed to read config file '{}': {}", path.display(), e))?;

        let config: PrdRailsConfig = toml::from_str(&contents)
            .map_err(|e| anyhow!("Failed to parse config file '{}': {}", path.display(), e))?;

        validate_config(&config)?;

        Ok(Some(config))
    }

    pub fn save_to_path(&self, path: &Path, config: &PrdRailsConfig) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent)
                    .map_err(|e| anyhow!("Failed to create config directory: {}", e))?;
            }
        }

        let contents = toml::to_string_pretty(config)
            .map_err(|e| anyhow!("Failed to serialize config: {}", e))?;

        fs::write(path, contents)
            .map_err(|e| anyhow!("Failed to write config file '{}': {}", path.display(), e))?;

        Ok(())
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

/// Reject settings the service cannot run with
pub fn validate_config(config: &PrdRailsConfig) -> Result<()> {
    let llm = &config.llm;
    if llm.model.trim().is_empty() {
        return Err(anyhow!("llm.model must not be empty"));
    }
    if llm.timeout_secs == 0 {
        return Err(anyhow!("llm.timeoutSecs must be greater than 0"));
    }
    if llm.base_backoff_ms > llm.max_backoff_ms {
        return Err(anyhow!("llm.baseBackoffMs cannot exceed llm.maxBackoffMs"));
    }
    for (name, sampling) in [
        ("temperature", Sampling::new(llm.temperature, llm.max_tokens)),
        ("questions", llm.questions),
        ("refinement", llm.refinement),
        ("docs", llm.docs),
    ] {
        if !(0.0..=2.0).contains(&sampling.temperature) {
            return Err(anyhow!("llm.{}: temperature must be between 0 and 2", name));
        }
        if sampling.max_tokens == 0 {
            return Err(anyhow!("llm.{}: maxTokens must be greater than 0", name));
        }
    }
    Ok(())
}
