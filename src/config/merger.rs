// Configuration merging with priority

use crate::config::loader::PrdRailsConfig;
use anyhow::{anyhow, Result};

/// Partial overrides; `None` leaves the lower-priority value in place
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PartialConfig {
    pub data_dir: Option<String>,
    pub rule_templates_dir: Option<String>,
    pub prompts_dir: Option<String>,
    pub base_url: Option<String>,
    pub api_key: Option<String>,
    pub model: Option<String>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    pub port: Option<u16>,
    pub bind: Option<String>,
    pub cors_origins: Option<Vec<String>>,
}

impl PartialConfig {
    /// Read overrides from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read overrides through `lookup`, which maps a variable name to its value
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let temperature = get("OPENAI_TEMPERATURE")
            .map(|v| {
                v.trim()
                    .parse::<f32>()
                    .map_err(|e| anyhow!("Invalid OPENAI_TEMPERATURE '{}': {}", v, e))
            })
            .transpose()?;
        let max_tokens = get("OPENAI_MAX_TOKENS")
            .map(|v| {
                v.trim()
                    .parse::<u32>()
                    .map_err(|e| anyhow!("Invalid OPENAI_MAX_TOKENS '{}': {}", v, e))
            })
            .transpose()?;

        Ok(Self {
            data_dir: get("PRD_RAILS_DATA_DIR"),
            rule_templates_dir: get("PRD_RAILS_RULE_TEMPLATES_DIR"),
            prompts_dir: get("PRD_RAILS_PROMPTS_DIR"),
            base_url: get("OPENAI_BASE_URL"),
            api_key: get("OPENAI_API_KEY"),
            model: get("OPENAI_MODEL"),
            temperature,
            max_tokens,
            ..Self::default()
        })
    }
}

/// Configuration merger
/// Priority order: CLI -> Environment -> File -> Defaults
pub struct ConfigMerger {
    defaults: PrdRailsConfig,
    file: Option<PrdRailsConfig>,
    env: Option<PartialConfig>,
    cli: Option<PartialConfig>,
}

impl ConfigMerger {
    pub fn new() -> Self {
        Self {
            defaults: PrdRailsConfig::default(),
            file: None,
            env: None,
            cli: None,
        }
    }

    pub fn with_file(mut self, config: Option<PrdRailsConfig>) -> Self {
        self.file = config;
        self
    }

    pub fn with_env(mut self, config: Option<PartialConfig>) -> Self {
        self.env = config;
        self
    }

    pub fn with_cli(mut self, config: Option<PartialConfig>) -> Self {
        self.cli = config;
        self
    }

    /// Merge all layers with priority
    pub fn merge(&self) -> PrdRailsConfig {
        let mut result = self.file.clone().unwrap_or_else(|| self.defaults.clone());

        if let Some(ref env) = self.env {
            apply_partial(&mut result, env);
        }

        if let Some(ref cli) = self.cli {
            apply_partial(&mut result, cli);
        }

        result
    }
}

impl Default for ConfigMerger {
    fn default() -> Self {
        Self::new()
    }
}

fn apply_partial(config: &mut PrdRailsConfig, partial: &PartialConfig) {
    if let Some(ref v) = partial.data_dir {
        config.storage.data_dir = Some(v.clone());
    }
    if let Some(ref v) = partial.rule_templates_dir {
        config.storage.rule_templates_dir = v.clone();
    }
    if let Some(ref v) = partial.prompts_dir {
        config.storage.prompts_dir = Some(v.clone());
    }
    if let Some(ref v) = partial.base_url {
        config.llm.base_url = v.clone();
    }
    if let Some(ref v) = partial.api_key {
        config.llm.api_key = Some(v.clone());
    }
    if let Some(ref v) = partial.model {
        config.llm.model = v.clone();
    }
    if let Some(v) = partial.temperature {
        config.llm.temperature = v;
    }
    if let Some(v) = partial.max_tokens {
        config.llm.max_tokens = v;
    }
    if let Some(v) = partial.port {
        config.server.port = v;
    }
    if let Some(ref v) = partial.bind {
        config.server.bind = v.clone();
    }
    if let Some(ref v) = partial.cors_origins {
        config.server.cors_origins = v.clone();
    }
}
