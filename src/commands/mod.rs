// Backend command handlers
//
// Commands are stateless: each takes the shared `ServiceContext` plus a
// project id and returns the updated record.

pub mod docs;
pub mod export;
pub mod llm;
pub mod projects;
pub mod refinements;

pub use docs::*;
pub use export::*;
pub use llm::*;
pub use projects::*;
pub use refinements::*;

use crate::config::{LlmConfig, PrdRailsConfig, Sampling};
use crate::error::AppResult;
use crate::file_storage::ArtifactStore;
use crate::llm::{CompletionRequest, LanguageModel, OpenAiClient};
use crate::templates::PromptLibrary;
use std::path::PathBuf;
use std::sync::Arc;

/// Collaborators shared by every command
pub struct ServiceContext {
    pub store: ArtifactStore,
    pub llm: Arc<dyn LanguageModel>,
    pub prompts: PromptLibrary,
    pub llm_config: LlmConfig,
    /// Directory holding the static rule templates packed into exports
    pub rule_templates_dir: PathBuf,
}

impl ServiceContext {
    pub fn new(
        store: ArtifactStore,
        llm: Arc<dyn LanguageModel>,
        prompts: PromptLibrary,
        llm_config: LlmConfig,
        rule_templates_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            store,
            llm,
            prompts,
            llm_config,
            rule_templates_dir: rule_templates_dir.into(),
        }
    }

    /// Build the production context: file store, OpenAI-compatible client
    pub fn from_config(config: &PrdRailsConfig) -> AppResult<Self> {
        let store = ArtifactStore::new(config.storage.data_dir_path());
        store.init()?;

        let client = OpenAiClient::new(
            &config.llm.base_url,
            config.llm.api_key.clone(),
            config.llm.timeout(),
            config.llm.retry_policy(),
        )?;
        if !client.has_api_key() {
            log::warn!("OPENAI_API_KEY is not set; model-backed operations will fail");
        }

        let prompts = PromptLibrary::new(config.storage.prompts_dir.as_ref().map(PathBuf::from));

        Ok(Self::new(
            store,
            Arc::new(client),
            prompts,
            config.llm.clone(),
            &config.storage.rule_templates_dir,
        ))
    }

    /// Completion request for the configured model
    pub(crate) fn request(
        &self,
        system_prompt: String,
        user_prompt: String,
        sampling: Sampling,
    ) -> CompletionRequest {
        CompletionRequest {
            model: self.llm_config.model.clone(),
            system_prompt,
            user_prompt,
            temperature: sampling.temperature,
            max_output_tokens: sampling.max_tokens,
        }
    }
}
