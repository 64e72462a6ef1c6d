// Backend command for checking language model connectivity

use super::ServiceContext;
use crate::config::Sampling;
use crate::error::AppResult;
use serde::Serialize;

const TEST_PROMPT: &str = "Say 'Hello, PRD Rails is working!' in one sentence.";
const TEST_MAX_TOKENS: u32 = 100;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LlmTestResult {
    pub success: bool,
    pub model: String,
    pub message: String,
}

/// Send one small prompt to the configured model
pub async fn test_llm_connection(ctx: &ServiceContext) -> AppResult<LlmTestResult> {
    log::info!("Testing connection to model {}", ctx.llm_config.model);

    let request = ctx.request(
        "You are a helpful assistant.".to_string(),
        TEST_PROMPT.to_string(),
        Sampling::new(ctx.llm_config.temperature, TEST_MAX_TOKENS),
    );
    let message = ctx.llm.complete(request).await?;

    Ok(LlmTestResult {
        success: true,
        model: ctx.llm_config.model.clone(),
        message,
    })
}
