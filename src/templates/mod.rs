// Prompt and document templates

pub mod builtin;
pub mod engine;
pub mod resolver;

pub use engine::TemplateEngine;
pub use resolver::{ResolvedTemplate, TemplateResolver, TemplateSource};

use crate::error::AppResult;
use crate::models::InitialAnswers;
use serde::Serialize;
use std::path::PathBuf;
use tera::Context;

const NOT_SPECIFIED: &str = "Not specified";
const TO_BE_DEFINED: &str = "To be defined";

/// Resolver plus engine: everything needed to turn a template name into text
pub struct PromptLibrary {
    resolver: TemplateResolver,
    engine: TemplateEngine,
}

impl PromptLibrary {
    pub fn new(override_dir: Option<PathBuf>) -> Self {
        let resolver = match override_dir {
            Some(dir) => TemplateResolver::new().with_override_dir(dir),
            None => TemplateResolver::new(),
        };
        Self {
            resolver,
            engine: TemplateEngine::new(),
        }
    }

    /// Render a named template with a serializable context
    pub fn render<T: Serialize>(&self, name: &str, data: &T) -> AppResult<String> {
        let template = self.resolver.resolve(name)?;
        let context = Context::from_serialize(data).map_err(|e| {
            crate::error::AppError::Template(format!("Invalid context for '{}': {}", name, e))
        })?;
        self.engine.render(name, &template.content, &context)
    }

    /// Template text without rendering (system prompts have no variables)
    pub fn text(&self, name: &str) -> AppResult<String> {
        Ok(self.resolver.resolve(name)?.content)
    }
}

impl Default for PromptLibrary {
    fn default() -> Self {
        Self::new(None)
    }
}

#[derive(Debug, Serialize)]
struct OriginalPrdContext<'a> {
    project_name: &'a str,
    answers_name: &'a str,
    project_type: &'a str,
    description: &'a str,
    target_audience: &'a str,
    complexity: Option<&'a str>,
    timeline: Option<&'a str>,
    is_web3: bool,
    uses_auth: bool,
    smart_contract_language: &'a str,
    wallet_integration: &'a str,
    multi_chain_support: Option<&'a str>,
    cross_chain_solution: Option<&'a str>,
    core_features: &'a str,
    phase1: &'a str,
    phase2: &'a str,
    phase3: &'a str,
    user_journeys: &'a str,
    additional_context: Option<&'a str>,
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Derive the original PRD from questionnaire answers
///
/// Pure template expansion: identical answers always produce identical text.
pub fn render_original_prd(
    prompts: &PromptLibrary,
    project_name: &str,
    answers: &InitialAnswers,
) -> AppResult<String> {
    let project_type = answers.project_type.trim();
    let is_web3 = project_type == "web3-dapp";
    let is_solidity = non_blank(&answers.smart_contract_language) == Some("solidity");
    let multi_chain = non_blank(&answers.multi_chain_support);

    let answers_name = match answers.project_name.trim() {
        "" => project_name,
        name => name,
    };

    let context = OriginalPrdContext {
        project_name,
        answers_name,
        project_type: if project_type.is_empty() { NOT_SPECIFIED } else { project_type },
        description: non_blank(&answers.description).unwrap_or(NOT_SPECIFIED),
        target_audience: non_blank(&answers.target_audience).unwrap_or(NOT_SPECIFIED),
        complexity: non_blank(&answers.complexity),
        timeline: non_blank(&answers.timeline),
        is_web3,
        uses_auth: project_type == "web-app" && non_blank(&answers.authentication) == Some("yes"),
        smart_contract_language: non_blank(&answers.smart_contract_language)
            .unwrap_or(NOT_SPECIFIED),
        wallet_integration: non_blank(&answers.wallet_integration).unwrap_or(NOT_SPECIFIED),
        multi_chain_support: if is_web3 && is_solidity {
            Some(multi_chain.unwrap_or(NOT_SPECIFIED))
        } else {
            None
        },
        cross_chain_solution: if is_web3 && multi_chain == Some("multi-chain") {
            Some(non_blank(&answers.cross_chain_solution).unwrap_or(NOT_SPECIFIED))
        } else {
            None
        },
        core_features: non_blank(&answers.core_features).unwrap_or(TO_BE_DEFINED),
        phase1: non_blank(&answers.phase1).unwrap_or(TO_BE_DEFINED),
        phase2: non_blank(&answers.phase2).unwrap_or(TO_BE_DEFINED),
        phase3: non_blank(&answers.phase3).unwrap_or(TO_BE_DEFINED),
        user_journeys: non_blank(&answers.sample_user_journeys).unwrap_or(TO_BE_DEFINED),
        additional_context: non_blank(&answers.additional_context),
    };

    prompts.render(builtin::ORIGINAL_PRD, &context)
}
