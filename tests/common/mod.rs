// Shared helpers for integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use prd_rails_lib::commands::ServiceContext;
use prd_rails_lib::config::LlmConfig;
use prd_rails_lib::file_storage::ArtifactStore;
use prd_rails_lib::llm::{CompletionRequest, LanguageModel};
use prd_rails_lib::templates::PromptLibrary;
use prd_rails_lib::{AppError, AppResult};
use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

/// Language model double that replays queued replies
#[derive(Default)]
pub struct MockModel {
    replies: Mutex<VecDeque<String>>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl MockModel {
    pub fn reply(&self, text: impl Into<String>) {
        self.replies.lock().unwrap().push_back(text.into());
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl LanguageModel for MockModel {
    async fn complete(&self, request: CompletionRequest) -> AppResult<String> {
        self.requests.lock().unwrap().push(request);
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| AppError::Upstream("mock model has no reply queued".into()))
    }

    fn name(&self) -> &str {
        "mock"
    }
}

/// Rule templates shipped with the crate
pub fn rule_templates_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("rule_templates")
}

pub fn context() -> (TempDir, ServiceContext, Arc<MockModel>) {
    let temp_dir = TempDir::new().unwrap();
    let model = Arc::new(MockModel::default());
    let ctx = ServiceContext::new(
        ArtifactStore::new(temp_dir.path()),
        model.clone(),
        PromptLibrary::default(),
        LlmConfig::default(),
        rule_templates_dir(),
    );
    (temp_dir, ctx, model)
}

/// Ten refinement questions as the model would return them
pub fn ten_questions() -> String {
    let categories = ["technical", "ux", "security", "market", "resources"];
    let priorities = ["high", "medium", "low"];
    let items: Vec<serde_json::Value> = (1..=10)
        .map(|i: usize| {
            serde_json::json!({
                "id": i,
                "question": format!("Refinement question {}?", i),
                "category": categories[(i - 1) % categories.len()],
                "priority": priorities[(i - 1) % priorities.len()],
            })
        })
        .collect();
    format!(
        "Here are the questions:\n{}",
        serde_json::to_string_pretty(&items).unwrap()
    )
}
