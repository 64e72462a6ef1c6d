// Project records persisted in the artifact store

use super::Target;
use crate::prd_workflow::state::{ProjectStatus, ProjectStep};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};

/// A project and its coarse lifecycle position
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub status: ProjectStatus,
    pub current_step: ProjectStep,
    pub prd_version: u32,
}

impl Project {
    pub fn new(id: String, name: String, now: DateTime<Utc>) -> Self {
        let step = ProjectStep::default();
        Self {
            id,
            name,
            created_at: now,
            updated_at: now,
            status: step.status(),
            current_step: step,
            prd_version: 0,
        }
    }
}

/// Progress of the refinement workflow
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefinementProgress {
    /// When the question batch was generated
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub questions_generated_at: Option<DateTime<Utc>>,
    /// When the refined PRD was last synthesized
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processed_at: Option<DateTime<Utc>>,
    /// Number of successful refinement passes (first pass plus reprocessing)
    #[serde(default)]
    pub process_count: u32,
}

/// Target selection and per-target generated file registry
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_target: Option<Target>,
    /// Filenames generated at least once, per target
    #[serde(default)]
    pub generated_files: BTreeMap<Target, BTreeSet<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_generated_file: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_generated_at: Option<DateTime<Utc>>,
}

impl GenerationState {
    /// Record a successful generation. Returns false if the file was already registered.
    pub fn register(&mut self, target: Target, filename: &str, at: DateTime<Utc>) -> bool {
        let inserted = self
            .generated_files
            .entry(target)
            .or_default()
            .insert(filename.to_string());
        self.last_generated_file = Some(filename.to_string());
        self.last_generated_at = Some(at);
        inserted
    }

    /// Registered filenames for a target, in stable order
    pub fn files_for(&self, target: Target) -> Vec<String> {
        self.generated_files
            .get(&target)
            .map(|files| files.iter().cloned().collect())
            .unwrap_or_default()
    }
}

/// Per-project metadata, exactly one per project
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectMetadata {
    pub project_id: String,
    pub current_step: ProjectStep,
    pub prd_version: u32,
    pub answers_version: u32,
    pub last_edited: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refinement: Option<RefinementProgress>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generation: Option<GenerationState>,
}

impl ProjectMetadata {
    pub fn new(project_id: &str, now: DateTime<Utc>) -> Self {
        Self {
            project_id: project_id.to_string(),
            current_step: ProjectStep::default(),
            prd_version: 0,
            answers_version: 0,
            last_edited: now,
            refinement: None,
            generation: None,
        }
    }

    pub fn status(&self) -> ProjectStatus {
        self.current_step.status()
    }

    pub fn selected_target(&self) -> Option<Target> {
        self.generation.as_ref().and_then(|g| g.selected_target)
    }

    pub fn generation_mut(&mut self) -> &mut GenerationState {
        self.generation.get_or_insert_with(GenerationState::default)
    }

    pub fn refinement_mut(&mut self) -> &mut RefinementProgress {
        self.refinement.get_or_insert_with(RefinementProgress::default)
    }
}

/// Questionnaire responses used to seed the original PRD
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitialAnswers {
    #[serde(alias = "name", default)]
    pub project_name: String,
    #[serde(alias = "type", default)]
    pub project_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_audience: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub complexity: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeline: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub core_features: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase1: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase2: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase3: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sample_user_journeys: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_context: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authentication: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub smart_contract_language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wallet_integration: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multi_chain_support: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cross_chain_solution: Option<String>,
    /// Any other questionnaire fields, kept verbatim
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// Versioned questionnaire record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectAnswers {
    pub project_id: String,
    pub version: u32,
    pub initial_answers: InitialAnswers,
    /// Question text shown for each questionnaire field
    #[serde(default)]
    pub questions: BTreeMap<String, String>,
}

/// Everything the client needs to render a project
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectAggregate {
    pub project: Project,
    pub metadata: ProjectMetadata,
    pub answers: Option<ProjectAnswers>,
    pub prd: Option<String>,
    pub refined_prd: Option<String>,
}
