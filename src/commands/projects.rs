// Backend commands for project, answers and PRD management
//
// Projects are stored under {data_dir}/projects/{id}/

use super::ServiceContext;
use crate::error::{AppError, AppResult};
use crate::file_storage::ArtifactKind;
use crate::models::{
    InitialAnswers, Project, ProjectAggregate, ProjectAnswers, ProjectMetadata, Target,
};
use crate::prd_workflow::{self, ProjectStep};
use crate::templates::render_original_prd;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Request body for creating a project
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProjectRequest {
    pub name: String,
}

/// Request body for updating a project
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProjectRequest {
    pub name: Option<String>,
}

/// Request body for saving the questionnaire and deriving the PRD
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitialAnswersRequest {
    #[serde(alias = "answers")]
    pub initial_answers: InitialAnswers,
    #[serde(default)]
    pub questions: BTreeMap<String, String>,
}

/// Step navigation action
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum StepAction {
    /// Jump to a specific step
    Goto { step: ProjectStep },
    /// Advance along the primary chain
    Next,
    /// Go back one step
    Previous,
}

/// Saved PRD text and its new version
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PrdDocument {
    pub content: String,
    pub prd_version: u32,
}

/// Create a new project
pub async fn create_project(ctx: &ServiceContext, request: CreateProjectRequest) -> AppResult<Project> {
    log::info!("Creating project '{}'", request.name.trim());
    prd_workflow::create_project(&ctx.store, &request.name)
}

/// List all projects, most recently updated first
pub async fn list_projects(ctx: &ServiceContext) -> AppResult<Vec<Project>> {
    prd_workflow::list_projects(&ctx.store)
}

/// Get a project with every artifact the client needs to render it
pub async fn get_project(ctx: &ServiceContext, project_id: &str) -> AppResult<ProjectAggregate> {
    let project = prd_workflow::load_project(&ctx.store, project_id)?;
    let metadata = ctx.store.get_json(project_id, &ArtifactKind::Metadata)?;
    let answers = ctx.store.try_get_json(project_id, &ArtifactKind::Answers)?;
    let prd = ctx.store.try_get_text(project_id, &ArtifactKind::Prd)?;
    let refined_prd = ctx.store.try_get_text(project_id, &ArtifactKind::RefinedPrd)?;

    Ok(ProjectAggregate {
        project,
        metadata,
        answers,
        prd,
        refined_prd,
    })
}

/// Rename a project
pub async fn update_project(
    ctx: &ServiceContext,
    project_id: &str,
    request: UpdateProjectRequest,
) -> AppResult<Project> {
    let name = match request.name {
        Some(name) if !name.trim().is_empty() => name.trim().to_string(),
        Some(_) => return Err(AppError::validation("Project name cannot be empty")),
        None => return prd_workflow::load_project(&ctx.store, project_id),
    };

    log::info!("Renaming project {} to '{}'", project_id, name);
    prd_workflow::update_project(&ctx.store, project_id, |project| {
        project.name = name;
        Ok(())
    })
}

/// Delete a project and all of its artifacts
pub async fn delete_project(ctx: &ServiceContext, project_id: &str) -> AppResult<()> {
    log::info!("Deleting project {}", project_id);
    ctx.store.delete_project(project_id)
}

pub async fn get_metadata(ctx: &ServiceContext, project_id: &str) -> AppResult<ProjectMetadata> {
    prd_workflow::load_metadata(&ctx.store, project_id)
}

/// Overwrite the metadata record
///
/// The step change is validated like any other transition and mirrored onto
/// the project record. Version counters only move through PRD and answer
/// saves, and the generated-file registry only accepts allow-listed names.
pub async fn save_metadata(
    ctx: &ServiceContext,
    project_id: &str,
    metadata: ProjectMetadata,
) -> AppResult<ProjectMetadata> {
    if metadata.project_id != project_id {
        return Err(AppError::validation(format!(
            "Metadata belongs to project {}, not {}",
            metadata.project_id, project_id
        )));
    }
    if let Some(target) = metadata.selected_target() {
        target.require_available()?;
    }
    if let Some(generation) = &metadata.generation {
        for (target, files) in &generation.generated_files {
            for filename in files {
                target.check_doc_file(filename)?;
            }
        }
    }

    let saved = prd_workflow::update_metadata(&ctx.store, project_id, |current| {
        if metadata.prd_version != current.prd_version
            || metadata.answers_version != current.answers_version
        {
            return Err(AppError::validation(format!(
                "Version counters are read-only (prdVersion {}, answersVersion {})",
                current.prd_version, current.answers_version
            )));
        }
        prd_workflow::transition_step(
            current.current_step,
            metadata.current_step,
            metadata.selected_target().is_some(),
        )?;
        *current = metadata;
        Ok(())
    })?;

    prd_workflow::sync_project_step(&ctx.store, project_id, saved.current_step)?;
    Ok(saved)
}

pub async fn get_answers(ctx: &ServiceContext, project_id: &str) -> AppResult<ProjectAnswers> {
    prd_workflow::require_project(&ctx.store, project_id)?;
    ctx.store.get_json(project_id, &ArtifactKind::Answers)
}

/// Save questionnaire answers, bumping the answers version
pub async fn save_answers(
    ctx: &ServiceContext,
    project_id: &str,
    initial_answers: InitialAnswers,
    questions: BTreeMap<String, String>,
) -> AppResult<ProjectAnswers> {
    prd_workflow::require_project(&ctx.store, project_id)?;

    let previous: Option<ProjectAnswers> = ctx.store.try_get_json(project_id, &ArtifactKind::Answers)?;
    let version = previous.as_ref().map(|a| a.version + 1).unwrap_or(1);
    let questions = match (questions.is_empty(), previous) {
        (true, Some(previous)) => previous.questions,
        _ => questions,
    };

    let answers = ProjectAnswers {
        project_id: project_id.to_string(),
        version,
        initial_answers,
        questions,
    };
    ctx.store.put_json(project_id, &ArtifactKind::Answers, &answers)?;
    log::info!("Saved answers v{} for project {}", version, project_id);

    if let Err(e) = prd_workflow::record_answers_version(&ctx.store, project_id, version) {
        log::warn!("Failed to record answers version for {}: {}", project_id, e);
    }

    Ok(answers)
}

/// Save the questionnaire and derive the original PRD from it
///
/// Deriving is pure template expansion, no model call is made.
pub async fn save_initial_answers(
    ctx: &ServiceContext,
    project_id: &str,
    request: InitialAnswersRequest,
) -> AppResult<ProjectAggregate> {
    let project = prd_workflow::load_project(&ctx.store, project_id)?;
    save_answers(ctx, project_id, request.initial_answers.clone(), request.questions).await?;

    let prd = render_original_prd(&ctx.prompts, &project.name, &request.initial_answers)?;
    ctx.store.put_text(project_id, &ArtifactKind::Prd, &prd)?;
    prd_workflow::bump_prd_version(&ctx.store, project_id)?;
    log::info!("Derived original PRD for project {}", project_id);

    prd_workflow::advance_best_effort(&ctx.store, project_id, ProjectStep::PrdPreview);

    get_project(ctx, project_id).await
}

pub async fn get_prd(ctx: &ServiceContext, project_id: &str) -> AppResult<String> {
    prd_workflow::require_project(&ctx.store, project_id)?;
    ctx.store.get_text(project_id, &ArtifactKind::Prd)
}

/// Save the original PRD. Every save bumps the PRD version.
pub async fn save_prd(ctx: &ServiceContext, project_id: &str, content: String) -> AppResult<PrdDocument> {
    prd_workflow::require_project(&ctx.store, project_id)?;
    ctx.store.put_text(project_id, &ArtifactKind::Prd, &content)?;
    let prd_version = prd_workflow::bump_prd_version(&ctx.store, project_id)?;
    log::info!("Saved PRD v{} for project {}", prd_version, project_id);
    Ok(PrdDocument { content, prd_version })
}

pub async fn get_refined_prd(ctx: &ServiceContext, project_id: &str) -> AppResult<String> {
    prd_workflow::require_project(&ctx.store, project_id)?;
    ctx.store.get_text(project_id, &ArtifactKind::RefinedPrd)
}

/// Overwrite the refined PRD with manual edits
pub async fn save_refined_prd(ctx: &ServiceContext, project_id: &str, content: String) -> AppResult<String> {
    prd_workflow::require_project(&ctx.store, project_id)?;
    ctx.store.put_text(project_id, &ArtifactKind::RefinedPrd, &content)?;
    prd_workflow::update_project(&ctx.store, project_id, |_| Ok(()))?;
    log::info!("Saved refined PRD for project {}", project_id);
    Ok(content)
}

/// Apply a step navigation action
pub async fn change_step(ctx: &ServiceContext, project_id: &str, action: StepAction) -> AppResult<Project> {
    match action {
        StepAction::Goto { step } => prd_workflow::go_to_step(&ctx.store, project_id, step),
        StepAction::Next => prd_workflow::next_step(&ctx.store, project_id),
        StepAction::Previous => prd_workflow::previous_step(&ctx.store, project_id),
    }
}

/// Record the downstream target and move to target selection
pub async fn select_target(ctx: &ServiceContext, project_id: &str, target: Target) -> AppResult<Project> {
    prd_workflow::select_target(&ctx.store, project_id, target)
}

/// Move to documentation generation for the selected target
pub async fn begin_generation(ctx: &ServiceContext, project_id: &str) -> AppResult<Project> {
    prd_workflow::begin_generation(&ctx.store, project_id)
}
