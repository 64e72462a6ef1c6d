//! Project lifecycle workflow
//!
//! A project moves through a primary linear chain of steps:
//!
//! 1. **Questions** - initial questionnaire
//! 2. **PRD Preview** - original PRD derived from the answers
//! 3. **PRD Edit** - manual edits to the original PRD
//! 4. **Refinement Questions** - answering the clarifying question batch
//! 5. **Processing** - refined PRD being synthesized
//! 6. **Complete** - refined PRD available
//!
//! After `Complete`, the extension steps `TargetSelection` and
//! `GeneratingDocs` drive per-target documentation generation.
//!
//! Every step change is validated by [`state::transition_step`] and persisted
//! to the metadata record first, then to the project record.

pub mod state;
pub mod storage;

pub use state::{
    can_transition, transition_step, ProjectStatus, ProjectStep,
    StepTransitionError,
};
pub use storage::{
    create_project, generate_project_id, list_projects, load_metadata, load_project,
    require_project, update_metadata, update_project,
};

use crate::error::{AppError, AppResult};
use crate::file_storage::ArtifactStore;
use crate::models::{Project, Target};
use chrono::Utc;

impl From<StepTransitionError> for AppError {
    fn from(e: StepTransitionError) -> Self {
        AppError::Validation(e.to_string())
    }
}

/// Validate and apply a step change
///
/// Two writes: metadata first, then the project record with its status
/// recomputed from the new step.
pub fn go_to_step(store: &ArtifactStore, project_id: &str, step: ProjectStep) -> AppResult<Project> {
    let metadata = update_metadata(store, project_id, |metadata| {
        let has_target = metadata.selected_target().is_some();
        metadata.current_step = transition_step(metadata.current_step, step, has_target)?;
        Ok(())
    })?;

    let project = sync_project_step(store, project_id, metadata.current_step)?;
    log::info!("Project {} moved to step '{}'", project_id, step);
    Ok(project)
}

/// Mirror the metadata step onto the project record
pub(crate) fn sync_project_step(
    store: &ArtifactStore,
    project_id: &str,
    step: ProjectStep,
) -> AppResult<Project> {
    update_project(store, project_id, |project| {
        project.current_step = step;
        project.status = step.status();
        Ok(())
    })
}

/// Advance one position along the primary chain. No-op at the end.
pub fn next_step(store: &ArtifactStore, project_id: &str) -> AppResult<Project> {
    let metadata = load_metadata(store, project_id)?;
    match metadata.current_step.next() {
        Some(step) => go_to_step(store, project_id, step),
        None => load_project(store, project_id),
    }
}

/// Move back one step. No-op at the start; extension steps go back to `Complete`.
pub fn previous_step(store: &ArtifactStore, project_id: &str) -> AppResult<Project> {
    let metadata = load_metadata(store, project_id)?;
    match metadata.current_step.previous() {
        Some(step) => go_to_step(store, project_id, step),
        None => load_project(store, project_id),
    }
}

/// Move to `step` if the transition table allows it, logging instead of failing
///
/// Used for the secondary step side-effects of content operations.
pub fn advance_best_effort(store: &ArtifactStore, project_id: &str, step: ProjectStep) {
    if let Err(e) = go_to_step(store, project_id, step) {
        log::warn!(
            "Could not move project {} to step '{}': {}",
            project_id,
            step,
            e
        );
    }
}

/// Record the downstream target and move to target selection
pub fn select_target(store: &ArtifactStore, project_id: &str, target: Target) -> AppResult<Project> {
    target.require_available()?;

    let current = load_metadata(store, project_id)?.current_step;
    transition_step(current, ProjectStep::TargetSelection, true)?;

    update_metadata(store, project_id, |metadata| {
        metadata.generation_mut().selected_target = Some(target);
        Ok(())
    })?;
    log::info!("Project {} selected target {}", project_id, target);

    go_to_step(store, project_id, ProjectStep::TargetSelection)
}

/// Start documentation generation for the selected target
pub fn begin_generation(store: &ArtifactStore, project_id: &str) -> AppResult<Project> {
    go_to_step(store, project_id, ProjectStep::GeneratingDocs)
}

/// Bump the PRD version on both records. Returns the new version.
pub fn bump_prd_version(store: &ArtifactStore, project_id: &str) -> AppResult<u32> {
    let metadata = update_metadata(store, project_id, |metadata| {
        metadata.prd_version += 1;
        Ok(())
    })?;
    update_project(store, project_id, |project| {
        project.prd_version = metadata.prd_version;
        Ok(())
    })?;
    Ok(metadata.prd_version)
}

/// Record a new answers version in the metadata
pub fn record_answers_version(store: &ArtifactStore, project_id: &str, version: u32) -> AppResult<()> {
    update_metadata(store, project_id, |metadata| {
        metadata.answers_version = metadata.answers_version.max(version);
        Ok(())
    })?;
    Ok(())
}

/// Record that the refinement question batch was generated
pub fn mark_questions_generated(store: &ArtifactStore, project_id: &str) -> AppResult<()> {
    update_metadata(store, project_id, |metadata| {
        metadata.refinement_mut().questions_generated_at = Some(Utc::now());
        Ok(())
    })?;
    Ok(())
}

/// Record a successful refinement pass
pub fn mark_refinement_processed(store: &ArtifactStore, project_id: &str) -> AppResult<()> {
    update_metadata(store, project_id, |metadata| {
        let progress = metadata.refinement_mut();
        progress.processed_at = Some(Utc::now());
        progress.process_count += 1;
        Ok(())
    })?;
    Ok(())
}
