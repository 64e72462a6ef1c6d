// Backend commands for per-target documentation generation
//
// Each allow-listed file has its own status sidecar, so files are generated
// and fail independently of each other.

use super::ServiceContext;
use crate::error::{AppError, AppResult};
use crate::file_storage::ArtifactKind;
use crate::models::{
    DocFileState, DocGenerationResult, DocStatus, GeneratedDocFile, ProjectAnswers, Target,
};
use crate::prd_workflow;
use crate::templates::builtin;
use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Request body for generating a file
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateDocRequest {
    #[serde(alias = "ide")]
    pub target: Target,
}

/// Request body for overwriting a file
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDocRequest {
    #[serde(alias = "ide")]
    pub target: Target,
    pub content: String,
}

#[derive(Serialize)]
struct DocPromptContext<'a> {
    prd: &'a str,
    answers_json: &'a str,
    filename: &'a str,
    target_name: &'a str,
}

fn read_state(
    ctx: &ServiceContext,
    project_id: &str,
    target: Target,
    filename: &str,
) -> AppResult<DocFileState> {
    Ok(ctx
        .store
        .try_get_json(project_id, &ArtifactKind::doc_state(target, filename))?
        .unwrap_or_default())
}

fn write_state(
    ctx: &ServiceContext,
    project_id: &str,
    target: Target,
    filename: &str,
    state: &DocFileState,
) -> AppResult<()> {
    ctx.store
        .put_json(project_id, &ArtifactKind::doc_state(target, filename), state)
}

/// Generate one documentation file for a target
///
/// Target and filename are validated before any I/O or model call. On failure
/// the status records the error and any previous content is left untouched.
pub async fn generate_doc_file(
    ctx: &ServiceContext,
    project_id: &str,
    filename: &str,
    target: Target,
) -> AppResult<DocGenerationResult> {
    target.require_available()?;
    target.check_doc_file(filename)?;

    prd_workflow::require_project(&ctx.store, project_id)?;
    let refined = ctx.store.get_text(project_id, &ArtifactKind::RefinedPrd)?;
    let answers: Option<ProjectAnswers> = ctx.store.try_get_json(project_id, &ArtifactKind::Answers)?;

    write_state(
        ctx,
        project_id,
        target,
        filename,
        &DocFileState::with_status(DocStatus::Generating, Utc::now()),
    )?;
    log::info!(
        "Generating {} for {} (project {})",
        filename,
        target.display_name(),
        project_id
    );

    let outcome = async {
        let content = render_and_complete(ctx, &refined, answers.as_ref(), filename, target).await?;
        ctx.store
            .put_text(project_id, &ArtifactKind::doc_file(target, filename), &content)?;
        write_state(
            ctx,
            project_id,
            target,
            filename,
            &DocFileState::with_status(DocStatus::Generated, Utc::now()),
        )?;
        Ok::<_, AppError>(content)
    }
    .await;

    match outcome {
        Ok(content) => {
            let generated_files = register_generated(ctx, project_id, target, filename);
            Ok(DocGenerationResult {
                file: GeneratedDocFile {
                    target,
                    filename: filename.to_string(),
                    status: DocStatus::Generated,
                    content: Some(content),
                    error_message: None,
                },
                generated_files,
            })
        }
        Err(e) => {
            log::warn!(
                "Generating {} for project {} failed: {}",
                filename,
                project_id,
                e
            );
            if let Err(state_err) = write_state(
                ctx,
                project_id,
                target,
                filename,
                &DocFileState::failed(e.to_string(), Utc::now()),
            ) {
                log::warn!("Failed to record error status for {}: {}", filename, state_err);
            }
            Err(e)
        }
    }
}

async fn render_and_complete(
    ctx: &ServiceContext,
    refined: &str,
    answers: Option<&ProjectAnswers>,
    filename: &str,
    target: Target,
) -> AppResult<String> {
    let answers_json = match answers {
        Some(a) => serde_json::to_string_pretty(a)
            .map_err(|e| AppError::Storage(format!("Failed to serialize answers: {}", e)))?,
        None => "{}".to_string(),
    };

    let system_prompt = ctx.prompts.text(builtin::GENERATE_DOCS_SYSTEM)?;
    let user_prompt = ctx.prompts.render(
        builtin::GENERATE_DOCS_USER,
        &DocPromptContext {
            prd: refined,
            answers_json: &answers_json,
            filename,
            target_name: target.display_name(),
        },
    )?;

    ctx.llm
        .complete(ctx.request(system_prompt, user_prompt, ctx.llm_config.docs))
        .await
}

/// Add the file to the registry. Best-effort: failures are logged.
fn register_generated(
    ctx: &ServiceContext,
    project_id: &str,
    target: Target,
    filename: &str,
) -> Vec<String> {
    let result = prd_workflow::update_metadata(&ctx.store, project_id, |metadata| {
        metadata.generation_mut().register(target, filename, Utc::now());
        Ok(())
    });

    match result {
        Ok(metadata) => metadata
            .generation
            .map(|g| g.files_for(target))
            .unwrap_or_default(),
        Err(e) => {
            log::warn!("Failed to register {} for project {}: {}", filename, project_id, e);
            Vec::new()
        }
    }
}

/// Read one generated file and its status
pub async fn get_doc_file(
    ctx: &ServiceContext,
    project_id: &str,
    filename: &str,
    target: Target,
) -> AppResult<GeneratedDocFile> {
    target.check_doc_file(filename)?;
    prd_workflow::require_project(&ctx.store, project_id)?;

    let state = read_state(ctx, project_id, target, filename)?;
    let content = ctx
        .store
        .try_get_text(project_id, &ArtifactKind::doc_file(target, filename))?;
    if content.is_none() && state.status == DocStatus::NotGenerated {
        return Err(AppError::not_found(format!(
            "{} has not been generated for {}",
            filename,
            target.display_name()
        )));
    }

    Ok(GeneratedDocFile {
        target,
        filename: filename.to_string(),
        status: state.status,
        content,
        error_message: state.error_message,
    })
}

/// Overwrite a generated file with edited content
pub async fn update_doc_file(
    ctx: &ServiceContext,
    project_id: &str,
    filename: &str,
    request: UpdateDocRequest,
) -> AppResult<GeneratedDocFile> {
    let target = request.target;
    target.check_doc_file(filename)?;
    prd_workflow::require_project(&ctx.store, project_id)?;

    ctx.store.put_text(
        project_id,
        &ArtifactKind::doc_file(target, filename),
        &request.content,
    )?;
    write_state(
        ctx,
        project_id,
        target,
        filename,
        &DocFileState::with_status(DocStatus::Generated, Utc::now()),
    )?;
    log::info!("Updated {} for project {}", filename, project_id);

    Ok(GeneratedDocFile {
        target,
        filename: filename.to_string(),
        status: DocStatus::Generated,
        content: Some(request.content),
        error_message: None,
    })
}

/// Status of every allow-listed file for a target (content omitted)
pub async fn list_doc_files(
    ctx: &ServiceContext,
    project_id: &str,
    target: Target,
) -> AppResult<Vec<GeneratedDocFile>> {
    prd_workflow::require_project(&ctx.store, project_id)?;

    target
        .doc_files()
        .iter()
        .map(|filename| {
            let state = read_state(ctx, project_id, target, filename)?;
            Ok(GeneratedDocFile {
                target,
                filename: filename.to_string(),
                status: state.status,
                content: None,
                error_message: state.error_message,
            })
        })
        .collect()
}
