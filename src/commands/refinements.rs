// Backend commands for the refinement question/answer workflow

use super::ServiceContext;
use crate::error::{AppError, AppResult};
use crate::file_storage::ArtifactKind;
use crate::models::{CompletionStatus, RefinementAnswer, RefinementSet};
use crate::prd_workflow::{self, ProjectStep};
use crate::refinement::{decode_questions, prompt_answers, PromptAnswer};
use crate::templates::builtin;
use chrono::Utc;
use serde::Serialize;

#[derive(Serialize)]
struct PrdPromptContext<'a> {
    prd: &'a str,
}

#[derive(Serialize)]
struct RefinementPromptContext<'a> {
    prd: &'a str,
    answers: &'a [PromptAnswer],
}

/// Generate the refinement question batch
///
/// Idempotent: an existing set is returned unchanged without a model call.
/// A malformed model reply is a parse error and nothing is persisted.
pub async fn generate_questions(ctx: &ServiceContext, project_id: &str) -> AppResult<RefinementSet> {
    prd_workflow::require_project(&ctx.store, project_id)?;

    if let Some(existing) = ctx
        .store
        .try_get_json::<RefinementSet>(project_id, &ArtifactKind::Refinements)?
    {
        log::debug!("Refinement questions already exist for project {}", project_id);
        return Ok(existing);
    }

    let prd = ctx.store.get_text(project_id, &ArtifactKind::Prd)?;

    let system_prompt = ctx.prompts.text(builtin::REFINEMENT_QUESTIONS_SYSTEM)?;
    let user_prompt = ctx
        .prompts
        .render(builtin::REFINEMENT_QUESTIONS_USER, &PrdPromptContext { prd: &prd })?;

    log::info!(
        "Generating refinement questions for project {} via {}",
        project_id,
        ctx.llm.name()
    );
    let reply = ctx
        .llm
        .complete(ctx.request(system_prompt, user_prompt, ctx.llm_config.questions))
        .await?;

    let questions = decode_questions(&reply).map_err(|e| {
        log::warn!("Rejected refinement questions for project {}: {}", project_id, e);
        e
    })?;

    let set = RefinementSet::new(project_id, questions, Utc::now());
    ctx.store.put_json(project_id, &ArtifactKind::Refinements, &set)?;

    if let Err(e) = prd_workflow::mark_questions_generated(&ctx.store, project_id) {
        log::warn!("Failed to record question generation for {}: {}", project_id, e);
    }
    prd_workflow::advance_best_effort(&ctx.store, project_id, ProjectStep::RefinementQuestions);

    Ok(set)
}

pub async fn get_refinements(ctx: &ServiceContext, project_id: &str) -> AppResult<RefinementSet> {
    prd_workflow::require_project(&ctx.store, project_id)?;
    ctx.store.get_json(project_id, &ArtifactKind::Refinements)
}

/// Replace the answer list wholesale. Partial answer sets are legal.
pub async fn save_refinement_answers(
    ctx: &ServiceContext,
    project_id: &str,
    answers: Vec<RefinementAnswer>,
) -> AppResult<RefinementSet> {
    prd_workflow::require_project(&ctx.store, project_id)?;

    let mut set: RefinementSet = ctx.store.get_json(project_id, &ArtifactKind::Refinements)?;

    let unknown = set.unknown_question_ids(&answers);
    if !unknown.is_empty() {
        return Err(AppError::validation(format!(
            "Answers reference unknown question ids: {:?}",
            unknown
        )));
    }

    set.answers = answers;
    set.updated_at = Utc::now();
    ctx.store.put_json(project_id, &ArtifactKind::Refinements, &set)?;

    let status = set.completion();
    log::info!(
        "Saved refinement answers for project {} ({} answered, {} skipped of {})",
        project_id,
        status.answered,
        status.skipped,
        status.total
    );
    Ok(set)
}

pub async fn completion_status(ctx: &ServiceContext, project_id: &str) -> AppResult<CompletionStatus> {
    Ok(get_refinements(ctx, project_id).await?.completion())
}

/// Synthesize the refined PRD for the first time
///
/// Refuses to overwrite an existing refined PRD; use [`reprocess_refinement`].
pub async fn process_refinement(ctx: &ServiceContext, project_id: &str) -> AppResult<String> {
    prd_workflow::require_project(&ctx.store, project_id)?;
    if ctx.store.exists(project_id, &ArtifactKind::RefinedPrd)? {
        return Err(AppError::validation(
            "Refined PRD already exists; use reprocess to regenerate it",
        ));
    }
    synthesize(ctx, project_id).await
}

/// Regenerate an existing refined PRD from the current answers
pub async fn reprocess_refinement(ctx: &ServiceContext, project_id: &str) -> AppResult<String> {
    prd_workflow::require_project(&ctx.store, project_id)?;
    if !ctx.store.exists(project_id, &ArtifactKind::RefinedPrd)? {
        return Err(AppError::validation(
            "No refined PRD to reprocess; process the refinement first",
        ));
    }
    synthesize(ctx, project_id).await
}

async fn synthesize(ctx: &ServiceContext, project_id: &str) -> AppResult<String> {
    let prd = ctx.store.get_text(project_id, &ArtifactKind::Prd)?;
    let set: RefinementSet = ctx.store.get_json(project_id, &ArtifactKind::Refinements)?;

    let status = set.completion();
    if !status.is_complete {
        return Err(AppError::validation(format!(
            "All refinement questions must be answered or skipped ({} of {} done)",
            status.answered + status.skipped,
            status.total
        )));
    }

    let answers = prompt_answers(&set);
    let system_prompt = ctx.prompts.text(builtin::PROCESS_REFINEMENT_SYSTEM)?;
    let user_prompt = ctx.prompts.render(
        builtin::PROCESS_REFINEMENT_USER,
        &RefinementPromptContext {
            prd: &prd,
            answers: &answers,
        },
    )?;

    log::info!(
        "Processing refinement for project {} ({} answered, {} skipped)",
        project_id,
        status.answered,
        status.skipped
    );
    // A failed pass leaves the project in `processing` so it can be retried
    prd_workflow::advance_best_effort(&ctx.store, project_id, ProjectStep::Processing);
    let refined = ctx
        .llm
        .complete(ctx.request(system_prompt, user_prompt, ctx.llm_config.refinement))
        .await?;

    ctx.store.put_text(project_id, &ArtifactKind::RefinedPrd, &refined)?;

    if let Err(e) = prd_workflow::mark_refinement_processed(&ctx.store, project_id) {
        log::warn!("Failed to record refinement pass for {}: {}", project_id, e);
    }
    prd_workflow::advance_best_effort(&ctx.store, project_id, ProjectStep::Complete);

    Ok(refined)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::projects::{create_project, save_prd, CreateProjectRequest};
    use crate::commands::test_support::{context, questions_reply};

    async fn project_with_prd(ctx: &ServiceContext) -> String {
        let project = create_project(ctx, CreateProjectRequest { name: "Acme".into() })
            .await
            .unwrap();
        save_prd(ctx, &project.id, "# Original".into()).await.unwrap();
        project.id
    }

    fn answer(id: u32, text: &str, skipped: bool) -> RefinementAnswer {
        RefinementAnswer {
            question_id: id,
            answer: text.to_string(),
            skipped,
            timestamp: Utc::now(),
        }
    }

    fn complete_answers() -> Vec<RefinementAnswer> {
        (1..=10)
            .map(|id| {
                if id <= 6 {
                    answer(id, &format!("Answer {}", id), false)
                } else {
                    answer(id, "", true)
                }
            })
            .collect()
    }

    #[tokio::test]
    async fn test_generate_is_idempotent() {
        let (_dir, ctx, model) = context();
        let id = project_with_prd(&ctx).await;
        model.push_ok(&format!("Sure!\n```json\n{}\n```", questions_reply()));

        let first = generate_questions(&ctx, &id).await.unwrap();
        let second = generate_questions(&ctx, &id).await.unwrap();

        assert_eq!(model.calls(), 1);
        assert_eq!(first, second);
        assert_eq!(first.questions.len(), 10);
        assert!(first.answers.is_empty());

        let request = model.last_request().unwrap();
        assert!(request.user_prompt.contains("# Original"));
        assert_eq!(request.max_output_tokens, ctx.llm_config.questions.max_tokens);

        let metadata = prd_workflow::load_metadata(&ctx.store, &id).unwrap();
        assert_eq!(metadata.current_step, ProjectStep::RefinementQuestions);
        assert!(metadata.refinement.unwrap().questions_generated_at.is_some());
    }

    #[tokio::test]
    async fn test_generate_requires_prd() {
        let (_dir, ctx, model) = context();
        let project = create_project(&ctx, CreateProjectRequest { name: "Acme".into() })
            .await
            .unwrap();

        let err = generate_questions(&ctx, &project.id).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
        assert_eq!(model.calls(), 0);
    }

    #[tokio::test]
    async fn test_malformed_reply_persists_nothing() {
        let (_dir, ctx, model) = context();
        let id = project_with_prd(&ctx).await;
        model.push_ok(r#"[{"id": 1, "question": "Only one?", "category": "ux", "priority": "low"}]"#);

        let err = generate_questions(&ctx, &id).await.unwrap_err();
        assert!(matches!(err, AppError::Parse(_)));
        assert!(!ctx.store.exists(&id, &ArtifactKind::Refinements).unwrap());
    }

    #[tokio::test]
    async fn test_upstream_failure_propagates() {
        let (_dir, ctx, model) = context();
        let id = project_with_prd(&ctx).await;
        model.push_err(AppError::Upstream("503 Service Unavailable".into()));

        assert!(matches!(
            generate_questions(&ctx, &id).await,
            Err(AppError::Upstream(_))
        ));
        assert!(!ctx.store.exists(&id, &ArtifactKind::Refinements).unwrap());
    }

    #[tokio::test]
    async fn test_answers_round_trip_and_unknown_ids() {
        let (_dir, ctx, model) = context();
        let id = project_with_prd(&ctx).await;
        model.push_ok(&questions_reply());
        generate_questions(&ctx, &id).await.unwrap();

        let answers = vec![answer(1, "Postgres", false), answer(2, "", true)];
        save_refinement_answers(&ctx, &id, answers.clone()).await.unwrap();
        assert_eq!(get_refinements(&ctx, &id).await.unwrap().answers, answers);

        let status = completion_status(&ctx, &id).await.unwrap();
        assert_eq!(status.answered, 1);
        assert_eq!(status.skipped, 1);
        assert!(!status.is_complete);

        let err = save_refinement_answers(&ctx, &id, vec![answer(42, "?", false)])
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(get_refinements(&ctx, &id).await.unwrap().answers, answers);
    }

    #[tokio::test]
    async fn test_save_answers_requires_set() {
        let (_dir, ctx, _model) = context();
        let id = project_with_prd(&ctx).await;
        assert!(matches!(
            save_refinement_answers(&ctx, &id, vec![]).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_processing_is_gated_on_completion() {
        let (_dir, ctx, model) = context();
        let id = project_with_prd(&ctx).await;
        model.push_ok(&questions_reply());
        generate_questions(&ctx, &id).await.unwrap();

        let mut answers = complete_answers();
        answers[0].answer = "   ".into();
        save_refinement_answers(&ctx, &id, answers).await.unwrap();

        let err = process_refinement(&ctx, &id).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(model.calls(), 1);
        assert!(!ctx.store.exists(&id, &ArtifactKind::RefinedPrd).unwrap());
    }

    #[tokio::test]
    async fn test_process_then_reprocess() {
        let (_dir, ctx, model) = context();
        let id = project_with_prd(&ctx).await;
        model.push_ok(&questions_reply());
        generate_questions(&ctx, &id).await.unwrap();
        save_refinement_answers(&ctx, &id, complete_answers()).await.unwrap();

        assert!(reprocess_refinement(&ctx, &id).await.is_err());

        model.push_ok("REFINED");
        assert_eq!(process_refinement(&ctx, &id).await.unwrap(), "REFINED");
        let prompt = model.last_request().unwrap().user_prompt;
        assert!(prompt.contains("Answer: Answer 1"));
        assert!(prompt.contains("Answer: [SKIPPED]"));

        // First-time processing refuses to overwrite
        assert!(matches!(
            process_refinement(&ctx, &id).await,
            Err(AppError::Validation(_))
        ));

        model.push_ok("REFINED AGAIN");
        assert_eq!(reprocess_refinement(&ctx, &id).await.unwrap(), "REFINED AGAIN");

        let metadata = prd_workflow::load_metadata(&ctx.store, &id).unwrap();
        assert_eq!(metadata.current_step, ProjectStep::Complete);
        assert_eq!(metadata.refinement.unwrap().process_count, 2);
    }

    #[tokio::test]
    async fn test_failed_pass_stays_in_processing() {
        let (_dir, ctx, model) = context();
        let id = project_with_prd(&ctx).await;
        model.push_ok(&questions_reply());
        generate_questions(&ctx, &id).await.unwrap();
        save_refinement_answers(&ctx, &id, complete_answers()).await.unwrap();

        model.push_err(AppError::Upstream("rate limited".into()));
        let err = process_refinement(&ctx, &id).await.unwrap_err();
        assert!(matches!(err, AppError::Upstream(_)));

        let project = prd_workflow::load_project(&ctx.store, &id).unwrap();
        assert_eq!(project.current_step, ProjectStep::Processing);
        assert_eq!(project.status, prd_workflow::ProjectStatus::Processing);
        assert!(!ctx.store.exists(&id, &ArtifactKind::RefinedPrd).unwrap());
    }
}
