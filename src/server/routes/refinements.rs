//! Refinement routing
//!
//! Handles question generation, answer saves, the completion status and
//! refined PRD processing.

use super::projects::TextDocument;
use crate::commands;
use crate::models::{CompletionStatus, RefinementAnswer, RefinementSet};
use crate::server::response::{get_arg, ok, parse_body, ApiResult};
use crate::server::ServerAppState;
use axum::{
    body::Bytes,
    extract::{Path, State},
    routing::{get, post},
    Router,
};
use serde_json::Value;

pub fn router() -> Router<ServerAppState> {
    Router::new()
        .route(
            "/projects/:id/refinements",
            get(get_refinements).put(save_answers),
        )
        .route("/projects/:id/refinements/generate", post(generate_questions))
        .route("/projects/:id/refinements/status", get(completion_status))
        .route("/projects/:id/refinements/process", post(process))
        .route("/projects/:id/refinements/reprocess", post(reprocess))
}

async fn get_refinements(
    State(state): State<ServerAppState>,
    Path(id): Path<String>,
) -> ApiResult<RefinementSet> {
    ok(commands::get_refinements(&state.ctx, &id).await?)
}

async fn save_answers(
    State(state): State<ServerAppState>,
    Path(id): Path<String>,
    body: Bytes,
) -> ApiResult<RefinementSet> {
    let args: Value = parse_body(&body)?;
    let answers: Vec<RefinementAnswer> = get_arg(&args, "answers")?;
    ok(commands::save_refinement_answers(&state.ctx, &id, answers).await?)
}

async fn generate_questions(
    State(state): State<ServerAppState>,
    Path(id): Path<String>,
) -> ApiResult<RefinementSet> {
    ok(commands::generate_questions(&state.ctx, &id).await?)
}

async fn completion_status(
    State(state): State<ServerAppState>,
    Path(id): Path<String>,
) -> ApiResult<CompletionStatus> {
    ok(commands::completion_status(&state.ctx, &id).await?)
}

async fn process(
    State(state): State<ServerAppState>,
    Path(id): Path<String>,
) -> ApiResult<TextDocument> {
    let content = commands::process_refinement(&state.ctx, &id).await?;
    ok(TextDocument { content })
}

async fn reprocess(
    State(state): State<ServerAppState>,
    Path(id): Path<String>,
) -> ApiResult<TextDocument> {
    let content = commands::reprocess_refinement(&state.ctx, &id).await?;
    ok(TextDocument { content })
}
