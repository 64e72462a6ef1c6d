//! Project routing
//!
//! Handles project CRUD, metadata, questionnaire answers, the original and
//! refined PRD, step navigation and target selection.

use crate::commands::{self, InitialAnswersRequest, PrdDocument, StepAction, UpdateProjectRequest};
use crate::models::{Project, ProjectAggregate, ProjectAnswers, ProjectMetadata, Target};
use crate::server::response::{get_arg, get_opt_arg, ok, parse_body, ApiResult};
use crate::server::ServerAppState;
use axum::{
    body::Bytes,
    extract::{Path, State},
    routing::{get, post},
    Router,
};
use serde::Serialize;
use serde_json::Value;

/// Plain text document payload
#[derive(Debug, Serialize)]
pub struct TextDocument {
    pub content: String,
}

pub fn router() -> Router<ServerAppState> {
    Router::new()
        .route("/projects", get(list_projects).post(create_project))
        .route(
            "/projects/:id",
            get(get_project).put(update_project).delete(delete_project),
        )
        .route("/projects/:id/metadata", get(get_metadata).put(save_metadata))
        .route("/projects/:id/answers", get(get_answers).put(save_answers))
        .route("/projects/:id/initial-answers", post(save_initial_answers))
        .route("/projects/:id/prd", get(get_prd).put(save_prd))
        .route(
            "/projects/:id/prd-refined",
            get(get_refined_prd).put(save_refined_prd),
        )
        .route("/projects/:id/step", post(change_step))
        .route("/projects/:id/target", post(select_target))
        .route("/projects/:id/generation/begin", post(begin_generation))
}

async fn list_projects(State(state): State<ServerAppState>) -> ApiResult<Vec<Project>> {
    ok(commands::list_projects(&state.ctx).await?)
}

async fn create_project(State(state): State<ServerAppState>, body: Bytes) -> ApiResult<Project> {
    let request = parse_body(&body)?;
    ok(commands::create_project(&state.ctx, request).await?)
}

async fn get_project(
    State(state): State<ServerAppState>,
    Path(id): Path<String>,
) -> ApiResult<ProjectAggregate> {
    ok(commands::get_project(&state.ctx, &id).await?)
}

async fn update_project(
    State(state): State<ServerAppState>,
    Path(id): Path<String>,
    body: Bytes,
) -> ApiResult<Project> {
    let args: Value = parse_body(&body)?;
    let request = UpdateProjectRequest {
        name: get_opt_arg(&args, "name")?,
    };
    ok(commands::update_project(&state.ctx, &id, request).await?)
}

async fn delete_project(
    State(state): State<ServerAppState>,
    Path(id): Path<String>,
) -> ApiResult<Value> {
    commands::delete_project(&state.ctx, &id).await?;
    ok(Value::Null)
}

async fn get_metadata(
    State(state): State<ServerAppState>,
    Path(id): Path<String>,
) -> ApiResult<ProjectMetadata> {
    ok(commands::get_metadata(&state.ctx, &id).await?)
}

async fn save_metadata(
    State(state): State<ServerAppState>,
    Path(id): Path<String>,
    body: Bytes,
) -> ApiResult<ProjectMetadata> {
    let metadata = parse_body(&body)?;
    ok(commands::save_metadata(&state.ctx, &id, metadata).await?)
}

async fn get_answers(
    State(state): State<ServerAppState>,
    Path(id): Path<String>,
) -> ApiResult<ProjectAnswers> {
    ok(commands::get_answers(&state.ctx, &id).await?)
}

async fn save_answers(
    State(state): State<ServerAppState>,
    Path(id): Path<String>,
    body: Bytes,
) -> ApiResult<ProjectAnswers> {
    let request: InitialAnswersRequest = parse_body(&body)?;
    ok(commands::save_answers(&state.ctx, &id, request.initial_answers, request.questions).await?)
}

async fn save_initial_answers(
    State(state): State<ServerAppState>,
    Path(id): Path<String>,
    body: Bytes,
) -> ApiResult<ProjectAggregate> {
    let request = parse_body(&body)?;
    ok(commands::save_initial_answers(&state.ctx, &id, request).await?)
}

async fn get_prd(
    State(state): State<ServerAppState>,
    Path(id): Path<String>,
) -> ApiResult<TextDocument> {
    let content = commands::get_prd(&state.ctx, &id).await?;
    ok(TextDocument { content })
}

async fn save_prd(
    State(state): State<ServerAppState>,
    Path(id): Path<String>,
    body: Bytes,
) -> ApiResult<PrdDocument> {
    let args: Value = parse_body(&body)?;
    let content: String = get_arg(&args, "content")?;
    ok(commands::save_prd(&state.ctx, &id, content).await?)
}

async fn get_refined_prd(
    State(state): State<ServerAppState>,
    Path(id): Path<String>,
) -> ApiResult<TextDocument> {
    let content = commands::get_refined_prd(&state.ctx, &id).await?;
    ok(TextDocument { content })
}

async fn save_refined_prd(
    State(state): State<ServerAppState>,
    Path(id): Path<String>,
    body: Bytes,
) -> ApiResult<TextDocument> {
    let args: Value = parse_body(&body)?;
    let content: String = get_arg(&args, "content")?;
    let content = commands::save_refined_prd(&state.ctx, &id, content).await?;
    ok(TextDocument { content })
}

async fn change_step(
    State(state): State<ServerAppState>,
    Path(id): Path<String>,
    body: Bytes,
) -> ApiResult<Project> {
    let action: StepAction = parse_body(&body)?;
    ok(commands::change_step(&state.ctx, &id, action).await?)
}

async fn select_target(
    State(state): State<ServerAppState>,
    Path(id): Path<String>,
    body: Bytes,
) -> ApiResult<Project> {
    let args: Value = parse_body(&body)?;
    let target: Target = get_arg(&args, "target")?;
    ok(commands::select_target(&state.ctx, &id, target).await?)
}

async fn begin_generation(
    State(state): State<ServerAppState>,
    Path(id): Path<String>,
) -> ApiResult<Project> {
    ok(commands::begin_generation(&state.ctx, &id).await?)
}
