//! Documentation generation routing
//!
//! The target is given in the body for POST/PUT and as `?target=` for GET
//! (`ide` is accepted as an alias in both places).

use crate::commands::{self, GenerateDocRequest, UpdateDocRequest};
use crate::error::AppError;
use crate::models::{DocGenerationResult, GeneratedDocFile, Target};
use crate::server::response::{ok, parse_body, ApiError, ApiResult};
use crate::server::ServerAppState;
use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    routing::get,
    Router,
};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct TargetQuery {
    target: Option<Target>,
    ide: Option<Target>,
}

impl TargetQuery {
    fn require(self) -> Result<Target, ApiError> {
        self.target
            .or(self.ide)
            .ok_or_else(|| ApiError::from(AppError::validation("Missing query parameter: target")))
    }
}

pub fn router() -> Router<ServerAppState> {
    Router::new()
        .route("/projects/:id/generate-docs", get(list_doc_files))
        .route(
            "/projects/:id/generate-docs/:filename",
            get(get_doc_file).post(generate_doc_file).put(update_doc_file),
        )
}

async fn list_doc_files(
    State(state): State<ServerAppState>,
    Path(id): Path<String>,
    Query(query): Query<TargetQuery>,
) -> ApiResult<Vec<GeneratedDocFile>> {
    let target = query.require()?;
    ok(commands::list_doc_files(&state.ctx, &id, target).await?)
}

async fn generate_doc_file(
    State(state): State<ServerAppState>,
    Path((id, filename)): Path<(String, String)>,
    body: Bytes,
) -> ApiResult<DocGenerationResult> {
    let request: GenerateDocRequest = parse_body(&body)?;
    ok(commands::generate_doc_file(&state.ctx, &id, &filename, request.target).await?)
}

async fn get_doc_file(
    State(state): State<ServerAppState>,
    Path((id, filename)): Path<(String, String)>,
    Query(query): Query<TargetQuery>,
) -> ApiResult<GeneratedDocFile> {
    let target = query.require()?;
    ok(commands::get_doc_file(&state.ctx, &id, &filename, target).await?)
}

async fn update_doc_file(
    State(state): State<ServerAppState>,
    Path((id, filename)): Path<(String, String)>,
    body: Bytes,
) -> ApiResult<GeneratedDocFile> {
    let request: UpdateDocRequest = parse_body(&body)?;
    ok(commands::update_doc_file(&state.ctx, &id, &filename, request).await?)
}
