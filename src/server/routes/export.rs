//! Export routing
//!
//! Archive downloads, the target catalogue and the model connectivity check.

use crate::commands::{self, LlmTestResult};
use crate::export::ExportArchive;
use crate::models::{Target, TargetInfo};
use crate::server::response::{ok, ApiError, ApiResult};
use crate::server::ServerAppState;
use axum::{
    extract::{Path, State},
    http::{header, HeaderValue},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};

pub fn router() -> Router<ServerAppState> {
    Router::new()
        .route("/projects/:id/download-cursor", post(download_cursor))
        .route("/projects/:id/download-nora", post(download_nora))
        .route("/projects/:id/download/:target", post(download_target))
        .route("/targets", get(list_targets))
        .route("/llm/test", post(test_llm))
}

fn attachment(archive: ExportArchive) -> Response {
    let disposition = format!("attachment; filename=\"{}\"", archive.filename);
    let mut response = archive.bytes.into_response();
    let headers = response.headers_mut();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/zip"));
    if let Ok(value) = HeaderValue::from_str(&disposition) {
        headers.insert(header::CONTENT_DISPOSITION, value);
    }
    response
}

async fn download(state: &ServerAppState, id: &str, target: Target) -> Result<Response, ApiError> {
    let archive = commands::package_for_target(&state.ctx, id, target).await?;
    Ok(attachment(archive))
}

async fn download_cursor(
    State(state): State<ServerAppState>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    download(&state, &id, Target::Cursor).await
}

async fn download_nora(
    State(state): State<ServerAppState>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    download(&state, &id, Target::Nora).await
}

async fn download_target(
    State(state): State<ServerAppState>,
    Path((id, target)): Path<(String, String)>,
) -> Result<Response, ApiError> {
    let target: Target = target.parse()?;
    download(&state, &id, target).await
}

async fn list_targets() -> ApiResult<Vec<TargetInfo>> {
    ok(commands::list_targets())
}

async fn test_llm(State(state): State<ServerAppState>) -> ApiResult<LlmTestResult> {
    ok(commands::test_llm_connection(&state.ctx).await?)
}
