// HTTP API tests against the axum router, without binding a socket

mod common;

use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use prd_rails_lib::server::{build_router, ServerAppState};
use prd_rails_lib::shutdown::ShutdownState;
use serde_json::{json, Value};
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

struct TestApp {
    _dir: TempDir,
    router: Router,
    model: Arc<common::MockModel>,
}

fn app() -> TestApp {
    let (dir, ctx, model) = common::context();
    let state = ServerAppState::new(ctx, ShutdownState::new());
    TestApp {
        _dir: dir,
        router: build_router(state, &[]),
        model,
    }
}

impl TestApp {
    async fn send(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Vec<u8>, Option<String>) {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(value) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(value.to_string())
            }
            None => Body::empty(),
        };

        let response = self
            .router
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let disposition = response
            .headers()
            .get(header::CONTENT_DISPOSITION)
            .map(|v| v.to_str().unwrap().to_string());
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, bytes.to_vec(), disposition)
    }

    async fn json(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let (status, bytes, _) = self.send(method, uri, body).await;
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    async fn create_project(&self) -> String {
        let (status, body) = self
            .json(Method::POST, "/api/projects", Some(json!({"name": "Acme"})))
            .await;
        assert_eq!(status, StatusCode::OK);
        body["data"]["id"].as_str().unwrap().to_string()
    }
}

#[tokio::test]
async fn test_health_and_version() {
    let app = app();
    let (status, body, _) = app.send(Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"OK");

    let (status, body) = app.json(Method::GET, "/api/version", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn test_project_crud_and_error_envelope() {
    let app = app();
    let id = app.create_project().await;

    let (status, body) = app.json(Method::GET, "/api/projects", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"][0]["id"], id.as_str());

    let (status, body) = app
        .json(Method::PUT, &format!("/api/projects/{}", id), Some(json!({"name": "Acme Inc"})))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "Acme Inc");

    let (status, body) = app.json(Method::GET, "/api/projects/project-missing", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
    assert!(body["error"].as_str().unwrap().contains("project-missing"));

    let (status, body) = app
        .json(Method::POST, "/api/projects", Some(json!({"name": "  "})))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);

    let (status, _) = app.json(Method::DELETE, &format!("/api/projects/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = app.json(Method::GET, &format!("/api/projects/{}", id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_refinement_flow_over_http() {
    let app = app();
    let id = app.create_project().await;

    let (status, body) = app
        .json(
            Method::POST,
            &format!("/api/projects/{}/initial-answers", id),
            Some(json!({"initialAnswers": {"projectName": "Acme", "projectType": "web-app"}})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["project"]["currentStep"], "prd-preview");

    app.model.reply(common::ten_questions());
    let (status, body) = app
        .json(Method::POST, &format!("/api/projects/{}/refinements/generate", id), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["questions"].as_array().unwrap().len(), 10);

    let (status, _) = app
        .json(Method::POST, &format!("/api/projects/{}/refinements/process", id), None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let answers: Vec<Value> = (1..=10)
        .map(|i| json!({"questionId": i, "answer": "", "skipped": true, "timestamp": "2026-01-01T00:00:00Z"}))
        .collect();
    let (status, _) = app
        .json(
            Method::PUT,
            &format!("/api/projects/{}/refinements", id),
            Some(json!({ "answers": answers })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = app
        .json(Method::GET, &format!("/api/projects/{}/refinements/status", id), None)
        .await;
    assert_eq!(body["data"]["isComplete"], true);

    app.model.reply("REFINED");
    let (status, body) = app
        .json(Method::POST, &format!("/api/projects/{}/refinements/process", id), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["content"], "REFINED");

    let (status, bytes, disposition) = app
        .send(Method::POST, &format!("/api/projects/{}/download-cursor", id), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(bytes.starts_with(b"PK"));
    assert_eq!(
        disposition.unwrap(),
        format!("attachment; filename=\"cursor-project-{}.zip\"", id)
    );
}

#[tokio::test]
async fn test_doc_generation_routes() {
    let app = app();
    let id = app.create_project().await;

    let (status, body) = app
        .json(
            Method::POST,
            &format!("/api/projects/{}/generate-docs/README.md", id),
            Some(json!({"target": "nora"})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);

    let (status, _) = app
        .json(
            Method::POST,
            &format!("/api/projects/{}/generate-docs/Implementation.md", id),
            Some(json!({"ide": "nora"})),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(app.model.calls(), 0);

    let (status, body) = app
        .json(Method::GET, &format!("/api/projects/{}/generate-docs?target=nora", id), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 4);
    assert_eq!(body["data"][0]["status"], "not-generated");

    let (status, _) = app
        .json(Method::GET, &format!("/api/projects/{}/generate-docs", id), None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_model_failure_maps_to_bad_gateway() {
    let app = app();
    let (status, body) = app.json(Method::POST, "/api/llm/test", None).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["success"], false);

    app.model.reply("Hello, PRD Rails is working!");
    let (status, body) = app.json(Method::POST, "/api/llm/test", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["model"], "gpt-4o");
}
