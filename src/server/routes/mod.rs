//! REST routing modules
//!
//! Routes are organized by domain:
//! - projects: project records, answers, PRD documents and step navigation
//! - refinements: refinement questions, answers and processing
//! - docs: per-target documentation generation
//! - export: archive downloads, target listing and the model connectivity check
//!
//! Everything here is nested under `/api`.

pub mod docs;
pub mod export;
pub mod projects;
pub mod refinements;

use super::ServerAppState;
use axum::Router;

/// Build the `/api` router
pub fn api_router() -> Router<ServerAppState> {
    Router::new()
        .merge(projects::router())
        .merge(refinements::router())
        .merge(docs::router())
        .merge(export::router())
}
