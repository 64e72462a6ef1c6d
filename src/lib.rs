// Clippy allows for reasonable defaults
#![allow(clippy::new_without_default)] // Default not always appropriate for stateful types
#![allow(clippy::derivable_impls)] // Explicit Default impls can be clearer
#![allow(clippy::redundant_closure)] // |x| f(x) can be clearer than f

// Module declarations
pub mod commands;
pub mod config;
pub mod error;
pub mod export;
pub mod file_storage;
pub mod llm;
pub mod models;
pub mod prd_workflow;
pub mod refinement;
pub mod shutdown;
pub mod templates;

// Server module (HTTP API)
pub mod server;

pub use error::{AppError, AppResult};
pub use models::*;
