//! Server application state shared across handlers

use crate::commands::ServiceContext;
use crate::shutdown::ShutdownState;
use std::sync::Arc;

/// Shared state for the server
#[derive(Clone)]
pub struct ServerAppState {
    /// Store, model client and prompts used by every command
    pub ctx: Arc<ServiceContext>,

    /// Shutdown state
    pub shutdown_state: ShutdownState,
}

impl ServerAppState {
    pub fn new(ctx: ServiceContext, shutdown_state: ShutdownState) -> Self {
        Self {
            ctx: Arc::new(ctx),
            shutdown_state,
        }
    }
}
