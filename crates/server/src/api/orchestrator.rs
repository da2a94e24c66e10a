//! Orchestrator control handlers.

use axum::{extract::State, response::Response, Json};
use serde::Serialize;
use std::sync::Arc;
use taskmill_core::OrchestratorStatus;
use tracing::{info, warn};

use super::handlers::not_initialized;
use crate::state::AppState;

/// Result of a start/stop command
#[derive(Debug, Serialize)]
pub struct ControlResponse {
    pub message: String,
    /// False when the loop was already in the requested state.
    pub changed: bool,
    pub status: OrchestratorStatus,
}

/// Emergency stop. The current step finishes, nothing new starts.
pub async fn stop(State(state): State<Arc<AppState>>) -> Result<Json<ControlResponse>, Response> {
    let orch = state.orchestrator().ok_or_else(not_initialized)?;

    let changed = orch.stop();
    if changed {
        warn!("Emergency stop requested");
    }

    Ok(Json(ControlResponse {
        message: if changed {
            "Orchestrator stopping".to_string()
        } else {
            "Orchestrator already stopped".to_string()
        },
        changed,
        status: orch.status().await,
    }))
}

pub async fn start(State(state): State<Arc<AppState>>) -> Result<Json<ControlResponse>, Response> {
    let orch = state.orchestrator().ok_or_else(not_initialized)?;

    let changed = orch.start().await;
    if changed {
        info!("Orchestrator resumed via API");
    }

    Ok(Json(ControlResponse {
        message: if changed {
            "Orchestrator started".to_string()
        } else {
            "Orchestrator already running".to_string()
        },
        changed,
        status: orch.status().await,
    }))
}
