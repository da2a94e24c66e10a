use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Response,
    Json,
};
use std::sync::Arc;
use taskmill_core::{OrchestratorError, WorkerSnapshot};

use super::handlers::{error_response, not_initialized};
use crate::state::AppState;

pub async fn activate(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<Json<WorkerSnapshot>, Response> {
    set_active(&state, &name, true).await
}

pub async fn deactivate(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<Json<WorkerSnapshot>, Response> {
    set_active(&state, &name, false).await
}

async fn set_active(
    state: &AppState,
    name: &str,
    active: bool,
) -> Result<Json<WorkerSnapshot>, Response> {
    let orch = state.orchestrator().ok_or_else(not_initialized)?;

    match orch.set_worker_active(name, active).await {
        Ok(snapshot) => Ok(Json(snapshot)),
        Err(e @ OrchestratorError::WorkerNotFound(_)) => {
            Err(error_response(StatusCode::NOT_FOUND, e.to_string()))
        }
        Err(e) => Err(error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            e.to_string(),
        )),
    }
}
