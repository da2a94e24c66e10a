use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::sync::Arc;
use taskmill_core::{OrchestratorStats, SanitizedConfig, WalletInfo};
use tracing::warn;

use crate::metrics::{collect_dynamic_metrics, encode_metrics};
use crate::state::AppState;

/// Error body shared by every endpoint
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

/// Shorthand for a JSON error response.
pub fn error_response(status: StatusCode, error: impl Into<String>) -> Response {
    (status, Json(ErrorResponse::new(error))).into_response()
}

pub(crate) fn not_initialized() -> Response {
    error_response(StatusCode::SERVICE_UNAVAILABLE, "not initialized")
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub wallet_ready: bool,
    pub orchestrator_running: bool,
}

pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let wallet_ready = match state.ledger() {
        Some(ledger) => ledger.is_ready().await,
        None => false,
    };
    let orchestrator_running = state
        .orchestrator()
        .map(|orch| orch.is_running())
        .unwrap_or(false);

    Json(HealthResponse {
        status: "ok".to_string(),
        wallet_ready,
        orchestrator_running,
    })
}

pub async fn get_config(State(state): State<Arc<AppState>>) -> Json<SanitizedConfig> {
    Json(state.sanitized_config())
}

/// Cycle statistics and every worker's counters.
pub async fn get_stats(
    State(state): State<Arc<AppState>>,
) -> Result<Json<OrchestratorStats>, Response> {
    let orchestrator = state.orchestrator().ok_or_else(not_initialized)?;
    Ok(Json(orchestrator.stats().await))
}

pub async fn get_wallet(State(state): State<Arc<AppState>>) -> Result<Json<WalletInfo>, Response> {
    let ledger = state.ledger().ok_or_else(not_initialized)?;
    if !ledger.is_ready().await {
        return Err(not_initialized());
    }

    match ledger.balance().await {
        Ok(balance) => Ok(Json(WalletInfo {
            address: ledger.address(),
            balance,
            ready: true,
        })),
        Err(e) => {
            warn!("Balance query failed: {}", e);
            Err(error_response(StatusCode::BAD_GATEWAY, e.to_string()))
        }
    }
}

/// Prometheus scrape endpoint.
pub async fn get_metrics(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    collect_dynamic_metrics(&state).await;
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        encode_metrics(),
    )
}
