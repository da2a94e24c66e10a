//! Payout endpoint.

use axum::{
    body::{to_bytes, Body},
    extract::State,
    http::{Request, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::sync::Arc;
use taskmill_core::{PayoutError, PayoutFailure, ValidatedPayout};

use super::handlers::{error_response, not_initialized};
use super::middleware::{auth_failure_response, auth_request_from};
use crate::state::AppState;

/// Payout bodies are two fields; anything larger is rejected.
const MAX_BODY_BYTES: usize = 16 * 1024;

/// Submit a payout.
///
/// Takes the raw request so the credential is checked before the body is
/// parsed. The guard owns that ordering.
pub async fn submit_payout(
    State(state): State<Arc<AppState>>,
    request: Request<Body>,
) -> Response {
    let auth_request = auth_request_from(&request);

    let Some(guard) = state.payout_guard() else {
        // Still refuse unauthenticated callers before admitting the
        // wallet is missing.
        if let Err(e) = state.authenticator().authenticate(&auth_request).await {
            return auth_failure_response(&e);
        }
        return not_initialized();
    };

    let body = match to_bytes(request.into_body(), MAX_BODY_BYTES).await {
        Ok(body) => body,
        Err(e) => {
            return error_response(StatusCode::BAD_REQUEST, format!("unreadable body: {}", e))
        }
    };

    match guard.submit_with_breakdown(&auth_request, &body).await {
        Ok(receipt) => (StatusCode::OK, Json(receipt)).into_response(),
        Err(failure) => payout_error_response(failure),
    }
}

/// Error body for payouts that passed validation, so the caller still sees
/// the amount, fee and net that were attempted.
#[derive(Debug, Serialize)]
struct PayoutFailureResponse {
    error: String,
    #[serde(flatten)]
    payout: Option<ValidatedPayout>,
}

fn payout_failure(status: StatusCode, error: String, payout: Option<ValidatedPayout>) -> Response {
    (status, Json(PayoutFailureResponse { error, payout })).into_response()
}

fn payout_error_response(failure: PayoutFailure) -> Response {
    let PayoutFailure { error, payout } = failure;
    match error {
        PayoutError::Unauthorized(e) => auth_failure_response(&e),
        PayoutError::MalformedRequest(_)
        | PayoutError::MissingField(_)
        | PayoutError::InvalidAmount(_)
        | PayoutError::InvalidAddress(_) => {
            error_response(StatusCode::BAD_REQUEST, error.to_string())
        }
        PayoutError::LedgerNotReady => {
            payout_failure(StatusCode::SERVICE_UNAVAILABLE, error.to_string(), payout)
        }
        PayoutError::Ledger(e) => payout_failure(StatusCode::BAD_GATEWAY, e.to_string(), payout),
    }
}
