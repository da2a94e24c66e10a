use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use super::middleware::{admin_auth_middleware, metrics_middleware};
use super::{handlers, orchestrator, payout, workers};
use crate::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    // Privileged commands: rejected before the handler without the admin key
    let admin_routes = Router::new()
        .route("/orchestrator/stop", post(orchestrator::stop))
        .route("/orchestrator/start", post(orchestrator::start))
        .route("/workers/{name}/activate", post(workers::activate))
        .route("/workers/{name}/deactivate", post(workers::deactivate))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            admin_auth_middleware,
        ));

    // API routes
    let api_routes = Router::new()
        // Health and config
        .route("/health", get(handlers::health))
        .route("/config", get(handlers::get_config))
        // Read-only views
        .route("/stats", get(handlers::get_stats))
        .route("/wallet", get(handlers::get_wallet))
        // Payout checks the credential itself, ahead of body parsing
        .route("/payout", post(payout::submit_payout))
        .merge(admin_routes);

    Router::new()
        .nest("/api/v1", api_routes)
        .route("/metrics", get(handlers::get_metrics))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(middleware::from_fn(metrics_middleware)),
        )
}
