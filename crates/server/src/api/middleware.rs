//! Authentication and metrics middleware for API routes.

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use std::collections::HashMap;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::time::Instant;
use taskmill_core::{AuthError, AuthRequest};
use tracing::warn;

use super::handlers::ErrorResponse;
use crate::metrics::{
    normalize_path, AUTH_FAILURES_TOTAL, HTTP_REQUESTS_IN_FLIGHT, HTTP_REQUESTS_TOTAL,
    HTTP_REQUEST_DURATION,
};
use crate::state::AppState;

/// Metrics middleware that tracks HTTP request duration and counts.
///
/// This middleware records:
/// - Request duration (histogram)
/// - Request count (counter)
/// - Requests in flight (gauge)
pub async fn metrics_middleware(request: Request<Body>, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().to_string();
    let path = normalize_path(request.uri().path());

    HTTP_REQUESTS_IN_FLIGHT.inc();

    let response = next.run(request).await;

    HTTP_REQUESTS_IN_FLIGHT.dec();

    let duration = start.elapsed().as_secs_f64();
    let status = response.status().as_u16().to_string();

    HTTP_REQUEST_DURATION
        .with_label_values(&[&method, &path, &status])
        .observe(duration);
    HTTP_REQUESTS_TOTAL
        .with_label_values(&[&method, &path, &status])
        .inc();

    response
}

/// Build an [`AuthRequest`] from the request headers and peer address.
pub fn auth_request_from<B>(request: &Request<B>) -> AuthRequest {
    let headers: HashMap<String, String> = request
        .headers()
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|v| (name.as_str().to_lowercase(), v.to_string()))
        })
        .collect();

    // Get source IP (default to localhost if not available)
    let source_ip = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip())
        .unwrap_or(IpAddr::V4(Ipv4Addr::LOCALHOST));

    AuthRequest { headers, source_ip }
}

/// Count an authentication failure and turn it into a response.
pub fn auth_failure_response(error: &AuthError) -> Response {
    AUTH_FAILURES_TOTAL
        .with_label_values(&[error.reason()])
        .inc();

    let status = match error {
        AuthError::ConfigurationError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        _ => StatusCode::UNAUTHORIZED,
    };
    (
        status,
        Json(ErrorResponse {
            error: "unauthorized".to_string(),
        }),
    )
        .into_response()
}

/// Rejects privileged requests that do not carry the admin credential.
///
/// Runs before the handler, so a rejected request never reaches the
/// orchestrator or the worker pool.
pub async fn admin_auth_middleware(
    State(state): State<Arc<AppState>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let auth_request = auth_request_from(&request);

    match state.authenticator().authenticate(&auth_request).await {
        Ok(identity) => {
            let mut request = request;
            request.extensions_mut().insert(identity);
            next.run(request).await
        }
        Err(e) => {
            warn!(
                path = %request.uri().path(),
                source_ip = %auth_request.source_ip,
                "Admin request rejected: {}",
                e
            );
            auth_failure_response(&e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{middleware, routing::post, Router};
    use taskmill_core::testing::fixtures::{test_config, ADMIN_KEY};
    use taskmill_core::{create_authenticator, Authenticator};
    use tower::ServiceExt;

    async fn dummy_handler() -> &'static str {
        "OK"
    }

    fn test_app() -> Router {
        let config = test_config();
        let authenticator: Arc<dyn Authenticator> =
            Arc::from(create_authenticator(&config.auth).unwrap());
        let state = Arc::new(AppState::new(config, authenticator, None, None));

        Router::new()
            .route("/admin", post(dummy_handler))
            .layer(middleware::from_fn_with_state(
                state.clone(),
                admin_auth_middleware,
            ))
            .with_state(state)
    }

    fn admin_post(header: Option<(&str, &str)>) -> Request<Body> {
        let mut builder = Request::builder().method("POST").uri("/admin");
        if let Some((name, value)) = header {
            builder = builder.header(name, value);
        }
        builder.body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_admin_key_header_allows() {
        let response = test_app()
            .oneshot(admin_post(Some(("X-Admin-Key", ADMIN_KEY))))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_bearer_allows() {
        let bearer = format!("Bearer {ADMIN_KEY}");
        let response = test_app()
            .oneshot(admin_post(Some(("Authorization", &bearer))))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_wrong_key_rejected() {
        let response = test_app()
            .oneshot(admin_post(Some(("X-Admin-Key", "guess"))))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_missing_key_rejected() {
        let response = test_app().oneshot(admin_post(None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_auth_request_lowercases_headers() {
        let request = Request::builder()
            .header("X-Admin-Key", "abc")
            .body(())
            .unwrap();
        let auth = auth_request_from(&request);
        assert_eq!(auth.header("x-admin-key"), Some("abc"));
        assert_eq!(auth.source_ip, IpAddr::V4(Ipv4Addr::LOCALHOST));
    }
}
