//! Common test utilities for control surface testing with mocks.
//!
//! This module provides a test fixture that builds the router in-process
//! with a mock ledger and a scripted worker pool, so every endpoint can be
//! exercised without the simulated latencies.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use rust_decimal_macros::dec;
use serde_json::Value;
use tower::ServiceExt;

use taskmill_core::testing::{MockExecutor, MockLedger, MockTaskSource};
use taskmill_core::{Authenticator, LedgerClient, Orchestrator};
use taskmill_server::state::AppState;

/// Re-export fixtures for test convenience
pub use taskmill_core::testing::fixtures;

/// Worker names in the fixture pool, in pool order.
pub const WORKERS: &[&str] = &["scribe", "analyst"];

/// Test fixture for control surface testing with mock dependencies.
pub struct TestFixture {
    /// The Axum router for testing
    pub router: Router,
    /// Mock ledger - inspect transfers, inject failures
    pub ledger: Arc<MockLedger>,
    /// Shared task source for every worker
    pub source: Arc<MockTaskSource>,
    /// Shared executor for every worker
    pub executor: Arc<MockExecutor>,
    /// The orchestrator, if the fixture has one
    pub orchestrator: Option<Arc<Orchestrator>>,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
    pub text: String,
}

impl TestFixture {
    /// Fixture with a ledger and an orchestrator that is not started.
    pub fn new() -> Self {
        Self::with_config(TestConfig::default())
    }

    pub fn with_config(test_config: TestConfig) -> Self {
        let config = fixtures::test_config();
        let authenticator: Arc<dyn Authenticator> = Arc::from(
            taskmill_core::create_authenticator(&config.auth).expect("Failed to create auth"),
        );

        let ledger = Arc::new(MockLedger::new());
        let source = Arc::new(MockTaskSource::repeating(1, dec!(0.5)));
        let executor = Arc::new(MockExecutor::new());

        let orchestrator = test_config.with_orchestrator.then(|| {
            let pool = fixtures::mock_pool(WORKERS, &source, &executor);
            Arc::new(Orchestrator::new(config.orchestrator.clone(), pool))
        });

        let ledger_client = test_config
            .with_ledger
            .then(|| Arc::clone(&ledger) as Arc<dyn LedgerClient>);

        let state = Arc::new(AppState::new(
            config,
            authenticator,
            ledger_client,
            orchestrator.clone(),
        ));

        let router = taskmill_server::api::create_router(state);

        Self {
            router,
            ledger,
            source,
            executor,
            orchestrator,
        }
    }

    pub fn orchestrator(&self) -> &Arc<Orchestrator> {
        self.orchestrator
            .as_ref()
            .expect("fixture was built without an orchestrator")
    }

    /// Poll the orchestrator until `predicate` holds or the timeout passes.
    pub async fn wait_for<F>(&self, timeout: Duration, predicate: F) -> bool
    where
        F: Fn(&taskmill_core::OrchestratorStats) -> bool,
    {
        let deadline = tokio::time::Instant::now() + timeout;
        while tokio::time::Instant::now() < deadline {
            if predicate(&self.orchestrator().stats().await) {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        false
    }

    /// Send a GET request to the test server.
    pub async fn get(&self, path: &str) -> TestResponse {
        self.request("GET", path, &[], None).await
    }

    /// Send a POST request with JSON body and no credential.
    pub async fn post(&self, path: &str, body: Value) -> TestResponse {
        self.request("POST", path, &[], Some(body.to_string())).await
    }

    /// Send a POST request with JSON body and the admin key.
    pub async fn post_admin(&self, path: &str, body: Value) -> TestResponse {
        self.request(
            "POST",
            path,
            &[("X-Admin-Key", fixtures::ADMIN_KEY)],
            Some(body.to_string()),
        )
        .await
    }

    /// Send a POST request with custom headers and raw body.
    pub async fn post_with_headers(
        &self,
        path: &str,
        headers: &[(&str, &str)],
        body: &str,
    ) -> TestResponse {
        self.request("POST", path, headers, Some(body.to_string()))
            .await
    }

    async fn request(
        &self,
        method: &str,
        path: &str,
        headers: &[(&str, &str)],
        body: Option<String>,
    ) -> TestResponse {
        let mut request_builder = Request::builder().method(method).uri(path);
        for (name, value) in headers {
            request_builder = request_builder.header(*name, *value);
        }

        let body = if let Some(raw) = body {
            request_builder = request_builder.header("Content-Type", "application/json");
            Body::from(raw)
        } else {
            Body::empty()
        };

        let request = request_builder.body(body).unwrap();

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();

        let text = String::from_utf8_lossy(&body_bytes).to_string();
        let body: Value = if body_bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body_bytes).unwrap_or(Value::Null)
        };

        TestResponse { status, body, text }
    }
}

/// Configuration for test fixture.
#[derive(Debug, Clone)]
pub struct TestConfig {
    pub with_ledger: bool,
    pub with_orchestrator: bool,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            with_ledger: true,
            with_orchestrator: true,
        }
    }
}

impl TestConfig {
    /// Nothing initialized: read endpoints should degrade.
    pub fn uninitialized() -> Self {
        Self {
            with_ledger: false,
            with_orchestrator: false,
        }
    }
}

/// Helper to assert a response has expected status.
#[macro_export]
macro_rules! assert_status {
    ($response:expr, $status:expr) => {
        assert_eq!(
            $response.status, $status,
            "Expected status {:?}, got {:?}. Body: {}",
            $status, $response.status, $response.text
        );
    };
}

/// Helper to assert a JSON path equals expected value.
#[macro_export]
macro_rules! assert_json_path {
    ($json:expr, $path:expr, $expected:expr) => {
        let actual = &$json[$path];
        assert_eq!(
            actual, &$expected,
            "Path '{}' expected {:?}, got {:?}",
            $path, $expected, actual
        );
    };
}
