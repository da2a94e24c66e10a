use std::io::Write;
use std::net::TcpListener;
use std::time::Duration;

use reqwest::Client;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::json;
use tempfile::NamedTempFile;
use tokio::time::{sleep, timeout};

const ADMIN_KEY: &str = "startup-test-key";

/// Find an available port
fn get_available_port() -> u16 {
    TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port()
}

/// Create a minimal valid config with fast simulated latencies
fn minimal_config(port: u16) -> String {
    format!(
        r#"
[auth]
admin_key = "{ADMIN_KEY}"

[server]
host = "127.0.0.1"
port = {port}

[orchestrator]
enabled = false
cycle_interval_ms = 50
error_backoff_ms = 50

[ledger]
confirmation_delay_ms = 10

[[workers]]
name = "solo"
capabilities = ["writing"]
latency_ms = 0
"#
    )
}

fn write_config(content: &str) -> NamedTempFile {
    let mut temp_file = NamedTempFile::new().unwrap();
    temp_file.write_all(content.as_bytes()).unwrap();
    temp_file.flush().unwrap();
    temp_file
}

/// Spawn the server and return a handle
async fn spawn_server(config_path: &std::path::Path) -> tokio::process::Child {
    tokio::process::Command::new(env!("CARGO_BIN_EXE_taskmill"))
        .env("TASKMILL_CONFIG", config_path)
        .env("RUST_LOG", "error") // Quiet logs during tests
        .kill_on_drop(true)
        .spawn()
        .expect("Failed to spawn server")
}

/// Wait for server to be ready
async fn wait_for_server(port: u16, max_attempts: u32) -> bool {
    let client = Client::new();
    for _ in 0..max_attempts {
        if client
            .get(format!("http://127.0.0.1:{}/api/v1/health", port))
            .send()
            .await
            .is_ok()
        {
            return true;
        }
        sleep(Duration::from_millis(50)).await;
    }
    false
}

async fn run_exits_with_error(config_path: &std::path::Path) -> bool {
    let result = timeout(
        Duration::from_secs(5),
        tokio::process::Command::new(env!("CARGO_BIN_EXE_taskmill"))
            .env("TASKMILL_CONFIG", config_path)
            .env("RUST_LOG", "error")
            .output(),
    )
    .await
    .expect("Command timed out")
    .expect("Failed to execute command");

    !result.status.success()
}

#[tokio::test]
async fn test_health_endpoint() {
    let port = get_available_port();
    let config = write_config(&minimal_config(port));
    let mut server = spawn_server(config.path()).await;

    assert!(
        wait_for_server(port, 40).await,
        "Server did not start in time"
    );

    let client = Client::new();
    let response = client
        .get(format!("http://127.0.0.1:{}/api/v1/health", port))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let json: serde_json::Value = response.json().await.expect("Failed to parse JSON");
    assert_eq!(json["status"], "ok");
    assert_eq!(json["wallet_ready"], true);
    assert_eq!(json["orchestrator_running"], false);

    // Cleanup
    server.kill().await.ok();
}

#[tokio::test]
async fn test_config_endpoint_returns_sanitized() {
    let port = get_available_port();
    let config = write_config(&minimal_config(port));
    let mut server = spawn_server(config.path()).await;

    assert!(
        wait_for_server(port, 40).await,
        "Server did not start in time"
    );

    let client = Client::new();
    let response = client
        .get(format!("http://127.0.0.1:{}/api/v1/config", port))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let text = response.text().await.expect("Failed to read body");
    assert!(!text.contains(ADMIN_KEY));

    let json: serde_json::Value = serde_json::from_str(&text).expect("Failed to parse JSON");
    assert_eq!(json["auth"]["admin_key_configured"], true);
    assert_eq!(json["server"]["port"], port);
    assert_eq!(json["workers"][0]["name"], "solo");

    server.kill().await.ok();
}

#[tokio::test]
async fn test_payout_against_simulated_ledger() {
    let port = get_available_port();
    let config = write_config(&minimal_config(port));
    let mut server = spawn_server(config.path()).await;

    assert!(
        wait_for_server(port, 40).await,
        "Server did not start in time"
    );

    let client = Client::new();
    let base = format!("http://127.0.0.1:{}/api/v1", port);

    let response = client
        .post(format!("{base}/payout"))
        .header("X-Admin-Key", ADMIN_KEY)
        .json(&json!({
            "to_address": "0x3333333333333333333333333333333333333333",
            "amount": "10"
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 200);

    let receipt: serde_json::Value = response.json().await.unwrap();
    let net: Decimal = receipt["net_amount"].as_str().unwrap().parse().unwrap();
    assert_eq!(net, dec!(9.8));
    assert!(receipt["tx_id"].as_str().unwrap().starts_with("0x"));

    let wallet: serde_json::Value = client
        .get(format!("{base}/wallet"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let balance: Decimal = wallet["balance"].as_str().unwrap().parse().unwrap();
    assert_eq!(balance, dec!(990.2));

    server.kill().await.ok();
}

#[tokio::test]
async fn test_orchestrator_started_via_api() {
    let port = get_available_port();
    let config = write_config(&minimal_config(port));
    let mut server = spawn_server(config.path()).await;

    assert!(
        wait_for_server(port, 40).await,
        "Server did not start in time"
    );

    let client = Client::new();
    let base = format!("http://127.0.0.1:{}/api/v1", port);

    let response = client
        .post(format!("{base}/orchestrator/start"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 401);

    let response = client
        .post(format!("{base}/orchestrator/start"))
        .header("Authorization", format!("Bearer {ADMIN_KEY}"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    let mut cycles = 0;
    for _ in 0..40 {
        let stats: serde_json::Value = client
            .get(format!("{base}/stats"))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        cycles = stats["cycle"]["cycle_count"].as_u64().unwrap();
        if cycles >= 2 {
            break;
        }
        sleep(Duration::from_millis(50)).await;
    }
    assert!(cycles >= 2, "loop did not cycle, count = {cycles}");

    server.kill().await.ok();
}

#[tokio::test]
async fn test_missing_config_file_exits_with_error() {
    assert!(run_exits_with_error(std::path::Path::new("/nonexistent/config.toml")).await);
}

#[tokio::test]
async fn test_missing_auth_section_exits_with_error() {
    let config = write_config(
        r#"
[server]
port = 8080
"#,
    );
    assert!(run_exits_with_error(config.path()).await);
}

#[tokio::test]
async fn test_blank_admin_key_exits_with_error() {
    let config = write_config(
        r#"
[auth]
admin_key = "  "
"#,
    );
    assert!(run_exits_with_error(config.path()).await);
}
