//! End-to-end admin API exercise over real HTTP.

use serde_json::{json, Value};
use std::net::TcpListener as StdTcpListener;
use std::sync::Arc;
use strake_control::admin_api::AdminServer;
use strake_control::runtime::{Runtime, RuntimeOptions};
use tempfile::TempDir;
use tokio::net::TcpListener;
use tokio::sync::broadcast;

fn free_port() -> u16 {
    let listener = StdTcpListener::bind("127.0.0.1:0").expect("bind ephemeral port");
    let port = listener.local_addr().expect("local addr").port();
    drop(listener);
    port
}

/// Cold-started runtime plus a served admin API; returns the base URL.
async fn spawn_api(dir: &TempDir, token: Option<&str>) -> (Arc<Runtime>, String) {
    let runtime = Arc::new(Runtime::new(RuntimeOptions {
        config_path: dir.path().join("relay.json.0"),
        reset: false,
        print: false,
    }));
    runtime.start().await.expect("engine start");

    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind admin");
    let addr = listener.local_addr().expect("local addr");
    let server = AdminServer::new(addr, Arc::clone(&runtime), token.map(|t| t.to_string()));
    let (_shutdown_tx, shutdown_rx) = broadcast::channel(1);
    tokio::spawn(async move {
        // the sender leaks with the test, which is fine: the task dies with
        // the runtime
        let _keep = _shutdown_tx;
        let _ = server.serve(listener, shutdown_rx).await;
    });
    (runtime, format!("http://{addr}"))
}

#[tokio::test]
async fn healthz_answers_get() {
    let dir = tempfile::tempdir().unwrap();
    let (_runtime, base) = spawn_api(&dir, None).await;
    let body: Value = reqwest::get(format!("{base}/healthz"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["success"], json!(true));
    assert!(body["data"].is_string());
}

#[tokio::test]
async fn non_post_requests_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let (_runtime, base) = spawn_api(&dir, None).await;
    let body: Value = reqwest::get(format!("{base}/inbound.list"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["errcode"], json!("invalid_method"));
}

#[tokio::test]
async fn unknown_actions_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let (_runtime, base) = spawn_api(&dir, None).await;
    let client = reqwest::Client::new();
    let body: Value = client
        .post(format!("{base}/no.such.action"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["errcode"], json!("invalid_action"));
}

#[tokio::test]
async fn the_action_query_parameter_overrides_the_path() {
    let dir = tempfile::tempdir().unwrap();
    let (_runtime, base) = spawn_api(&dir, None).await;
    let client = reqwest::Client::new();
    let body: Value = client
        .post(format!("{base}/?action=outbound.list"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["data"], json!([]));
}

#[tokio::test]
async fn token_gate_rejects_bad_credentials() {
    let dir = tempfile::tempdir().unwrap();
    let (_runtime, base) = spawn_api(&dir, Some("secret")).await;
    let client = reqwest::Client::new();

    let body: Value = client
        .post(format!("{base}/outbound.list"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["errcode"], json!("invalid_token"));

    let body: Value = client
        .post(format!("{base}/outbound.list"))
        .header("Authorization", "Token wrong")
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["errcode"], json!("invalid_token"));

    let body: Value = client
        .post(format!("{base}/outbound.list"))
        .header("Authorization", "Token secret")
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["success"], json!(true));
}

#[tokio::test]
async fn entities_can_be_managed_over_http() {
    let dir = tempfile::tempdir().unwrap();
    let (_runtime, base) = spawn_api(&dir, None).await;
    let client = reqwest::Client::new();
    let port = free_port();

    // add an inbound
    let body: Value = client
        .post(format!("{base}/inbound.add"))
        .json(&json!({
            "tag": "edge",
            "protocol": "tcp",
            "listen": "127.0.0.1",
            "port": port
        }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["success"], json!(true), "unexpected reply: {body}");

    // the duplicate is rejected with a typed code
    let body: Value = client
        .post(format!("{base}/inbound.add"))
        .json(&json!({
            "tag": "edge",
            "protocol": "tcp",
            "listen": "127.0.0.1",
            "port": free_port()
        }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["errcode"], json!("duplicate_tag"));

    // it shows up in the live listing
    let body: Value = client
        .post(format!("{base}/inbound.list"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["data"], json!(["edge"]));

    // removal requires a tag
    let body: Value = client
        .post(format!("{base}/inbound.remove"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["errcode"], json!("invalid_tag"));

    let body: Value = client
        .post(format!("{base}/inbound.remove?tag=edge"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["success"], json!(true));

    // save writes the (now empty again) model to disk
    let body: Value = client
        .post(format!("{base}/config.save"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["success"], json!(true));
    assert!(dir.path().join("relay.json.0").exists());
}

#[tokio::test]
async fn bound_pairs_report_aggregate_failures() {
    let dir = tempfile::tempdir().unwrap();
    let (_runtime, base) = spawn_api(&dir, None).await;
    let client = reqwest::Client::new();

    let body: Value = client
        .post(format!("{base}/pair.add"))
        .json(&json!({
            "inbound": {"tag": "a", "protocol": "tcp", "port": free_port()},
            "outbound": {"tag": "b", "protocol": "blackhole"}
        }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["errcode"], json!("tag_mismatch"));

    let body: Value = client
        .post(format!("{base}/pair.add"))
        .json(&json!({
            "inbound": {"tag": "p", "protocol": "tcp", "listen": "127.0.0.1", "port": free_port()},
            "outbound": {"tag": "p", "protocol": "blackhole"}
        }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["success"], json!(true), "unexpected reply: {body}");

    // removing it again tears down all three legs
    let body: Value = client
        .post(format!("{base}/pair.remove?tag=p"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["success"], json!(true));
}

#[tokio::test]
async fn lifecycle_actions_are_informational_when_redundant() {
    let dir = tempfile::tempdir().unwrap();
    let (_runtime, base) = spawn_api(&dir, None).await;
    let client = reqwest::Client::new();

    let body: Value = client
        .post(format!("{base}/engine.start"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["message"], json!("engine is already running"));

    let body: Value = client
        .post(format!("{base}/engine.stop"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["success"], json!(true));

    let body: Value = client
        .post(format!("{base}/engine.stop"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["message"], json!("engine is not running"));

    let body: Value = client
        .post(format!("{base}/engine.restart?reload=true"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["success"], json!(true), "unexpected reply: {body}");
}

#[tokio::test]
async fn system_stats_is_a_stub() {
    let dir = tempfile::tempdir().unwrap();
    let (_runtime, base) = spawn_api(&dir, None).await;
    let client = reqwest::Client::new();
    let body: Value = client
        .post(format!("{base}/stats.system"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["data"], json!({}));
}
