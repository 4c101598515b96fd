//! End-to-end HTTP tests against a spawned server.

mod common;

use common::harness::{TestServerConfig, spawn_test_server};
use common::http_client::{TestClient, report_body};

#[tokio::test]
async fn test_health_endpoint_returns_ok() {
    let server = spawn_test_server(TestServerConfig::default())
        .await
        .expect("Server should start");

    let client = TestClient::new(server.url());
    let health = client.health().await.expect("Health check should succeed");

    assert_eq!(health.status, "ok");
}

#[tokio::test]
async fn test_ready_endpoint_indicates_dependencies() {
    let server = spawn_test_server(TestServerConfig::default())
        .await
        .expect("Server should start");

    let client = TestClient::new(server.url());
    let ready = client.ready().await.expect("Ready check should succeed");

    assert!(ready.is_ok(), "Server should report ready");
    assert_eq!(ready.components.http, "ready");
    assert_eq!(ready.components.storage, "ready");
    assert_eq!(ready.components.embedding, "ready");
    assert_eq!(ready.components.embedder_mode, "stub");
}

#[tokio::test]
async fn test_lost_and_found_round_trip() {
    let server = spawn_test_server(TestServerConfig::default())
        .await
        .expect("Server should start");
    let client = TestClient::new(server.url());

    let owner = client.register("owner", "555-0001").await.unwrap();
    let finder = client.register("finder", "555-0002").await.unwrap();

    let lost = client
        .report(owner, &report_body("lost", "Blue umbrella", "umbrella.jpg"))
        .await
        .unwrap();
    assert_eq!(lost.status, 201);
    assert_eq!(lost.lostfound_status, "created");
    assert!(lost.body["matching"]["created"].as_array().unwrap().is_empty());

    // Unrelated found item: same pool shape, different content.
    let wallet = client
        .report(finder, &report_body("found", "Brown wallet", "wallet.jpg"))
        .await
        .unwrap();
    assert!(wallet.body["matching"]["created"].as_array().unwrap().is_empty());
    assert_eq!(wallet.body["matching"]["below_threshold"], 1);

    let found = client
        .report(finder, &report_body("found", "Blue umbrella", "umbrella.jpg"))
        .await
        .unwrap();
    let created = found.body["matching"]["created"].as_array().unwrap();
    assert_eq!(created.len(), 1, "{}", found.body);
    assert_eq!(created[0]["lost_item_id"], lost.body["item"]["id"]);
    assert_eq!(created[0]["found_item_id"], found.body["item"]["id"]);
    assert_eq!(created[0]["status"], "pending");
    let match_id = created[0]["id"].as_u64().unwrap();

    let notifications = client.get("/v1/notifications", Some(owner)).await.unwrap();
    assert_eq!(notifications.status, 200);
    assert_eq!(notifications.body[0]["finder"]["phone_number"], "555-0002");

    let returned = client.confirm_return(owner, match_id).await.unwrap();
    assert_eq!(returned.status, 200);
    assert_eq!(returned.body["outcome"], "rewarded");
    assert_eq!(returned.body["finder_balance"], 100);

    let again = client.confirm_return(owner, match_id).await.unwrap();
    assert_eq!(again.body["outcome"], "already_returned");

    let dashboard = client.get("/v1/items", Some(finder)).await.unwrap();
    assert_eq!(dashboard.body["user"]["coins"], 100);
    // The wallet is still active; the umbrella moved to history.
    assert_eq!(dashboard.body["found_items"].as_array().unwrap().len(), 1);

    let history = client.get("/v1/history", Some(finder)).await.unwrap();
    assert_eq!(history.body.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_admin_bootstrap_and_overview() {
    let server = spawn_test_server(TestServerConfig {
        admin_username: Some("warden".to_string()),
        ..Default::default()
    })
    .await
    .expect("Server should start");
    let client = TestClient::new(server.url());

    let student = client.register("student", "555-0003").await.unwrap();
    client
        .report(student, &report_body("lost", "Key ring", "keys.jpg"))
        .await
        .unwrap();

    let denied = client.get("/v1/admin/overview", Some(student)).await.unwrap();
    assert_eq!(denied.status, 403);

    // The bootstrap admin was the first user created.
    let overview = client.get("/v1/admin/overview", Some(1)).await.unwrap();
    assert_eq!(overview.status, 200);
    assert_eq!(overview.body["users"].as_array().unwrap().len(), 2);
    assert_eq!(overview.body["lost_items"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_state_survives_restart() {
    let storage = tempfile::tempdir().unwrap();
    let config = TestServerConfig {
        storage_path: Some(storage.path().to_path_buf()),
        ..Default::default()
    };

    let server = spawn_test_server(config.clone()).await.unwrap();
    let client = TestClient::new(server.url());
    let owner = client.register("owner", "555-0001").await.unwrap();
    let finder = client.register("finder", "555-0002").await.unwrap();
    client
        .report(owner, &report_body("lost", "Blue umbrella", "umbrella.jpg"))
        .await
        .unwrap();
    let found = client
        .report(finder, &report_body("found", "Blue umbrella", "umbrella.jpg"))
        .await
        .unwrap();
    let match_id = found.body["matching"]["created"][0]["id"].as_u64().unwrap();
    assert!(server.snapshot_file().exists());
    server.shutdown().await;

    let server = spawn_test_server(config).await.unwrap();
    let client = TestClient::new(server.url());

    let notifications = client.get("/v1/notifications", Some(owner)).await.unwrap();
    assert_eq!(notifications.body.as_array().unwrap().len(), 1);

    let returned = client.confirm_return(owner, match_id).await.unwrap();
    assert_eq!(returned.body["outcome"], "rewarded");

    let duplicate = client.register("owner", "555-0009").await;
    assert!(duplicate.is_err());
}
