//! End-to-end health monitor lifecycle over HTTP.

use reqwest::StatusCode;
use sdk_rust::{ControlPlaneClient, HealthMonitorSpec, HealthMonitorUpdate};

mod common;
use common::{config_for, start_control_plane, wait_until_active, Topology};

#[tokio::test]
async fn test_service_status() {
    let server = start_control_plane(config_for(&[], 0)).await;
    let status = server.client().service_status().await.unwrap();
    assert_eq!(status["status"], "operational");

    // Public route needs no token.
    let res = reqwest::get(format!("{}/v1/status", server.url())).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    server.shutdown.trigger();
}

#[tokio::test]
async fn test_full_lifecycle() {
    let topo = Topology::new();
    let server = start_control_plane(config_for(&[topo], 200)).await;
    let client = server.client();

    // Create through a listener that does not route to the pool.
    let created = client
        .create_health_monitor(topo.lb, Some(topo.admin), topo.web_pool, &HealthMonitorSpec::new("HTTP", 5, 3, 3))
        .await
        .unwrap();
    assert_eq!(created.pool_id, topo.web_pool);
    assert_eq!(created.monitor_type, "HTTP");
    assert_eq!(created.http_method, "GET");
    assert_eq!(created.provisioning_status, "PENDING_UPDATE");

    let tree = client.status_tree(topo.lb).await.unwrap();
    assert_eq!(tree.load_balancer.provisioning_status, "PENDING_UPDATE");
    for listener in &tree.listeners {
        assert_eq!(listener.provisioning_status, "PENDING_UPDATE", "listener {}", listener.name);
    }

    // The tree is claimed until the worker reconciles it.
    let err = client
        .update_health_monitor(topo.lb, None, topo.web_pool, &HealthMonitorUpdate { delay: Some(10), ..Default::default() })
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(StatusCode::CONFLICT));
    assert_eq!(err.kind(), Some("ImmutableObject"));

    wait_until_active(&client, topo.lb).await;
    let monitor = client.get_health_monitor(topo.lb, None, topo.web_pool).await.unwrap();
    assert_eq!(monitor.provisioning_status, "ACTIVE");

    let updated = client
        .update_health_monitor(
            topo.lb,
            None,
            topo.web_pool,
            &HealthMonitorUpdate {
                delay: Some(10),
                url_path: Some("/healthz".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.id, created.id);
    assert_eq!((updated.delay, updated.timeout), (10, 3));
    assert_eq!(updated.url_path, "/healthz");
    assert_eq!(updated.provisioning_status, "PENDING_UPDATE");
    wait_until_active(&client, topo.lb).await;

    let deleted = client.delete_health_monitor(topo.lb, None, topo.web_pool).await.unwrap();
    let deleted = deleted.expect("row stays until the worker removes it");
    assert_eq!(deleted.provisioning_status, "PENDING_DELETE");
    wait_until_active(&client, topo.lb).await;

    let err = client.get_health_monitor(topo.lb, None, topo.web_pool).await.unwrap_err();
    assert_eq!(err.status(), Some(StatusCode::NOT_FOUND));
    let err = client.delete_health_monitor(topo.lb, None, topo.web_pool).await.unwrap_err();
    assert_eq!(err.status(), Some(StatusCode::NOT_FOUND));

    server.shutdown.trigger();
}

#[tokio::test]
async fn test_duplicate_create_is_rejected() {
    let topo = Topology::new();
    let server = start_control_plane(config_for(&[topo], 0)).await;
    let client = server.client();
    let request = HealthMonitorSpec::new("TCP", 5, 3, 3);

    client.create_health_monitor(topo.lb, None, topo.web_pool, &request).await.unwrap();
    wait_until_active(&client, topo.lb).await;

    let err = client.create_health_monitor(topo.lb, None, topo.web_pool, &request).await.unwrap_err();
    assert_eq!(err.status(), Some(StatusCode::CONFLICT));
    assert_eq!(err.kind(), Some("DuplicateResource"));

    let tree = client.status_tree(topo.lb).await.unwrap();
    assert!(tree.is_active(), "duplicate must not claim the tree");
    server.shutdown.trigger();
}

#[tokio::test]
async fn test_requires_api_key() {
    let topo = Topology::new();
    let server = start_control_plane(config_for(&[topo], 0)).await;

    let intruder = ControlPlaneClient::new(&server.url(), "wrong-key");
    let err = intruder.get_health_monitor(topo.lb, None, topo.web_pool).await.unwrap_err();
    assert_eq!(err.status(), Some(StatusCode::UNAUTHORIZED));

    let err = intruder.status_tree(topo.lb).await.unwrap_err();
    assert_eq!(err.status(), Some(StatusCode::UNAUTHORIZED));
    server.shutdown.trigger();
}

#[tokio::test]
async fn test_scope_must_belong_to_load_balancer() {
    let (a, b) = (Topology::new(), Topology::new());
    let server = start_control_plane(config_for(&[a, b], 0)).await;
    let client = server.client();
    let request = HealthMonitorSpec::new("PING", 5, 3, 3);

    let err = client.create_health_monitor(a.lb, None, b.web_pool, &request).await.unwrap_err();
    assert_eq!(err.status(), Some(StatusCode::NOT_FOUND));

    let err = client.create_health_monitor(a.lb, Some(b.http), a.web_pool, &request).await.unwrap_err();
    assert_eq!(err.status(), Some(StatusCode::NOT_FOUND));

    assert!(client.status_tree(a.lb).await.unwrap().is_active());
    assert!(client.status_tree(b.lb).await.unwrap().is_active());
    server.shutdown.trigger();
}

#[tokio::test]
async fn test_request_id_is_propagated() {
    let server = start_control_plane(config_for(&[], 0)).await;
    let res = reqwest::Client::new()
        .get(format!("{}/v1/status", server.url()))
        .header("x-request-id", "trace-me")
        .send()
        .await
        .unwrap();
    assert_eq!(res.headers()["x-request-id"], "trace-me");

    let res = reqwest::get(format!("{}/v1/status", server.url())).await.unwrap();
    assert!(res.headers().contains_key("x-request-id"));
    server.shutdown.trigger();
}
