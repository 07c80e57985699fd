//! Failure injection: rejected writes and executor hand-off failures.

use reqwest::StatusCode;
use sdk_rust::{HealthMonitorSpec, HealthMonitorUpdate};

mod common;
use common::{config_for, start_control_plane, start_without_worker, wait_until_active, Topology};

#[tokio::test]
async fn test_invalid_type_rolls_back_claim() {
    let topo = Topology::new();
    let server = start_control_plane(config_for(&[topo], 0)).await;
    let client = server.client();

    let err = client
        .create_health_monitor(topo.lb, Some(topo.admin), topo.web_pool, &HealthMonitorSpec::new("BOGUS", 5, 3, 3))
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(StatusCode::BAD_REQUEST));
    assert_eq!(err.kind(), Some("InvalidOption"));

    let tree = client.status_tree(topo.lb).await.unwrap();
    assert!(tree.is_active(), "every claimed resource is released: {tree:?}");
    let err = client.get_health_monitor(topo.lb, None, topo.web_pool).await.unwrap_err();
    assert_eq!(err.status(), Some(StatusCode::NOT_FOUND));

    server.shutdown.trigger();
}

#[tokio::test]
async fn test_invalid_update_keeps_monitor() {
    let topo = Topology::new();
    let server = start_control_plane(config_for(&[topo], 0)).await;
    let client = server.client();

    client
        .create_health_monitor(topo.lb, None, topo.web_pool, &HealthMonitorSpec::new("HTTP", 5, 3, 3))
        .await
        .unwrap();
    wait_until_active(&client, topo.lb).await;

    let changes = HealthMonitorUpdate {
        delay: Some(30),
        http_method: Some("TELEPORT".into()),
        ..Default::default()
    };
    let err = client
        .update_health_monitor(topo.lb, None, topo.web_pool, &changes)
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(StatusCode::BAD_REQUEST));

    assert!(client.status_tree(topo.lb).await.unwrap().is_active());
    let monitor = client.get_health_monitor(topo.lb, None, topo.web_pool).await.unwrap();
    assert_eq!((monitor.delay, monitor.http_method.as_str()), (5, "GET"));

    server.shutdown.trigger();
}

#[tokio::test]
async fn test_worker_gone_marks_listeners_error() {
    let topo = Topology::new();
    let server = start_without_worker(config_for(&[topo], 0), 8, true).await;
    let client = server.client();

    let created = client
        .create_health_monitor(topo.lb, None, topo.web_pool, &HealthMonitorSpec::new("HTTP", 5, 3, 3))
        .await
        .expect("hand-off failure is not surfaced to the caller");
    assert_eq!(created.provisioning_status, "PENDING_UPDATE");

    let tree = client.status_tree(topo.lb).await.unwrap();
    assert_eq!(tree.load_balancer.provisioning_status, "PENDING_UPDATE");
    for listener in &tree.listeners {
        if listener.id == topo.admin {
            assert_eq!(listener.provisioning_status, "ACTIVE");
            assert_eq!(listener.operating_status, "ONLINE");
        } else {
            assert_eq!(listener.provisioning_status, "PENDING_UPDATE");
            assert_eq!(listener.operating_status, "ERROR");
        }
    }

    server.shutdown.trigger();
}

#[tokio::test]
async fn test_full_queue_only_affects_overflowing_tree() {
    let (a, b) = (Topology::new(), Topology::new());
    let server = start_without_worker(config_for(&[a, b], 0), 1, false).await;
    let client = server.client();
    let request = HealthMonitorSpec::new("TCP", 5, 3, 3);

    client.create_health_monitor(a.lb, None, a.web_pool, &request).await.unwrap();
    client.create_health_monitor(b.lb, None, b.web_pool, &request).await.unwrap();

    let tree_a = client.status_tree(a.lb).await.unwrap();
    assert!(tree_a.listeners.iter().all(|l| l.operating_status == "ONLINE"));

    let tree_b = client.status_tree(b.lb).await.unwrap();
    let errored: Vec<_> = tree_b
        .listeners
        .iter()
        .filter(|l| l.operating_status == "ERROR")
        .map(|l| l.id)
        .collect();
    assert_eq!(errored, vec![b.http, b.https]);

    server.shutdown.trigger();
}
