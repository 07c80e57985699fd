//! Shared utilities for integration and load testing.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use lb_control_plane::config::{
    ControlPlaneConfig, ListenerSeed, LoadBalancerSeed, PoolSeed, TopologyConfig,
};
use lb_control_plane::control::HealthMonitorController;
use lb_control_plane::executor::{ProvisioningIntent, QueueExecutor};
use lb_control_plane::http::HttpServer;
use lb_control_plane::lifecycle::{build_services, seed_repository, Shutdown};
use sdk_rust::{ControlPlaneClient, StatusTree};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use uuid::Uuid;

pub const API_KEY: &str = "integration-key";

/// One load balancer: pool `web_pool` behind listeners `http` and `https`,
/// pool `spare_pool` behind nothing, and listener `admin` without a pool.
#[derive(Debug, Clone, Copy)]
pub struct Topology {
    pub lb: Uuid,
    pub web_pool: Uuid,
    pub spare_pool: Uuid,
    pub http: Uuid,
    pub https: Uuid,
    pub admin: Uuid,
}

impl Topology {
    pub fn new() -> Self {
        Self {
            lb: Uuid::new_v4(),
            web_pool: Uuid::new_v4(),
            spare_pool: Uuid::new_v4(),
            http: Uuid::new_v4(),
            https: Uuid::new_v4(),
            admin: Uuid::new_v4(),
        }
    }

    pub fn seed(&self) -> LoadBalancerSeed {
        let listener = |id: Uuid, name: &str, protocol_port: u16, default_pool: Option<Uuid>| ListenerSeed {
            id,
            name: name.to_string(),
            protocol_port,
            default_pool,
        };
        LoadBalancerSeed {
            id: self.lb,
            name: "web".to_string(),
            pools: vec![
                PoolSeed { id: self.web_pool, name: "web-pool".to_string() },
                PoolSeed { id: self.spare_pool, name: "spare-pool".to_string() },
            ],
            listeners: vec![
                listener(self.http, "http", 80, Some(self.web_pool)),
                listener(self.https, "https", 443, Some(self.web_pool)),
                listener(self.admin, "admin", 8443, None),
            ],
        }
    }
}

pub fn config_for(topologies: &[Topology], provisioning_delay_ms: u64) -> ControlPlaneConfig {
    let mut config = ControlPlaneConfig::default();
    config.admin.api_key = API_KEY.to_string();
    config.observability.metrics_enabled = false;
    config.executor.provisioning_delay_ms = provisioning_delay_ms;
    config.topology = TopologyConfig {
        load_balancers: topologies.iter().map(Topology::seed).collect(),
    };
    config
}

pub struct RunningServer {
    pub addr: SocketAddr,
    pub shutdown: Shutdown,
    /// Undrained intent queue, held open for the server's lifetime.
    pub intents: Option<mpsc::Receiver<ProvisioningIntent>>,
}

impl RunningServer {
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn client(&self) -> ControlPlaneClient {
        ControlPlaneClient::new(&self.url(), API_KEY)
    }
}

async fn serve(config: ControlPlaneConfig, controller: Arc<HealthMonitorController>, shutdown: Shutdown) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (_, config_updates) = mpsc::unbounded_channel();
    let server = HttpServer::new(config, controller);
    let server_shutdown = shutdown.subscribe();

    tokio::spawn(async move {
        let _ = server.run(listener, config_updates, server_shutdown).await;
    });
    addr
}

/// Start the full control plane, worker included.
pub async fn start_control_plane(config: ControlPlaneConfig) -> RunningServer {
    let services = build_services(&config).unwrap();
    let shutdown = Shutdown::new();
    tokio::spawn(services.worker.run(shutdown.subscribe()));
    let addr = serve(config, services.controller, shutdown.clone()).await;
    RunningServer { addr, shutdown, intents: None }
}

/// Start the API with a queue nobody drains, so claimed trees stay pending.
/// With `worker_gone` the queue is closed and every hand-off fails.
pub async fn start_without_worker(config: ControlPlaneConfig, queue_depth: usize, worker_gone: bool) -> RunningServer {
    let repository = Arc::new(seed_repository(&config.topology).unwrap());
    let (executor, intents) = QueueExecutor::new(queue_depth);
    let intents = if worker_gone { None } else { Some(intents) };
    let controller = Arc::new(HealthMonitorController::new(repository, Arc::new(executor)));
    let shutdown = Shutdown::new();
    let addr = serve(config, controller, shutdown.clone()).await;
    RunningServer { addr, shutdown, intents }
}

/// Poll until the load balancer and all its listeners are ACTIVE again.
pub async fn wait_until_active(client: &ControlPlaneClient, lb: Uuid) -> StatusTree {
    for _ in 0..100 {
        let tree = client.status_tree(lb).await.unwrap();
        if tree.is_active() {
            return tree;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("load balancer {lb} never returned to ACTIVE");
}
