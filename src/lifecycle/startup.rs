//! Startup orchestration.
//!
//! # Responsibilities
//! - Seed the repository from the configured topology
//! - Wire repository, executor, worker and controller together
//!
//! # Design Decisions
//! - Fail fast: any seeding error is fatal
//! - Collaborators are built once here and passed down explicitly

use std::sync::Arc;
use std::time::Duration;

use crate::config::{ControlPlaneConfig, TopologyConfig};
use crate::control::HealthMonitorController;
use crate::executor::{ProvisioningWorker, QueueExecutor};
use crate::model::{LoadBalancer, Listener, Pool};
use crate::repository::{InMemoryRepository, RepositoryResult};

/// Everything the server and background tasks need.
pub struct Services {
    pub controller: Arc<HealthMonitorController>,
    pub worker: ProvisioningWorker,
}

/// Build a repository holding the seed records, all ACTIVE / ONLINE.
pub fn seed_repository(topology: &TopologyConfig) -> RepositoryResult<InMemoryRepository> {
    let repository = InMemoryRepository::new();
    for lb in &topology.load_balancers {
        repository.insert_load_balancer(LoadBalancer::new(lb.id, lb.name.clone()))?;
        for pool in &lb.pools {
            repository.insert_pool(Pool::new(pool.id, lb.id, pool.name.clone()))?;
        }
        for listener in &lb.listeners {
            repository.insert_listener(Listener::new(
                listener.id,
                lb.id,
                listener.name.clone(),
                listener.protocol_port,
                listener.default_pool,
            ))?;
        }
        tracing::info!(
            load_balancer_id = %lb.id,
            pools = lb.pools.len(),
            listeners = lb.listeners.len(),
            "Seeded load balancer"
        );
    }
    Ok(repository)
}

pub fn build_services(config: &ControlPlaneConfig) -> RepositoryResult<Services> {
    let repository = Arc::new(seed_repository(&config.topology)?);
    let (executor, intents) = QueueExecutor::new(config.executor.queue_depth);
    let worker = ProvisioningWorker::new(
        repository.clone(),
        intents,
        Duration::from_millis(config.executor.provisioning_delay_ms),
    );
    let controller = Arc::new(HealthMonitorController::new(repository, Arc::new(executor)));

    Ok(Services {
        controller,
        worker,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ListenerSeed, LoadBalancerSeed, PoolSeed};
    use crate::model::ProvisioningStatus;
    use crate::repository::Repository;
    use uuid::Uuid;

    #[tokio::test]
    async fn test_seed_topology() {
        let (lb, pool, listener) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let topology = TopologyConfig {
            load_balancers: vec![LoadBalancerSeed {
                id: lb,
                name: "web".into(),
                pools: vec![PoolSeed { id: pool, name: "web-pool".into() }],
                listeners: vec![ListenerSeed {
                    id: listener,
                    name: "http".into(),
                    protocol_port: 80,
                    default_pool: Some(pool),
                }],
            }],
        };

        let services = build_services(&ControlPlaneConfig {
            topology: topology.clone(),
            ..Default::default()
        })
        .unwrap();
        let view = services.controller.status_tree(lb).await.unwrap();
        assert_eq!(view.listeners.len(), 1);

        let repo = seed_repository(&topology).unwrap();
        let seeded = repo.load_balancer(lb).await.unwrap().unwrap();
        assert_eq!(seeded.provisioning_status, ProvisioningStatus::Active);
        let listeners = repo.pool_listeners(pool).await.unwrap();
        assert_eq!(listeners.len(), 1);
        assert_eq!(listeners[0].id, listener);
    }

    #[test]
    fn test_seed_rejects_dangling_pool() {
        let topology = TopologyConfig {
            load_balancers: vec![LoadBalancerSeed {
                id: Uuid::new_v4(),
                name: "web".into(),
                pools: vec![],
                listeners: vec![ListenerSeed {
                    id: Uuid::new_v4(),
                    name: "http".into(),
                    protocol_port: 80,
                    default_pool: Some(Uuid::new_v4()),
                }],
            }],
        };
        assert!(seed_repository(&topology).is_err());
    }
}
