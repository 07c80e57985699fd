//! In-memory transactional repository.
//!
//! Every operation takes the store lock once, so each call behaves as a
//! single committed transaction. Concurrent claims on overlapping resources
//! are ordered by lock acquisition: the first sees idle records and wins, the
//! rest see pending records and fail fast.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use uuid::Uuid;

use crate::model::{
    HealthMonitor, HealthMonitorFields, HealthMonitorType, HealthMonitorUpdate, LoadBalancer,
    Listener, OperatingStatus, Pool, ProvisioningStatus,
};
use crate::repository::{Repository, RepositoryError, RepositoryResult};

const HTTP_METHODS: &[&str] = &[
    "GET", "HEAD", "POST", "PUT", "DELETE", "TRACE", "OPTIONS", "PATCH", "CONNECT",
];

#[derive(Debug, Default)]
struct Store {
    load_balancers: HashMap<Uuid, LoadBalancer>,
    listeners: HashMap<Uuid, Listener>,
    pools: HashMap<Uuid, Pool>,
    /// Keyed by pool id; one monitor per pool.
    health_monitors: HashMap<Uuid, HealthMonitor>,
}

impl Store {
    fn load_balancer_mut(&mut self, id: Uuid) -> RepositoryResult<&mut LoadBalancer> {
        self.load_balancers
            .get_mut(&id)
            .ok_or(RepositoryError::NotFound { resource: "Load Balancer", id })
    }

    fn ensure_listeners(&self, ids: &[Uuid]) -> RepositoryResult<()> {
        match ids.iter().find(|id| !self.listeners.contains_key(*id)) {
            Some(id) => Err(RepositoryError::NotFound { resource: "Listener", id: *id }),
            None => Ok(()),
        }
    }

    fn sorted_listeners(&self, filter: impl Fn(&Listener) -> bool) -> Vec<Listener> {
        let mut listeners: Vec<Listener> = self
            .listeners
            .values()
            .filter(|l| filter(l))
            .cloned()
            .collect();
        listeners.sort_by_key(|l| (l.protocol_port, l.id));
        listeners
    }
}

fn parse_monitor_type(value: &str) -> RepositoryResult<HealthMonitorType> {
    value.parse().map_err(|_| RepositoryError::InvalidValue {
        field: "type",
        value: value.to_string(),
    })
}

fn check_http_method(value: &str) -> RepositoryResult<()> {
    if HTTP_METHODS.contains(&value) {
        Ok(())
    } else {
        Err(RepositoryError::InvalidValue {
            field: "http_method",
            value: value.to_string(),
        })
    }
}

/// Repository backed by process memory.
#[derive(Debug, Default)]
pub struct InMemoryRepository {
    store: Mutex<Store>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn store(&self) -> RepositoryResult<MutexGuard<'_, Store>> {
        self.store
            .lock()
            .map_err(|_| RepositoryError::Unavailable("store lock poisoned".to_string()))
    }

    /// Seed a load balancer record.
    pub fn insert_load_balancer(&self, load_balancer: LoadBalancer) -> RepositoryResult<()> {
        let mut store = self.store()?;
        if store.load_balancers.contains_key(&load_balancer.id) {
            return Err(RepositoryError::Conflict(format!(
                "load balancer {} already exists",
                load_balancer.id
            )));
        }
        store.load_balancers.insert(load_balancer.id, load_balancer);
        Ok(())
    }

    /// Seed a pool record. Its load balancer must exist.
    pub fn insert_pool(&self, pool: Pool) -> RepositoryResult<()> {
        let mut store = self.store()?;
        if !store.load_balancers.contains_key(&pool.load_balancer_id) {
            return Err(RepositoryError::NotFound {
                resource: "Load Balancer",
                id: pool.load_balancer_id,
            });
        }
        if store.pools.contains_key(&pool.id) {
            return Err(RepositoryError::Conflict(format!("pool {} already exists", pool.id)));
        }
        store.pools.insert(pool.id, pool);
        Ok(())
    }

    /// Seed a listener record. Its load balancer and default pool must exist.
    pub fn insert_listener(&self, listener: Listener) -> RepositoryResult<()> {
        let mut store = self.store()?;
        if !store.load_balancers.contains_key(&listener.load_balancer_id) {
            return Err(RepositoryError::NotFound {
                resource: "Load Balancer",
                id: listener.load_balancer_id,
            });
        }
        if let Some(pool_id) = listener.default_pool_id {
            if !store.pools.contains_key(&pool_id) {
                return Err(RepositoryError::NotFound { resource: "Pool", id: pool_id });
            }
        }
        if store.listeners.contains_key(&listener.id) {
            return Err(RepositoryError::Conflict(format!(
                "listener {} already exists",
                listener.id
            )));
        }
        store.listeners.insert(listener.id, listener);
        Ok(())
    }
}

#[async_trait]
impl Repository for InMemoryRepository {
    async fn load_balancer(&self, id: Uuid) -> RepositoryResult<Option<LoadBalancer>> {
        Ok(self.store()?.load_balancers.get(&id).cloned())
    }

    async fn listener(&self, id: Uuid) -> RepositoryResult<Option<Listener>> {
        Ok(self.store()?.listeners.get(&id).cloned())
    }

    async fn pool(&self, id: Uuid) -> RepositoryResult<Option<Pool>> {
        Ok(self.store()?.pools.get(&id).cloned())
    }

    async fn pool_listeners(&self, pool_id: Uuid) -> RepositoryResult<Vec<Listener>> {
        let store = self.store()?;
        Ok(store.sorted_listeners(|l| l.default_pool_id == Some(pool_id)))
    }

    async fn load_balancer_listeners(&self, load_balancer_id: Uuid) -> RepositoryResult<Vec<Listener>> {
        let store = self.store()?;
        Ok(store.sorted_listeners(|l| l.load_balancer_id == load_balancer_id))
    }

    async fn health_monitor(&self, pool_id: Uuid) -> RepositoryResult<Option<HealthMonitor>> {
        Ok(self.store()?.health_monitors.get(&pool_id).cloned())
    }

    async fn create_health_monitor(
        &self,
        pool_id: Uuid,
        fields: &HealthMonitorFields,
        status: ProvisioningStatus,
    ) -> RepositoryResult<HealthMonitor> {
        let monitor_type = parse_monitor_type(&fields.monitor_type)?;
        check_http_method(&fields.http_method)?;

        let mut store = self.store()?;
        if !store.pools.contains_key(&pool_id) {
            return Err(RepositoryError::NotFound { resource: "Pool", id: pool_id });
        }
        if store.health_monitors.contains_key(&pool_id) {
            return Err(RepositoryError::Conflict(format!(
                "pool {} already has a health monitor",
                pool_id
            )));
        }

        let monitor = HealthMonitor {
            id: Uuid::new_v4(),
            pool_id,
            monitor_type,
            delay: fields.delay,
            timeout: fields.timeout,
            max_retries: fields.max_retries,
            http_method: fields.http_method.clone(),
            url_path: fields.url_path.clone(),
            expected_codes: fields.expected_codes.clone(),
            enabled: fields.enabled,
            provisioning_status: status,
        };
        store.health_monitors.insert(pool_id, monitor.clone());
        Ok(monitor)
    }

    async fn update_health_monitor(
        &self,
        pool_id: Uuid,
        changes: &HealthMonitorUpdate,
        status: ProvisioningStatus,
    ) -> RepositoryResult<HealthMonitor> {
        let monitor_type = changes
            .monitor_type
            .as_deref()
            .map(parse_monitor_type)
            .transpose()?;
        if let Some(method) = changes.http_method.as_deref() {
            check_http_method(method)?;
        }

        let mut store = self.store()?;
        let monitor = store
            .health_monitors
            .get_mut(&pool_id)
            .ok_or(RepositoryError::NotFound { resource: "Health Monitor", id: pool_id })?;

        if let Some(monitor_type) = monitor_type {
            monitor.monitor_type = monitor_type;
        }
        if let Some(delay) = changes.delay {
            monitor.delay = delay;
        }
        if let Some(timeout) = changes.timeout {
            monitor.timeout = timeout;
        }
        if let Some(max_retries) = changes.max_retries {
            monitor.max_retries = max_retries;
        }
        if let Some(method) = &changes.http_method {
            monitor.http_method = method.clone();
        }
        if let Some(path) = &changes.url_path {
            monitor.url_path = path.clone();
        }
        if let Some(codes) = &changes.expected_codes {
            monitor.expected_codes = codes.clone();
        }
        if let Some(enabled) = changes.enabled {
            monitor.enabled = enabled;
        }
        monitor.provisioning_status = status;
        Ok(monitor.clone())
    }

    async fn set_health_monitor_status(
        &self,
        pool_id: Uuid,
        status: ProvisioningStatus,
    ) -> RepositoryResult<HealthMonitor> {
        let mut store = self.store()?;
        let monitor = store
            .health_monitors
            .get_mut(&pool_id)
            .ok_or(RepositoryError::NotFound { resource: "Health Monitor", id: pool_id })?;
        monitor.provisioning_status = status;
        Ok(monitor.clone())
    }

    async fn delete_health_monitor(&self, pool_id: Uuid) -> RepositoryResult<()> {
        let mut store = self.store()?;
        store
            .health_monitors
            .remove(&pool_id)
            .map(|_| ())
            .ok_or(RepositoryError::NotFound { resource: "Health Monitor", id: pool_id })
    }

    async fn test_and_set_provisioning_status(
        &self,
        load_balancer_id: Uuid,
        listener_ids: &[Uuid],
        load_balancer_status: ProvisioningStatus,
        listener_status: ProvisioningStatus,
    ) -> RepositoryResult<bool> {
        let mut store = self.store()?;
        store.ensure_listeners(listener_ids)?;

        let lb_idle = store.load_balancer_mut(load_balancer_id)?.provisioning_status.is_idle();
        let listeners_idle = listener_ids
            .iter()
            .all(|id| store.listeners[id].provisioning_status.is_idle());
        if !lb_idle || !listeners_idle {
            return Ok(false);
        }

        store.load_balancer_mut(load_balancer_id)?.provisioning_status = load_balancer_status;
        for id in listener_ids {
            if let Some(listener) = store.listeners.get_mut(id) {
                listener.provisioning_status = listener_status;
            }
        }
        Ok(true)
    }

    async fn set_provisioning_status(
        &self,
        load_balancer_id: Uuid,
        listener_ids: &[Uuid],
        status: ProvisioningStatus,
    ) -> RepositoryResult<()> {
        let mut store = self.store()?;
        store.ensure_listeners(listener_ids)?;
        store.load_balancer_mut(load_balancer_id)?.provisioning_status = status;
        for id in listener_ids {
            if let Some(listener) = store.listeners.get_mut(id) {
                listener.provisioning_status = status;
            }
        }
        Ok(())
    }

    async fn set_listener_operating_status(
        &self,
        listener_ids: &[Uuid],
        status: OperatingStatus,
    ) -> RepositoryResult<()> {
        let mut store = self.store()?;
        store.ensure_listeners(listener_ids)?;
        for id in listener_ids {
            if let Some(listener) = store.listeners.get_mut(id) {
                listener.operating_status = status;
            }
        }
        Ok(())
    }
}
