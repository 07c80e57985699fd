//! Resource repository subsystem.
//!
//! # Data Flow
//! ```text
//! Lifecycle controller / status guard / provisioning worker
//!     → Repository trait (typed CRUD + conditional status set)
//!     → memory.rs (transactional in-memory store)
//! ```
//!
//! # Design Decisions
//! - The trait is object safe so collaborators are injected as `Arc<dyn Repository>`
//! - Field values are checked at write time, like column constraints
//! - `test_and_set_provisioning_status` is a single atomic check-and-set

pub mod memory;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::model::{
    HealthMonitor, HealthMonitorFields, HealthMonitorUpdate, LoadBalancer, Listener,
    OperatingStatus, Pool, ProvisioningStatus,
};

pub use memory::InMemoryRepository;

/// Errors raised by the persistence layer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepositoryError {
    /// A referenced record does not exist.
    #[error("{resource} {id} not found")]
    NotFound { resource: &'static str, id: Uuid },

    /// A field value was rejected by the store.
    #[error("invalid value {value:?} for field {field}")]
    InvalidValue { field: &'static str, value: String },

    /// A uniqueness constraint was violated.
    #[error("conflict: {0}")]
    Conflict(String),

    /// The store could not be reached or is in a broken state.
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Result type for repository operations.
pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Transactional access to the resource tree.
#[async_trait]
pub trait Repository: Send + Sync {
    async fn load_balancer(&self, id: Uuid) -> RepositoryResult<Option<LoadBalancer>>;

    async fn listener(&self, id: Uuid) -> RepositoryResult<Option<Listener>>;

    async fn pool(&self, id: Uuid) -> RepositoryResult<Option<Pool>>;

    /// Listeners whose default pool is `pool_id`.
    async fn pool_listeners(&self, pool_id: Uuid) -> RepositoryResult<Vec<Listener>>;

    async fn load_balancer_listeners(&self, load_balancer_id: Uuid) -> RepositoryResult<Vec<Listener>>;

    /// The monitor attached to `pool_id`, if any.
    async fn health_monitor(&self, pool_id: Uuid) -> RepositoryResult<Option<HealthMonitor>>;

    async fn create_health_monitor(
        &self,
        pool_id: Uuid,
        fields: &HealthMonitorFields,
        status: ProvisioningStatus,
    ) -> RepositoryResult<HealthMonitor>;

    async fn update_health_monitor(
        &self,
        pool_id: Uuid,
        changes: &HealthMonitorUpdate,
        status: ProvisioningStatus,
    ) -> RepositoryResult<HealthMonitor>;

    async fn set_health_monitor_status(
        &self,
        pool_id: Uuid,
        status: ProvisioningStatus,
    ) -> RepositoryResult<HealthMonitor>;

    async fn delete_health_monitor(&self, pool_id: Uuid) -> RepositoryResult<()>;

    /// Atomically move the load balancer and listeners to the given pending
    /// statuses if, and only if, all of them are idle.
    ///
    /// Returns `false` without writing anything when any of them is pending.
    async fn test_and_set_provisioning_status(
        &self,
        load_balancer_id: Uuid,
        listener_ids: &[Uuid],
        load_balancer_status: ProvisioningStatus,
        listener_status: ProvisioningStatus,
    ) -> RepositoryResult<bool>;

    /// Unconditionally set the provisioning status of a load balancer and listeners.
    async fn set_provisioning_status(
        &self,
        load_balancer_id: Uuid,
        listener_ids: &[Uuid],
        status: ProvisioningStatus,
    ) -> RepositoryResult<()>;

    async fn set_listener_operating_status(
        &self,
        listener_ids: &[Uuid],
        status: OperatingStatus,
    ) -> RepositoryResult<()>;
}
