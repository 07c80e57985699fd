//! Provisioning executor subsystem.
//!
//! # Data Flow
//! ```text
//! Lifecycle controller
//!     → Executor::create / update / delete (synchronous hand-off)
//!     → queue.rs (bounded intent queue)
//!     → worker.rs (programs the data plane, then reconciles statuses)
//! ```
//!
//! # Design Decisions
//! - A failed hand-off is reported to the caller as `ExecutorError`
//! - Anything that fails after the hand-off is the worker's problem
//! - The worker is the only place that returns a claimed tree to ACTIVE

pub mod queue;
pub mod worker;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::model::HealthMonitor;

pub use queue::QueueExecutor;
pub use worker::ProvisioningWorker;

/// Errors raised while handing an intent to the executor.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExecutorError {
    /// The intent queue is at capacity.
    #[error("provisioning queue is full")]
    QueueFull,

    /// The worker is gone.
    #[error("executor unavailable: {0}")]
    Unavailable(String),

    /// The executor refused the intent.
    #[error("intent rejected: {0}")]
    Rejected(String),
}

/// A lifecycle change waiting to be applied to the data plane.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProvisioningIntent {
    Create { monitor: HealthMonitor },
    Update { old: HealthMonitor, new: HealthMonitor },
    Delete { monitor: HealthMonitor },
}

impl ProvisioningIntent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Create { .. } => "create",
            Self::Update { .. } => "update",
            Self::Delete { .. } => "delete",
        }
    }

    pub fn pool_id(&self) -> Uuid {
        match self {
            Self::Create { monitor } | Self::Delete { monitor } => monitor.pool_id,
            Self::Update { new, .. } => new.pool_id,
        }
    }
}

/// Receives health monitor lifecycle intents.
///
/// Implementations return once the intent has been accepted; the actual
/// provisioning happens out of band.
#[async_trait]
pub trait Executor: Send + Sync {
    async fn create(&self, monitor: &HealthMonitor) -> Result<(), ExecutorError>;

    async fn update(&self, old: &HealthMonitor, new: &HealthMonitor) -> Result<(), ExecutorError>;

    async fn delete(&self, monitor: &HealthMonitor) -> Result<(), ExecutorError>;
}
