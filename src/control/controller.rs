//! Health monitor lifecycle controller.
//!
//! # Request State Machine
//! ```text
//! IDLE ──claim──▶ CLAIMED ──persist──▶ MUTATED ──hand-off──▶ DISPATCHED
//!   │                │                                         │
//!   │ duplicate /    │ write rejected                          ├─▶ RECONCILED_OK
//!   │ not found      ▼                                         └─▶ RECONCILED_ERROR
//!   ▼             release claim → error                           (listeners ERROR)
//! error
//! ```
//!
//! # Design Decisions
//! - Once the executor is called the row is already committed in a valid
//!   pending state, so executor errors are absorbed, not returned
//! - The only compensation for an executor error is one write marking the
//!   claimed listeners' operating status ERROR
//! - Load balancer status after a dispatch is the executor's to reconcile

use std::future::Future;
use std::sync::Arc;
use uuid::Uuid;

use crate::control::error::ControlError;
use crate::control::guard::{Claim, StatusGuard};
use crate::executor::{Executor, ExecutorError};
use crate::model::{
    HealthMonitor, HealthMonitorFields, HealthMonitorUpdate, HealthMonitorView, OperatingStatus,
    ProvisioningStatus, StatusTree,
};
use crate::observability::metrics;
use crate::repository::{Repository, RepositoryError};

/// Path context of a request: which pool, under which load balancer, and
/// optionally through which listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolScope {
    pub load_balancer_id: Uuid,
    pub pool_id: Uuid,
    pub listener_id: Option<Uuid>,
}

impl PoolScope {
    pub fn pool(load_balancer_id: Uuid, pool_id: Uuid) -> Self {
        Self {
            load_balancer_id,
            pool_id,
            listener_id: None,
        }
    }

    pub fn listener(load_balancer_id: Uuid, listener_id: Uuid, pool_id: Uuid) -> Self {
        Self {
            load_balancer_id,
            pool_id,
            listener_id: Some(listener_id),
        }
    }
}

/// Orchestrates create, update and delete of a pool's health monitor.
///
/// Mutations run on their own task: dropping the caller's future (request
/// timeout, client disconnect) never abandons a claimed tree halfway.
#[derive(Clone)]
pub struct HealthMonitorController {
    repository: Arc<dyn Repository>,
    executor: Arc<dyn Executor>,
    guard: StatusGuard,
}

impl HealthMonitorController {
    pub fn new(repository: Arc<dyn Repository>, executor: Arc<dyn Executor>) -> Self {
        let guard = StatusGuard::new(repository.clone());
        Self {
            repository,
            executor,
            guard,
        }
    }

    /// Get the pool's health monitor. A pool has at most one.
    pub async fn get(&self, scope: &PoolScope) -> Result<HealthMonitorView, ControlError> {
        self.check_scope(scope).await?;
        let monitor = self.load_monitor(scope).await?;
        Ok(HealthMonitorView::from(&monitor))
    }

    /// Create a health monitor on the pool.
    pub async fn create(
        &self,
        scope: &PoolScope,
        fields: HealthMonitorFields,
    ) -> Result<HealthMonitorView, ControlError> {
        let (this, scope) = (self.clone(), *scope);
        detach(async move { this.run_create(&scope, fields).await }).await
    }

    /// Update the pool's health monitor in place.
    pub async fn update(
        &self,
        scope: &PoolScope,
        changes: HealthMonitorUpdate,
    ) -> Result<HealthMonitorView, ControlError> {
        let (this, scope) = (self.clone(), *scope);
        detach(async move { this.run_update(&scope, changes).await }).await
    }

    /// Delete the pool's health monitor.
    ///
    /// The row stays as `PENDING_DELETE` until the executor removes it, so
    /// the returned view is `None` only if deletion already propagated.
    pub async fn delete(&self, scope: &PoolScope) -> Result<Option<HealthMonitorView>, ControlError> {
        let (this, scope) = (self.clone(), *scope);
        detach(async move { this.run_delete(&scope).await }).await
    }

    async fn run_create(
        &self,
        scope: &PoolScope,
        fields: HealthMonitorFields,
    ) -> Result<HealthMonitorView, ControlError> {
        self.check_scope(scope).await?;

        let existing = self
            .repository
            .health_monitor(scope.pool_id)
            .await
            .map_err(ControlError::from_read)?;
        if existing.is_some() {
            return Err(ControlError::DuplicateResource { pool_id: scope.pool_id });
        }

        let listeners = self
            .guard
            .affected_listeners(scope.pool_id, scope.listener_id)
            .await
            .map_err(ControlError::from_read)?;
        let claim = self.guard.claim(scope.load_balancer_id, listeners).await?;

        let monitor = match self
            .repository
            .create_health_monitor(scope.pool_id, &fields, ProvisioningStatus::PendingUpdate)
            .await
        {
            Ok(monitor) => monitor,
            Err(e) => return Err(self.abort(&claim, scope, e).await),
        };

        tracing::info!(pool_id = %scope.pool_id, "Sending creation of Health Monitor to executor");
        self.dispatch(&claim, "create", self.executor.create(&monitor)).await?;

        let monitor = self.load_monitor(scope).await?;
        Ok(HealthMonitorView::from(&monitor))
    }

    async fn run_update(
        &self,
        scope: &PoolScope,
        changes: HealthMonitorUpdate,
    ) -> Result<HealthMonitorView, ControlError> {
        self.check_scope(scope).await?;
        let old = self.load_monitor(scope).await?;

        let listeners = self
            .guard
            .affected_listeners(old.pool_id, scope.listener_id)
            .await
            .map_err(ControlError::from_read)?;
        let claim = self.guard.claim(scope.load_balancer_id, listeners).await?;

        let new = match self
            .repository
            .update_health_monitor(scope.pool_id, &changes, ProvisioningStatus::PendingUpdate)
            .await
        {
            Ok(monitor) => monitor,
            Err(e) => return Err(self.abort(&claim, scope, e).await),
        };

        tracing::info!(pool_id = %scope.pool_id, "Sending update of Health Monitor to executor");
        self.dispatch(&claim, "update", self.executor.update(&old, &new)).await?;

        let monitor = self.load_monitor(scope).await?;
        Ok(HealthMonitorView::from(&monitor))
    }

    async fn run_delete(&self, scope: &PoolScope) -> Result<Option<HealthMonitorView>, ControlError> {
        self.check_scope(scope).await?;
        let monitor = self.load_monitor(scope).await?;

        let listeners = self
            .guard
            .affected_listeners(monitor.pool_id, scope.listener_id)
            .await
            .map_err(ControlError::from_read)?;
        let claim = self.guard.claim(scope.load_balancer_id, listeners).await?;

        let pending = match self
            .repository
            .set_health_monitor_status(scope.pool_id, ProvisioningStatus::PendingDelete)
            .await
        {
            Ok(monitor) => monitor,
            Err(e) => return Err(self.abort(&claim, scope, e).await),
        };

        tracing::info!(pool_id = %scope.pool_id, "Sending deletion of Health Monitor to executor");
        self.dispatch(&claim, "delete", self.executor.delete(&pending)).await?;

        let current = self
            .repository
            .health_monitor(scope.pool_id)
            .await
            .map_err(ControlError::from_read)?;
        Ok(current.as_ref().map(HealthMonitorView::from))
    }

    /// Current statuses of a load balancer and its listeners.
    pub async fn status_tree(&self, load_balancer_id: Uuid) -> Result<StatusTree, ControlError> {
        let load_balancer = self
            .repository
            .load_balancer(load_balancer_id)
            .await
            .map_err(ControlError::from_read)?
            .ok_or(ControlError::NotFound {
                resource: "Load Balancer",
                id: load_balancer_id,
            })?;
        let listeners = self
            .repository
            .load_balancer_listeners(load_balancer_id)
            .await
            .map_err(ControlError::from_read)?;
        Ok(StatusTree { load_balancer, listeners })
    }

    /// Verify the pool (and listener, if any) belong to the load balancer.
    async fn check_scope(&self, scope: &PoolScope) -> Result<(), ControlError> {
        let pool = self
            .repository
            .pool(scope.pool_id)
            .await
            .map_err(ControlError::from_read)?;
        if pool.map(|p| p.load_balancer_id) != Some(scope.load_balancer_id) {
            return Err(ControlError::NotFound { resource: "Pool", id: scope.pool_id });
        }

        if let Some(listener_id) = scope.listener_id {
            let listener = self
                .repository
                .listener(listener_id)
                .await
                .map_err(ControlError::from_read)?;
            if listener.map(|l| l.load_balancer_id) != Some(scope.load_balancer_id) {
                return Err(ControlError::NotFound { resource: "Listener", id: listener_id });
            }
        }
        Ok(())
    }

    async fn load_monitor(&self, scope: &PoolScope) -> Result<HealthMonitor, ControlError> {
        let monitor = self
            .repository
            .health_monitor(scope.pool_id)
            .await
            .map_err(ControlError::from_read)?;
        monitor.ok_or_else(|| {
            tracing::info!(pool_id = %scope.pool_id, "Health Monitor for Pool was not found");
            ControlError::NotFound {
                resource: "Health Monitor",
                id: scope.pool_id,
            }
        })
    }

    /// Roll back a claim after the store rejected the mutation.
    async fn abort(&self, claim: &Claim, scope: &PoolScope, err: RepositoryError) -> ControlError {
        tracing::warn!(pool_id = %scope.pool_id, error = %err, "Health Monitor write rejected, releasing claim");
        if let Err(release_err) = self.guard.release(claim).await {
            tracing::error!(
                load_balancer_id = %claim.load_balancer_id,
                error = %release_err,
                "Failed to release claim; resource tree left pending"
            );
        }
        ControlError::from_write(err, scope.pool_id)
    }

    /// Await the executor hand-off, absorbing its failure.
    ///
    /// Only the executor's own error is swallowed; a failure of the
    /// compensating write is returned.
    async fn dispatch<F>(&self, claim: &Claim, intent: &'static str, handoff: F) -> Result<(), ControlError>
    where
        F: Future<Output = Result<(), ExecutorError>>,
    {
        match handoff.await {
            Ok(()) => {
                metrics::record_dispatch(intent, true);
                Ok(())
            }
            Err(err) => {
                metrics::record_dispatch(intent, false);
                tracing::warn!(
                    intent,
                    load_balancer_id = %claim.load_balancer_id,
                    listeners = claim.listener_ids.len(),
                    error = %err,
                    "Executor failed, marking listeners ERROR"
                );
                self.repository
                    .set_listener_operating_status(&claim.listener_ids, OperatingStatus::Error)
                    .await
                    .map_err(ControlError::Repository)
            }
        }
    }
}

/// Drive a mutation to completion on a spawned task.
async fn detach<T, F>(work: F) -> Result<T, ControlError>
where
    F: Future<Output = Result<T, ControlError>> + Send + 'static,
    T: Send + 'static,
{
    match tokio::spawn(work).await {
        Ok(result) => result,
        Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
        Err(e) => {
            tracing::error!(error = %e, "Health Monitor mutation task cancelled");
            Err(ControlError::Interrupted)
        }
    }
}
