//! Background provisioning worker.
//!
//! # Responsibilities
//! - Drain queued intents in order
//! - Apply the change to the data plane (simulated by an optional delay)
//! - Reconcile statuses: monitor ACTIVE or removed, then the load balancer
//!   and its pending listeners back to ACTIVE

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc};
use tokio::time;

use crate::executor::ProvisioningIntent;
use crate::model::ProvisioningStatus;
use crate::observability::metrics;
use crate::repository::{Repository, RepositoryError, RepositoryResult};

pub struct ProvisioningWorker {
    repository: Arc<dyn Repository>,
    intents: mpsc::Receiver<ProvisioningIntent>,
    delay: Duration,
}

impl ProvisioningWorker {
    pub fn new(
        repository: Arc<dyn Repository>,
        intents: mpsc::Receiver<ProvisioningIntent>,
        delay: Duration,
    ) -> Self {
        Self {
            repository,
            intents,
            delay,
        }
    }

    pub async fn run(mut self, mut shutdown: broadcast::Receiver<()>) {
        tracing::info!(delay_ms = self.delay.as_millis() as u64, "Provisioning worker starting");

        loop {
            tokio::select! {
                intent = self.intents.recv() => {
                    let Some(intent) = intent else {
                        tracing::info!("Provisioning queue closed, worker exiting");
                        break;
                    };
                    if !self.delay.is_zero() {
                        time::sleep(self.delay).await;
                    }
                    let name = intent.name();
                    let pool_id = intent.pool_id();
                    match self.apply(intent).await {
                        Ok(()) => {
                            metrics::record_reconcile(name, true);
                            tracing::info!(intent = name, pool_id = %pool_id, "Provisioning complete");
                        }
                        Err(e) => {
                            metrics::record_reconcile(name, false);
                            tracing::error!(intent = name, pool_id = %pool_id, error = %e, "Provisioning reconcile failed");
                        }
                    }
                }
                _ = shutdown.recv() => {
                    tracing::info!("Provisioning worker received shutdown signal, exiting loop");
                    break;
                }
            }
        }
    }

    /// Apply one intent and return the owning tree to ACTIVE.
    ///
    /// Only pending listeners are reset; a listener in ERROR keeps it.
    pub async fn apply(&self, intent: ProvisioningIntent) -> RepositoryResult<()> {
        let pool_id = intent.pool_id();
        let pool = self
            .repository
            .pool(pool_id)
            .await?
            .ok_or(RepositoryError::NotFound { resource: "Pool", id: pool_id })?;

        match intent {
            ProvisioningIntent::Create { .. } | ProvisioningIntent::Update { .. } => {
                self.repository
                    .set_health_monitor_status(pool_id, ProvisioningStatus::Active)
                    .await?;
            }
            ProvisioningIntent::Delete { .. } => {
                match self.repository.delete_health_monitor(pool_id).await {
                    Ok(()) | Err(RepositoryError::NotFound { .. }) => {}
                    Err(e) => return Err(e),
                }
            }
        }

        let listener_ids: Vec<_> = self
            .repository
            .load_balancer_listeners(pool.load_balancer_id)
            .await?
            .into_iter()
            .filter(|l| l.provisioning_status.is_pending())
            .map(|l| l.id)
            .collect();
        self.repository
            .set_provisioning_status(pool.load_balancer_id, &listener_ids, ProvisioningStatus::Active)
            .await
    }
}
