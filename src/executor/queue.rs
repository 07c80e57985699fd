//! Queue-backed executor.

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::executor::{Executor, ExecutorError, ProvisioningIntent};
use crate::model::HealthMonitor;

/// Hands intents to the provisioning worker over a bounded channel.
///
/// Never waits for capacity: a full queue fails the hand-off immediately.
#[derive(Debug, Clone)]
pub struct QueueExecutor {
    tx: mpsc::Sender<ProvisioningIntent>,
}

impl QueueExecutor {
    /// Create an executor and the receiving end for the worker.
    pub fn new(queue_depth: usize) -> (Self, mpsc::Receiver<ProvisioningIntent>) {
        let (tx, rx) = mpsc::channel(queue_depth.max(1));
        (Self { tx }, rx)
    }

    fn enqueue(&self, intent: ProvisioningIntent) -> Result<(), ExecutorError> {
        let name = intent.name();
        let pool_id = intent.pool_id();
        self.tx.try_send(intent).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => ExecutorError::QueueFull,
            mpsc::error::TrySendError::Closed(_) => {
                ExecutorError::Unavailable("provisioning worker stopped".to_string())
            }
        })?;
        tracing::debug!(intent = name, pool_id = %pool_id, "Provisioning intent queued");
        Ok(())
    }
}

#[async_trait]
impl Executor for QueueExecutor {
    async fn create(&self, monitor: &HealthMonitor) -> Result<(), ExecutorError> {
        self.enqueue(ProvisioningIntent::Create { monitor: monitor.clone() })
    }

    async fn update(&self, old: &HealthMonitor, new: &HealthMonitor) -> Result<(), ExecutorError> {
        self.enqueue(ProvisioningIntent::Update {
            old: old.clone(),
            new: new.clone(),
        })
    }

    async fn delete(&self, monitor: &HealthMonitor) -> Result<(), ExecutorError> {
        self.enqueue(ProvisioningIntent::Delete { monitor: monitor.clone() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{HealthMonitorType, ProvisioningStatus};
    use uuid::Uuid;

    fn monitor() -> HealthMonitor {
        HealthMonitor {
            id: Uuid::new_v4(),
            pool_id: Uuid::new_v4(),
            monitor_type: HealthMonitorType::Http,
            delay: 5,
            timeout: 3,
            max_retries: 3,
            http_method: "GET".to_string(),
            url_path: "/".to_string(),
            expected_codes: "200".to_string(),
            enabled: true,
            provisioning_status: ProvisioningStatus::PendingUpdate,
        }
    }

    #[tokio::test]
    async fn test_enqueue_and_receive() {
        let (executor, mut rx) = QueueExecutor::new(4);
        let hm = monitor();
        executor.create(&hm).await.unwrap();
        executor.delete(&hm).await.unwrap();

        assert_eq!(rx.recv().await, Some(ProvisioningIntent::Create { monitor: hm.clone() }));
        assert_eq!(rx.recv().await.map(|i| i.name()), Some("delete"));
    }

    #[tokio::test]
    async fn test_full_queue_fails_fast() {
        let (executor, _rx) = QueueExecutor::new(1);
        let hm = monitor();
        executor.create(&hm).await.unwrap();
        assert_eq!(executor.update(&hm, &hm).await, Err(ExecutorError::QueueFull));
    }

    #[tokio::test]
    async fn test_closed_queue() {
        let (executor, rx) = QueueExecutor::new(1);
        drop(rx);
        let err = executor.create(&monitor()).await.unwrap_err();
        assert!(matches!(err, ExecutorError::Unavailable(_)));
    }
}
