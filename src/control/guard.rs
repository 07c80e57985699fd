//! Status guard: the claim-before-mutate lock.
//!
//! # Responsibilities
//! - Derive the listeners affected by a change to a pool's monitor
//! - Claim the load balancer and those listeners with one atomic
//!   check-and-set in the repository
//! - Release a claim when the mutation that took it could not be persisted
//!
//! # Design Decisions
//! - A denied claim always names the load balancer, the root of the tree
//! - Claims are never retried here; the client retries the whole request
//! - Release restores every claimed resource, not only the addressed listener

use std::sync::Arc;
use uuid::Uuid;

use crate::control::error::ControlError;
use crate::model::ProvisioningStatus;
use crate::observability::metrics;
use crate::repository::{Repository, RepositoryResult};

/// Resources owned by one admitted mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Claim {
    pub load_balancer_id: Uuid,
    pub listener_ids: Vec<Uuid>,
}

#[derive(Clone)]
pub struct StatusGuard {
    repository: Arc<dyn Repository>,
}

impl StatusGuard {
    pub fn new(repository: Arc<dyn Repository>) -> Self {
        Self { repository }
    }

    /// Listeners referencing `pool_id`, plus the request's listener context.
    ///
    /// Deduplicated, in repository order with the context listener last.
    pub async fn affected_listeners(
        &self,
        pool_id: Uuid,
        context_listener: Option<Uuid>,
    ) -> RepositoryResult<Vec<Uuid>> {
        let mut ids: Vec<Uuid> = self
            .repository
            .pool_listeners(pool_id)
            .await?
            .into_iter()
            .map(|l| l.id)
            .collect();
        if let Some(id) = context_listener {
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
        Ok(ids)
    }

    /// Atomically move the tree to the desired statuses if it is idle.
    pub async fn try_claim(
        &self,
        load_balancer_id: Uuid,
        listener_ids: &[Uuid],
        load_balancer_status: ProvisioningStatus,
        listener_status: ProvisioningStatus,
    ) -> RepositoryResult<bool> {
        self.repository
            .test_and_set_provisioning_status(
                load_balancer_id,
                listener_ids,
                load_balancer_status,
                listener_status,
            )
            .await
    }

    /// Claim the tree for an update, or fail with `ImmutableObject`.
    pub async fn claim(
        &self,
        load_balancer_id: Uuid,
        listener_ids: Vec<Uuid>,
    ) -> Result<Claim, ControlError> {
        let claimed = self
            .try_claim(
                load_balancer_id,
                &listener_ids,
                ProvisioningStatus::PendingUpdate,
                ProvisioningStatus::PendingUpdate,
            )
            .await
            .map_err(ControlError::from_read)?;
        metrics::record_claim(claimed);

        if !claimed {
            tracing::info!(
                load_balancer_id = %load_balancer_id,
                "Health Monitor cannot be created or modified because the Load Balancer is in an immutable state"
            );
            return Err(ControlError::ImmutableObject {
                resource: "Load Balancer",
                id: load_balancer_id,
            });
        }

        tracing::debug!(
            load_balancer_id = %load_balancer_id,
            listeners = listener_ids.len(),
            "Claimed resource tree"
        );
        Ok(Claim {
            load_balancer_id,
            listener_ids,
        })
    }

    /// Return every claimed resource to ACTIVE.
    pub async fn release(&self, claim: &Claim) -> RepositoryResult<()> {
        metrics::record_rollback();
        tracing::info!(
            load_balancer_id = %claim.load_balancer_id,
            listeners = claim.listener_ids.len(),
            "Releasing claim"
        );
        self.repository
            .set_provisioning_status(
                claim.load_balancer_id,
                &claim.listener_ids,
                ProvisioningStatus::Active,
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{LoadBalancer, Listener, Pool};
    use crate::repository::InMemoryRepository;

    struct Fixture {
        repo: Arc<InMemoryRepository>,
        guard: StatusGuard,
        lb: Uuid,
        pool: Uuid,
        a: Uuid,
        b: Uuid,
        other: Uuid,
    }

    fn fixture() -> Fixture {
        let repo = Arc::new(InMemoryRepository::new());
        let lb = Uuid::new_v4();
        let pool = Uuid::new_v4();
        let (a, b, other) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        repo.insert_load_balancer(LoadBalancer::new(lb, "lb")).unwrap();
        repo.insert_pool(Pool::new(pool, lb, "pool")).unwrap();
        repo.insert_listener(Listener::new(a, lb, "a", 80, Some(pool))).unwrap();
        repo.insert_listener(Listener::new(b, lb, "b", 443, Some(pool))).unwrap();
        repo.insert_listener(Listener::new(other, lb, "other", 8080, None)).unwrap();
        let guard = StatusGuard::new(repo.clone());
        Fixture { repo, guard, lb, pool, a, b, other }
    }

    #[tokio::test]
    async fn test_affected_listeners_union() {
        let f = fixture();
        let ids = f.guard.affected_listeners(f.pool, None).await.unwrap();
        assert_eq!(ids, vec![f.a, f.b]);

        let ids = f.guard.affected_listeners(f.pool, Some(f.a)).await.unwrap();
        assert_eq!(ids, vec![f.a, f.b]);

        let ids = f.guard.affected_listeners(f.pool, Some(f.other)).await.unwrap();
        assert_eq!(ids, vec![f.a, f.b, f.other]);
    }

    #[tokio::test]
    async fn test_second_claim_is_immutable() {
        let f = fixture();
        let claim = f.guard.claim(f.lb, vec![f.a]).await.unwrap();
        assert_eq!(claim.listener_ids, vec![f.a]);

        // Disjoint listener, same load balancer.
        let err = f.guard.claim(f.lb, vec![f.other]).await.unwrap_err();
        assert_eq!(
            err,
            ControlError::ImmutableObject { resource: "Load Balancer", id: f.lb }
        );
        let other = f.repo.listener(f.other).await.unwrap().unwrap();
        assert_eq!(other.provisioning_status, ProvisioningStatus::Active);
    }

    #[tokio::test]
    async fn test_release_restores_all_claimed() {
        let f = fixture();
        let claim = f.guard.claim(f.lb, vec![f.a, f.b]).await.unwrap();
        f.guard.release(&claim).await.unwrap();

        let lb = f.repo.load_balancer(f.lb).await.unwrap().unwrap();
        assert_eq!(lb.provisioning_status, ProvisioningStatus::Active);
        for id in [f.a, f.b] {
            let l = f.repo.listener(id).await.unwrap().unwrap();
            assert_eq!(l.provisioning_status, ProvisioningStatus::Active);
        }
        assert!(f.guard.claim(f.lb, vec![f.a]).await.is_ok());
    }

    #[tokio::test]
    async fn test_claim_unknown_load_balancer() {
        let f = fixture();
        let missing = Uuid::new_v4();
        let err = f.guard.claim(missing, vec![]).await.unwrap_err();
        assert_eq!(err, ControlError::NotFound { resource: "Load Balancer", id: missing });
    }
}
