//! Load balancer, listener and pool records.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::status::{OperatingStatus, ProvisioningStatus};

/// Root of the mutability domain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadBalancer {
    pub id: Uuid,
    pub name: String,
    pub provisioning_status: ProvisioningStatus,
}

impl LoadBalancer {
    pub fn new(id: Uuid, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            provisioning_status: ProvisioningStatus::Active,
        }
    }
}

/// A frontend port on a load balancer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Listener {
    pub id: Uuid,
    pub load_balancer_id: Uuid,
    pub name: String,
    pub protocol_port: u16,
    /// Pool that receives this listener's traffic, if any.
    pub default_pool_id: Option<Uuid>,
    pub provisioning_status: ProvisioningStatus,
    pub operating_status: OperatingStatus,
}

impl Listener {
    pub fn new(
        id: Uuid,
        load_balancer_id: Uuid,
        name: impl Into<String>,
        protocol_port: u16,
        default_pool_id: Option<Uuid>,
    ) -> Self {
        Self {
            id,
            load_balancer_id,
            name: name.into(),
            protocol_port,
            default_pool_id,
            provisioning_status: ProvisioningStatus::Active,
            operating_status: OperatingStatus::Online,
        }
    }
}

/// A group of backend members.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pool {
    pub id: Uuid,
    pub load_balancer_id: Uuid,
    pub name: String,
}

impl Pool {
    pub fn new(id: Uuid, load_balancer_id: Uuid, name: impl Into<String>) -> Self {
        Self {
            id,
            load_balancer_id,
            name: name.into(),
        }
    }
}

/// Provisioning and operating status of a load balancer and its listeners.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusTree {
    pub load_balancer: LoadBalancer,
    pub listeners: Vec<Listener>,
}
