//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check referential integrity (listener default pools exist on the same load balancer)
//! - Validate value ranges (timeouts > 0, addresses parse)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ControlPlaneConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;
use std::net::SocketAddr;
use thiserror::Error;
use uuid::Uuid;

use crate::config::schema::ControlPlaneConfig;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("invalid {field} address {value:?}")]
    InvalidAddress { field: &'static str, value: String },

    #[error("admin.api_key must not be empty")]
    EmptyApiKey,

    #[error("{0} must be greater than zero")]
    Zero(&'static str),

    #[error("duplicate {resource} id {id}")]
    DuplicateId { resource: &'static str, id: Uuid },

    #[error("listener {listener} references pool {pool} which is not on its load balancer")]
    UnknownPool { listener: Uuid, pool: Uuid },
}

pub fn validate_config(config: &ControlPlaneConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field: "listener.bind_address",
            value: config.listener.bind_address.clone(),
        });
    }
    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidAddress {
            field: "observability.metrics_address",
            value: config.observability.metrics_address.clone(),
        });
    }
    if config.admin.api_key.trim().is_empty() {
        errors.push(ValidationError::EmptyApiKey);
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::Zero("timeouts.request_secs"));
    }
    if config.executor.queue_depth == 0 {
        errors.push(ValidationError::Zero("executor.queue_depth"));
    }

    let mut seen = HashSet::new();
    for lb in &config.topology.load_balancers {
        if !seen.insert(lb.id) {
            errors.push(ValidationError::DuplicateId { resource: "load balancer", id: lb.id });
        }

        let mut pools = HashSet::new();
        for pool in &lb.pools {
            if !seen.insert(pool.id) {
                errors.push(ValidationError::DuplicateId { resource: "pool", id: pool.id });
            }
            pools.insert(pool.id);
        }

        for listener in &lb.listeners {
            if !seen.insert(listener.id) {
                errors.push(ValidationError::DuplicateId { resource: "listener", id: listener.id });
            }
            if let Some(pool) = listener.default_pool {
                if !pools.contains(&pool) {
                    errors.push(ValidationError::UnknownPool { listener: listener.id, pool });
                }
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
