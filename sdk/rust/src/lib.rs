//! Typed async client for the load balancer control plane API.

mod client;

pub use client::{
    ClientError, ControlPlaneClient, HealthMonitor, HealthMonitorSpec, HealthMonitorUpdate,
    ListenerStatus, LoadBalancerStatus, StatusTree,
};
