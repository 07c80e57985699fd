//! Load balancer control plane library.
//!
//! Health monitor lifecycle management over a load balancer resource tree,
//! guarded by provisioning-status claims.

pub mod admin;
pub mod config;
pub mod control;
pub mod executor;
pub mod http;
pub mod lifecycle;
pub mod model;
pub mod observability;
pub mod repository;

pub use config::schema::ControlPlaneConfig;
pub use control::{HealthMonitorController, PoolScope};
pub use http::HttpServer;
pub use lifecycle::Shutdown;
