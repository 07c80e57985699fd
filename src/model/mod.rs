//! Resource data model.
//!
//! # Resource Tree
//! ```text
//! LoadBalancer
//!     ├── Listener (0..n) ──default_pool──┐
//!     └── Pool (0..n) ◀───────────────────┘
//!             └── HealthMonitor (0..1)
//! ```
//!
//! # Design Decisions
//! - Records are plain values; the repository owns the canonical copy
//! - Monitor type is stored as an enum, the API carries it as a string so the
//!   store can reject unknown values the way a column constraint would
//! - Ids are UUIDv4

pub mod entities;
pub mod health_monitor;
pub mod status;

pub use entities::{LoadBalancer, Listener, Pool, StatusTree};
pub use health_monitor::{
    HealthMonitor, HealthMonitorFields, HealthMonitorType, HealthMonitorUpdate, HealthMonitorView,
};
pub use status::{OperatingStatus, ProvisioningStatus};
