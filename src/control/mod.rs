//! Health monitor control subsystem.
//!
//! # Data Flow
//! ```text
//! API request (pool scope + body)
//!     → controller.rs (uniqueness / existence checks)
//!     → guard.rs (claim load balancer + affected listeners)
//!     → repository (persist the mutation, release claim on rejection)
//!     → executor (hand off the intent, absorb its failure)
//!     → repository (re-read and return the current view)
//! ```
//!
//! # Design Decisions
//! - The status guard is the only concurrency control
//! - No process-wide singletons: collaborators are injected at construction
//! - `ImmutableObject` always names the load balancer

pub mod controller;
pub mod error;
pub mod guard;

pub use controller::{HealthMonitorController, PoolScope};
pub use error::ControlError;
pub use guard::{Claim, StatusGuard};
