//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request id, timeout, trace, metrics)
//!     → admin router (auth, health monitor handlers)
//!     → response.rs (202 Accepted / error mapping)
//!     → Send to client
//! ```

pub mod response;
pub mod server;

pub use response::{Accepted, ErrorBody};
pub use server::{AppState, HttpServer};
