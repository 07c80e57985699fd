//! Provisioning and operating status values.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Provisioning status shared by load balancers, listeners and monitors.
///
/// `ACTIVE` and `ERROR` are terminal (idle); every `PENDING_*` value marks a
/// resource that is owned by an in-flight mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProvisioningStatus {
    Active,
    PendingCreate,
    PendingUpdate,
    PendingDelete,
    Error,
}

impl ProvisioningStatus {
    /// Return true if a mutation currently owns the resource.
    pub fn is_pending(self) -> bool {
        matches!(
            self,
            Self::PendingCreate | Self::PendingUpdate | Self::PendingDelete
        )
    }

    /// Return true if a new mutation may claim the resource.
    pub fn is_idle(self) -> bool {
        !self.is_pending()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "ACTIVE",
            Self::PendingCreate => "PENDING_CREATE",
            Self::PendingUpdate => "PENDING_UPDATE",
            Self::PendingDelete => "PENDING_DELETE",
            Self::Error => "ERROR",
        }
    }
}

impl fmt::Display for ProvisioningStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Observed data-plane health of a listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OperatingStatus {
    Online,
    Offline,
    Degraded,
    Error,
    NoMonitor,
}

impl fmt::Display for OperatingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Online => "ONLINE",
            Self::Offline => "OFFLINE",
            Self::Degraded => "DEGRADED",
            Self::Error => "ERROR",
            Self::NoMonitor => "NO_MONITOR",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pending_statuses() {
        assert!(ProvisioningStatus::PendingCreate.is_pending());
        assert!(ProvisioningStatus::PendingUpdate.is_pending());
        assert!(ProvisioningStatus::PendingDelete.is_pending());
        assert!(ProvisioningStatus::Active.is_idle());
        assert!(ProvisioningStatus::Error.is_idle());
    }

    #[test]
    fn test_wire_names() {
        let json = serde_json::to_string(&ProvisioningStatus::PendingUpdate).unwrap();
        assert_eq!(json, "\"PENDING_UPDATE\"");
        assert_eq!(ProvisioningStatus::PendingUpdate.to_string(), "PENDING_UPDATE");

        let status: OperatingStatus = serde_json::from_str("\"NO_MONITOR\"").unwrap();
        assert_eq!(status, OperatingStatus::NoMonitor);
    }
}
