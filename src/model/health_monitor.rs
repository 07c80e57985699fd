//! Health monitor records and their API shapes.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::model::status::ProvisioningStatus;

/// Probe type of a health monitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HealthMonitorType {
    Http,
    Https,
    Ping,
    Tcp,
}

impl HealthMonitorType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Http => "HTTP",
            Self::Https => "HTTPS",
            Self::Ping => "PING",
            Self::Tcp => "TCP",
        }
    }
}

impl fmt::Display for HealthMonitorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string is not a known monitor type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownMonitorType(pub String);

impl FromStr for HealthMonitorType {
    type Err = UnknownMonitorType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "HTTP" => Ok(Self::Http),
            "HTTPS" => Ok(Self::Https),
            "PING" => Ok(Self::Ping),
            "TCP" => Ok(Self::Tcp),
            other => Err(UnknownMonitorType(other.to_string())),
        }
    }
}

/// Persisted health monitor. A pool owns at most one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HealthMonitor {
    pub id: Uuid,
    pub pool_id: Uuid,
    pub monitor_type: HealthMonitorType,
    /// Seconds between probes.
    pub delay: u32,
    /// Seconds before a probe times out.
    pub timeout: u32,
    pub max_retries: u32,
    pub http_method: String,
    pub url_path: String,
    pub expected_codes: String,
    pub enabled: bool,
    pub provisioning_status: ProvisioningStatus,
}

/// Fields accepted when creating a monitor.
///
/// `type` and `http_method` are kept as raw strings; the repository decides
/// whether they are storable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthMonitorFields {
    #[serde(rename = "type")]
    pub monitor_type: String,
    pub delay: u32,
    pub timeout: u32,
    pub max_retries: u32,
    #[serde(default = "default_http_method")]
    pub http_method: String,
    #[serde(default = "default_url_path")]
    pub url_path: String,
    #[serde(default = "default_expected_codes")]
    pub expected_codes: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_http_method() -> String {
    "GET".to_string()
}

fn default_url_path() -> String {
    "/".to_string()
}

fn default_expected_codes() -> String {
    "200".to_string()
}

fn default_enabled() -> bool {
    true
}

impl HealthMonitorFields {
    /// Build fields with the default HTTP probe settings.
    pub fn new(monitor_type: impl Into<String>, delay: u32, timeout: u32, max_retries: u32) -> Self {
        Self {
            monitor_type: monitor_type.into(),
            delay,
            timeout,
            max_retries,
            http_method: default_http_method(),
            url_path: default_url_path(),
            expected_codes: default_expected_codes(),
            enabled: default_enabled(),
        }
    }
}

/// Partial update of a monitor. Absent fields keep their current value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthMonitorUpdate {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub monitor_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delay: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_retries: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub http_method: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected_codes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
}

/// Representation returned to API callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthMonitorView {
    pub id: Uuid,
    pub pool_id: Uuid,
    #[serde(rename = "type")]
    pub monitor_type: HealthMonitorType,
    pub delay: u32,
    pub timeout: u32,
    pub max_retries: u32,
    pub http_method: String,
    pub url_path: String,
    pub expected_codes: String,
    pub enabled: bool,
    pub provisioning_status: ProvisioningStatus,
}

impl From<&HealthMonitor> for HealthMonitorView {
    fn from(hm: &HealthMonitor) -> Self {
        Self {
            id: hm.id,
            pool_id: hm.pool_id,
            monitor_type: hm.monitor_type,
            delay: hm.delay,
            timeout: hm.timeout,
            max_retries: hm.max_retries,
            http_method: hm.http_method.clone(),
            url_path: hm.url_path.clone(),
            expected_codes: hm.expected_codes.clone(),
            enabled: hm.enabled,
            provisioning_status: hm.provisioning_status,
        }
    }
}
