use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum ClientError {
    /// The control plane answered with a non-success status.
    #[error("control plane returned {status}: {kind}: {message}")]
    Api {
        status: StatusCode,
        kind: String,
        message: String,
    },

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

impl ClientError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            ClientError::Transport(e) => e.status(),
        }
    }

    /// Error kind from the response body, e.g. `ImmutableObject`.
    pub fn kind(&self) -> Option<&str> {
        match self {
            ClientError::Api { kind, .. } => Some(kind),
            ClientError::Transport(_) => None,
        }
    }
}

/// Body of a create request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthMonitorSpec {
    #[serde(rename = "type")]
    pub monitor_type: String,
    pub delay: u32,
    pub timeout: u32,
    pub max_retries: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub http_method: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected_codes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
}

impl HealthMonitorSpec {
    pub fn new(monitor_type: &str, delay: u32, timeout: u32, max_retries: u32) -> Self {
        Self {
            monitor_type: monitor_type.to_string(),
            delay,
            timeout,
            max_retries,
            http_method: None,
            url_path: None,
            expected_codes: None,
            enabled: None,
        }
    }
}

/// Body of an update request. Unset fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
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

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthMonitor {
    pub id: Uuid,
    pub pool_id: Uuid,
    #[serde(rename = "type")]
    pub monitor_type: String,
    pub delay: u32,
    pub timeout: u32,
    pub max_retries: u32,
    pub http_method: String,
    pub url_path: String,
    pub expected_codes: String,
    pub enabled: bool,
    pub provisioning_status: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoadBalancerStatus {
    pub id: Uuid,
    pub name: String,
    pub provisioning_status: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ListenerStatus {
    pub id: Uuid,
    pub name: String,
    pub protocol_port: u16,
    pub provisioning_status: String,
    pub operating_status: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StatusTree {
    pub load_balancer: LoadBalancerStatus,
    pub listeners: Vec<ListenerStatus>,
}

impl StatusTree {
    /// True when the load balancer and every listener are `ACTIVE`.
    pub fn is_active(&self) -> bool {
        self.load_balancer.provisioning_status == "ACTIVE"
            && self.listeners.iter().all(|l| l.provisioning_status == "ACTIVE")
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
    message: String,
}

pub struct ControlPlaneClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl ControlPlaneClient {
    pub fn new(base_url: &str, api_key: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }

    fn monitor_url(&self, load_balancer: Uuid, listener: Option<Uuid>, pool: Uuid) -> String {
        match listener {
            Some(listener) => format!(
                "{}/v1/loadbalancers/{}/listeners/{}/pools/{}/healthmonitor",
                self.base_url, load_balancer, listener, pool
            ),
            None => format!(
                "{}/v1/loadbalancers/{}/pools/{}/healthmonitor",
                self.base_url, load_balancer, pool
            ),
        }
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ClientError> {
        let resp = request.bearer_auth(&self.api_key).send().await?;
        let status = resp.status();
        if status.is_success() {
            return Ok(resp.json().await?);
        }

        let text = resp.text().await?;
        let (kind, message) = match serde_json::from_str::<ErrorBody>(&text) {
            Ok(body) => (body.error, body.message),
            Err(_) => (status.canonical_reason().unwrap_or("Unknown").to_string(), text),
        };
        Err(ClientError::Api { status, kind, message })
    }

    pub async fn service_status(&self) -> Result<serde_json::Value, ClientError> {
        self.send(self.client.get(format!("{}/v1/status", self.base_url))).await
    }

    /// Provisioning and operating status of a load balancer and its listeners.
    pub async fn status_tree(&self, load_balancer: Uuid) -> Result<StatusTree, ClientError> {
        let url = format!("{}/v1/loadbalancers/{}/status", self.base_url, load_balancer);
        self.send(self.client.get(url)).await
    }

    pub async fn get_health_monitor(
        &self,
        load_balancer: Uuid,
        listener: Option<Uuid>,
        pool: Uuid,
    ) -> Result<HealthMonitor, ClientError> {
        let url = self.monitor_url(load_balancer, listener, pool);
        self.send(self.client.get(url)).await
    }

    pub async fn create_health_monitor(
        &self,
        load_balancer: Uuid,
        listener: Option<Uuid>,
        pool: Uuid,
        request: &HealthMonitorSpec,
    ) -> Result<HealthMonitor, ClientError> {
        let url = self.monitor_url(load_balancer, listener, pool);
        self.send(self.client.post(url).json(request)).await
    }

    pub async fn update_health_monitor(
        &self,
        load_balancer: Uuid,
        listener: Option<Uuid>,
        pool: Uuid,
        changes: &HealthMonitorUpdate,
    ) -> Result<HealthMonitor, ClientError> {
        let url = self.monitor_url(load_balancer, listener, pool);
        self.send(self.client.put(url).json(changes)).await
    }

    /// Returns the monitor while deletion is still pending, `None` once gone.
    pub async fn delete_health_monitor(
        &self,
        load_balancer: Uuid,
        listener: Option<Uuid>,
        pool: Uuid,
    ) -> Result<Option<HealthMonitor>, ClientError> {
        let url = self.monitor_url(load_balancer, listener, pool);
        self.send(self.client.delete(url)).await
    }
}
