use axum::{
    extract::{Path, State},
    Json,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use uuid::Uuid;

use crate::control::{ControlError, PoolScope};
use crate::http::response::Accepted;
use crate::http::server::AppState;
use crate::model::{HealthMonitorFields, HealthMonitorUpdate, HealthMonitorView, StatusTree};

#[derive(Serialize)]
pub struct SystemStatus {
    pub version: &'static str,
    pub status: &'static str,
}

/// `/v1/loadbalancers/{load_balancer_id}/pools/{pool_id}/...`
#[derive(Debug, Deserialize)]
pub struct PoolPath {
    pub load_balancer_id: Uuid,
    pub pool_id: Uuid,
}

impl From<PoolPath> for PoolScope {
    fn from(path: PoolPath) -> Self {
        PoolScope::pool(path.load_balancer_id, path.pool_id)
    }
}

/// `/v1/loadbalancers/{load_balancer_id}/listeners/{listener_id}/pools/{pool_id}/...`
#[derive(Debug, Deserialize)]
pub struct ListenerPoolPath {
    pub load_balancer_id: Uuid,
    pub listener_id: Uuid,
    pub pool_id: Uuid,
}

impl From<ListenerPoolPath> for PoolScope {
    fn from(path: ListenerPoolPath) -> Self {
        PoolScope::listener(path.load_balancer_id, path.listener_id, path.pool_id)
    }
}

pub async fn get_status() -> Json<SystemStatus> {
    Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION"),
        status: "operational",
    })
}

pub async fn get_status_tree(
    State(state): State<AppState>,
    Path(load_balancer_id): Path<Uuid>,
) -> Result<Json<StatusTree>, ControlError> {
    let tree = state.controller.status_tree(load_balancer_id).await?;
    Ok(Json(tree))
}

pub async fn get_health_monitor<P>(
    State(state): State<AppState>,
    Path(path): Path<P>,
) -> Result<Json<HealthMonitorView>, ControlError>
where
    P: DeserializeOwned + Into<PoolScope> + Send,
{
    let scope = path.into();
    let view = state.controller.get(&scope).await?;
    Ok(Json(view))
}

pub async fn create_health_monitor<P>(
    State(state): State<AppState>,
    Path(path): Path<P>,
    Json(fields): Json<HealthMonitorFields>,
) -> Result<Accepted<HealthMonitorView>, ControlError>
where
    P: DeserializeOwned + Into<PoolScope> + Send,
{
    let scope = path.into();
    let view = state.controller.create(&scope, fields).await?;
    Ok(Accepted(view))
}

pub async fn update_health_monitor<P>(
    State(state): State<AppState>,
    Path(path): Path<P>,
    Json(changes): Json<HealthMonitorUpdate>,
) -> Result<Accepted<HealthMonitorView>, ControlError>
where
    P: DeserializeOwned + Into<PoolScope> + Send,
{
    let scope = path.into();
    let view = state.controller.update(&scope, changes).await?;
    Ok(Accepted(view))
}

pub async fn delete_health_monitor<P>(
    State(state): State<AppState>,
    Path(path): Path<P>,
) -> Result<Accepted<Option<HealthMonitorView>>, ControlError>
where
    P: DeserializeOwned + Into<PoolScope> + Send,
{
    let scope = path.into();
    let view = state.controller.delete(&scope).await?;
    Ok(Accepted(view))
}
