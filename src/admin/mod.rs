//! Health monitor management API.
//!
//! Every route except `/v1/status` requires the admin bearer token.

pub mod auth;
pub mod handlers;

use axum::{middleware, routing::get, Router};

use self::auth::api_key_auth;
use self::handlers::*;
use crate::http::server::AppState;

const POOL_MONITOR: &str = "/v1/loadbalancers/{load_balancer_id}/pools/{pool_id}/healthmonitor";
const LISTENER_POOL_MONITOR: &str =
    "/v1/loadbalancers/{load_balancer_id}/listeners/{listener_id}/pools/{pool_id}/healthmonitor";

pub fn setup_admin_router(state: AppState) -> Router {
    let protected = Router::new()
        .route(
            POOL_MONITOR,
            get(get_health_monitor::<PoolPath>)
                .post(create_health_monitor::<PoolPath>)
                .put(update_health_monitor::<PoolPath>)
                .delete(delete_health_monitor::<PoolPath>),
        )
        .route(
            LISTENER_POOL_MONITOR,
            get(get_health_monitor::<ListenerPoolPath>)
                .post(create_health_monitor::<ListenerPoolPath>)
                .put(update_health_monitor::<ListenerPoolPath>)
                .delete(delete_health_monitor::<ListenerPoolPath>),
        )
        .route("/v1/loadbalancers/{load_balancer_id}/status", get(get_status_tree))
        .route_layer(middleware::from_fn_with_state(state.clone(), api_key_auth));

    Router::new()
        .route("/v1/status", get(get_status))
        .merge(protected)
        .with_state(state)
}
