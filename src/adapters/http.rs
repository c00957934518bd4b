//! HTTP dispatch layer: stateless mapping of REST routes onto registry,
//! router and lifecycle operations.
//!
//! Handlers parse path and body, delegate, and serialize the outcome; all
//! error-kind to status-code mapping lives in the
//! [`IntoResponse`] impl for [`GatewayError`]. No business logic here.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};

use crate::domain::{AgentDescriptor, ContainerInfo, GatewayError, Initialize, Message};
use crate::gateway::ContainerGateway;

/// Shared state handed to every route handler.
#[derive(Clone)]
pub struct GatewayState {
    pub gateway: Arc<ContainerGateway>,
    pub invoke_timeout: Duration,
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = match &self {
            GatewayError::TargetNotFound(_) | GatewayError::ActionNotFound(_) => {
                StatusCode::NOT_FOUND
            }
            GatewayError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            GatewayError::MalformedRequest(_) => StatusCode::BAD_REQUEST,
            GatewayError::ActionFailed(_) | GatewayError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

/// Unwrap a JSON body, mapping any axum rejection to a 400.
fn parse_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, GatewayError> {
    body.map(|Json(inner)| inner)
        .map_err(|rejection| GatewayError::MalformedRequest(rejection.body_text()))
}

/// GET /info
pub async fn get_info(State(state): State<GatewayState>) -> Json<ContainerInfo> {
    let (container_id, started_at) = state.gateway.lifecycle().identity().await;
    let agents = state.gateway.registry().list().await;
    Json(ContainerInfo {
        container_id,
        started_at,
        agents,
    })
}

/// GET /agents
pub async fn list_agents(State(state): State<GatewayState>) -> Json<Vec<AgentDescriptor>> {
    Json(state.gateway.registry().list().await)
}

/// GET /agents/{id}
pub async fn get_agent(
    State(state): State<GatewayState>,
    Path(agent_id): Path<String>,
) -> Result<Json<AgentDescriptor>, GatewayError> {
    state
        .gateway
        .registry()
        .lookup_by_id(&agent_id)
        .await
        .map(Json)
        .ok_or(GatewayError::TargetNotFound(agent_id))
}

/// POST /initialize
///
/// A repeated initialize reports `false` with status 200; idempotent
/// rejection is not an HTTP error.
pub async fn initialize(
    State(state): State<GatewayState>,
    body: Result<Json<Initialize>, JsonRejection>,
) -> Result<Json<bool>, GatewayError> {
    let init = parse_body(body)?;
    let accepted = state
        .gateway
        .lifecycle()
        .initialize(init.container_id, init.platform_url)
        .await;
    Ok(Json(accepted))
}

/// POST /shutdown
pub async fn shutdown(State(state): State<GatewayState>) -> Json<bool> {
    Json(state.gateway.shutdown().await)
}

/// POST /send/{id}
pub async fn send_message(
    State(state): State<GatewayState>,
    Path(agent_id): Path<String>,
    body: Result<Json<Message>, JsonRejection>,
) -> Result<StatusCode, GatewayError> {
    let message = parse_body(body)?;
    state.gateway.router().send(&agent_id, message).await?;
    Ok(StatusCode::OK)
}

/// POST /broadcast/{channel}
pub async fn broadcast_message(
    State(state): State<GatewayState>,
    Path(channel): Path<String>,
    body: Result<Json<Message>, JsonRejection>,
) -> Result<StatusCode, GatewayError> {
    let message = parse_body(body)?;
    state.gateway.router().broadcast(&channel, message).await?;
    Ok(StatusCode::OK)
}

/// POST /invoke/{action} (discovery mode)
pub async fn invoke_action(
    State(state): State<GatewayState>,
    Path(action): Path<String>,
    body: Result<Json<HashMap<String, Value>>, JsonRejection>,
) -> Result<Json<Value>, GatewayError> {
    let parameters = parse_body(body)?;
    let result = state
        .gateway
        .router()
        .invoke(&action, parameters, None, state.invoke_timeout)
        .await?;
    Ok(Json(result))
}

/// POST /invoke/{action}/{agentId} (explicit target)
pub async fn invoke_action_of(
    State(state): State<GatewayState>,
    Path((action, agent_id)): Path<(String, String)>,
    body: Result<Json<HashMap<String, Value>>, JsonRejection>,
) -> Result<Json<Value>, GatewayError> {
    let parameters = parse_body(body)?;
    let result = state
        .gateway
        .router()
        .invoke(&action, parameters, Some(&agent_id), state.invoke_timeout)
        .await?;
    Ok(Json(result))
}
