//! Core domain types shared by the registry, router and HTTP layer.
//!
//! All wire-facing types serialize with camelCase field names, matching the
//! external gateway contract.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

pub mod error;

pub use error::{GatewayError, GatewayResult};

/// Description of a single hosted agent, including its capabilities.
///
/// Owned by the registry; created on registration, replaced wholesale on
/// re-registration of the same id, removed on deregistration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentDescriptor {
    /// ID of the agent, globally unique, e.g. a UUID
    pub agent_id: String,
    /// Name/type of the agent, e.g. "VehicleAgent"
    pub agent_type: String,
    /// Optional human-readable description of the agent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Actions provided by this agent, if any
    #[serde(default)]
    pub actions: Vec<ActionSpec>,
    /// Endpoints for sending or receiving streaming data
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub streams: Vec<StreamSpec>,
}

impl AgentDescriptor {
    /// Fresh descriptor with a generated unique agent id and no
    /// capabilities yet.
    pub fn new(agent_type: impl Into<String>) -> Self {
        Self {
            agent_id: uuid::Uuid::new_v4().to_string(),
            agent_type: agent_type.into(),
            description: None,
            actions: Vec::new(),
            streams: Vec::new(),
        }
    }

    /// Whether this agent advertises an action with the given name.
    pub fn provides_action(&self, action: &str) -> bool {
        self.actions.iter().any(|a| a.name == action)
    }
}

/// One action advertised by an agent. Immutable once attached to a descriptor.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionSpec {
    /// Name of the action, e.g. "GetInventory"
    pub name: String,
    /// Parameter name to type-tag, e.g. {"item": "String"}
    #[serde(default)]
    pub parameters: HashMap<String, String>,
    /// Type-tag of the action result, e.g. "Int"
    pub result_type: String,
}

/// One streaming endpoint advertised by an agent. Interface description
/// only; the gateway does not transfer stream payloads itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamSpec {
    pub name: String,
    pub mode: StreamMode,
}

/// Direction of a stream endpoint from the caller's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StreamMode {
    Get,
    Post,
}

/// An asynchronous message delivered to one agent (send) or to all
/// subscribers of a channel (broadcast). Transient; never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    /// Opaque structured payload, interpreted only by the receiving agent
    pub payload: Value,
    /// ID of the sending agent (or external caller)
    pub sender_id: String,
}

/// One in-flight action invocation, delivered to the target agent's
/// mailbox. Paired 1:1 with exactly one result or error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvokeRequest {
    /// Name of the action to invoke
    pub action: String,
    /// Parameter name to argument document
    pub parameters: HashMap<String, Value>,
}

/// Body of the one-time initialize call from the parent platform.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Initialize {
    /// ID assigned to this container by the parent platform
    pub container_id: String,
    /// Base URL of the parent platform, for outbound calls
    pub platform_url: String,
}

/// Snapshot of the container returned by the info route. Identity fields
/// are absent until the container has been initialized.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub container_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    pub agents: Vec<AgentDescriptor>,
}
