//! Message router: resolves targets and dispatches unicast sends, topic
//! broadcasts and blocking invokes onto the actor substrate.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;

use crate::domain::{GatewayError, GatewayResult, InvokeRequest, Message};
use crate::gateway::bridge::pending_call;
use crate::gateway::registry::AgentRegistry;
use crate::runtime::{AgentEvent, AgentRuntime};

pub struct MessageRouter {
    runtime: Arc<AgentRuntime>,
    registry: Arc<AgentRegistry>,
}

impl MessageRouter {
    pub fn new(runtime: Arc<AgentRuntime>, registry: Arc<AgentRegistry>) -> Self {
        Self { runtime, registry }
    }

    /// Deliver one message directly to one agent's mailbox. An unresolvable
    /// target is reported to the caller, never silently dropped.
    pub async fn send(&self, agent_id: &str, message: Message) -> GatewayResult<()> {
        tracing::debug!("send from '{}' to '{}'", message.sender_id, agent_id);
        self.runtime
            .deliver(agent_id, AgentEvent::Message(message))
            .await
    }

    /// Publish one message to a named channel, best-effort, at-most-once.
    /// Zero subscribers is success.
    pub async fn broadcast(&self, channel: &str, message: Message) -> GatewayResult<()> {
        let delivered = self.runtime.publish(channel, &message).await;
        tracing::debug!("broadcast on '{}' reached {} subscriber(s)", channel, delivered);
        Ok(())
    }

    /// Invoke an action and block until its result, the agent's error, or
    /// the timeout; exactly one of the three. With an explicit `target`
    /// the registry is bypassed; otherwise the action name is resolved via
    /// the registry's discovery policy. No automatic retry either way.
    pub async fn invoke(
        &self,
        action: &str,
        parameters: HashMap<String, Value>,
        target: Option<&str>,
        timeout: Duration,
    ) -> GatewayResult<Value> {
        let agent_id = match target {
            Some(agent_id) => agent_id.to_string(),
            None => self
                .registry
                .lookup_by_action(action)
                .await
                .map(|desc| desc.agent_id)
                .ok_or_else(|| GatewayError::ActionNotFound(action.to_string()))?,
        };

        tracing::debug!("invoke '{}' at '{}'", action, agent_id);

        let (reply, call) = pending_call();
        let request = InvokeRequest {
            action: action.to_string(),
            parameters,
        };
        self.runtime
            .deliver(&agent_id, AgentEvent::Invoke { request, reply })
            .await?;

        call.wait(timeout).await
    }
}
