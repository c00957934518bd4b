//! Minimal actor substrate hosting the container's agents.
//!
//! The gateway only requires two guarantees from the runtime: FIFO mailbox
//! delivery per agent, and invocation of the reply callback for invoke
//! requests. This module provides exactly that on top of tokio tasks and
//! mpsc channels; it is not a general-purpose scheduler.

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::mpsc;

pub mod substrate;

pub use substrate::AgentRuntime;

use crate::domain::{AgentDescriptor, InvokeRequest, Message};
use crate::gateway::bridge::ReplyHandle;

/// One event drawn from an agent's mailbox.
#[derive(Debug)]
pub enum AgentEvent {
    /// A unicast or broadcast message; fire-and-forget
    Message(Message),
    /// An action invocation; `reply` must be resolved exactly once
    Invoke {
        request: InvokeRequest,
        reply: ReplyHandle,
    },
}

/// A hosted agent. Implementations provide their capability descriptor and
/// react to mailbox events; the runtime serializes event handling per agent,
/// so handlers may hold mutable state without further locking.
#[async_trait]
pub trait ContainerizedAgent: Send + 'static {
    /// Capability descriptor registered with the gateway at spawn time.
    fn description(&self) -> AgentDescriptor;

    /// Broadcast channels this agent subscribes to.
    fn subscriptions(&self) -> Vec<String> {
        Vec::new()
    }

    /// React to an inbound message. Errors are the agent's own business;
    /// there is no caller to report to.
    async fn on_message(&mut self, message: Message);

    /// Handle an action invocation, returning the result document or an
    /// application-level error detail.
    async fn on_invoke(&mut self, request: InvokeRequest) -> Result<Value, String>;
}

/// Drive one agent's mailbox until all senders are gone.
pub(crate) async fn run_agent<A: ContainerizedAgent>(
    mut agent: A,
    mut mailbox: mpsc::Receiver<AgentEvent>,
) {
    let agent_id = agent.description().agent_id;
    tracing::debug!("agent '{}' mailbox loop started", agent_id);

    while let Some(event) = mailbox.recv().await {
        match event {
            AgentEvent::Message(message) => agent.on_message(message).await,
            AgentEvent::Invoke { request, reply } => {
                let action = request.action.clone();
                match agent.on_invoke(request).await {
                    Ok(value) => reply.resolve(value),
                    Err(detail) => {
                        tracing::debug!("agent '{}' failed action '{}': {}", agent_id, action, detail);
                        reply.reject(detail);
                    }
                }
            }
        }
    }

    tracing::debug!("agent '{}' mailbox closed, stopping", agent_id);
}
