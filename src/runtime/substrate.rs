//! Mailbox and topic bookkeeping for hosted agents.

use std::collections::HashMap;

use tokio::sync::{mpsc, RwLock};

use crate::domain::{GatewayError, GatewayResult, Message};
use crate::runtime::{run_agent, AgentEvent, ContainerizedAgent};

/// The in-process actor substrate: one bounded mpsc mailbox per agent plus
/// a channel-name to subscriber table for broadcast fan-out.
///
/// Messages to the same agent are delivered in submission order per sender
/// (mpsc FIFO); no ordering is guaranteed across agents or across senders.
pub struct AgentRuntime {
    mailboxes: RwLock<HashMap<String, mpsc::Sender<AgentEvent>>>,
    subscriptions: RwLock<HashMap<String, Vec<String>>>,
    tasks: RwLock<HashMap<String, tokio::task::JoinHandle<()>>>,
    mailbox_capacity: usize,
}

impl AgentRuntime {
    /// `mailbox_capacity` is clamped to at least 1; mpsc channels cannot
    /// have a zero bound.
    pub fn new(mailbox_capacity: usize) -> Self {
        Self {
            mailboxes: RwLock::new(HashMap::new()),
            subscriptions: RwLock::new(HashMap::new()),
            tasks: RwLock::new(HashMap::new()),
            mailbox_capacity: mailbox_capacity.max(1),
        }
    }

    /// Spawn an agent: create its mailbox, record its subscriptions and
    /// start the mailbox loop on a dedicated task. Spawning a second agent
    /// with the same id replaces the first one's mailbox; the old loop ends
    /// once its queue drains.
    pub async fn spawn<A: ContainerizedAgent>(&self, agent: A) {
        let desc = agent.description();
        let (tx, rx) = mpsc::channel(self.mailbox_capacity);

        self.mailboxes
            .write()
            .await
            .insert(desc.agent_id.clone(), tx);

        let mut subscriptions = self.subscriptions.write().await;
        for channel in agent.subscriptions() {
            let subscribers = subscriptions.entry(channel).or_default();
            if !subscribers.contains(&desc.agent_id) {
                subscribers.push(desc.agent_id.clone());
            }
        }
        drop(subscriptions);

        let handle = tokio::spawn(run_agent(agent, rx));
        self.tasks.write().await.insert(desc.agent_id, handle);
    }

    /// Drop an agent's mailbox and subscriptions. The agent task ends after
    /// handling whatever was already queued.
    pub async fn remove(&self, agent_id: &str) {
        self.mailboxes.write().await.remove(agent_id);
        self.tasks.write().await.remove(agent_id);
        let mut subscriptions = self.subscriptions.write().await;
        for subscribers in subscriptions.values_mut() {
            subscribers.retain(|id| id != agent_id);
        }
    }

    /// Whether a live mailbox exists for the given agent id.
    pub async fn is_live(&self, agent_id: &str) -> bool {
        self.mailboxes.read().await.contains_key(agent_id)
    }

    /// Deliver one event to one agent's mailbox, awaiting queue capacity.
    pub async fn deliver(&self, agent_id: &str, event: AgentEvent) -> GatewayResult<()> {
        let sender = self
            .mailboxes
            .read()
            .await
            .get(agent_id)
            .cloned()
            .ok_or_else(|| GatewayError::TargetNotFound(agent_id.to_string()))?;

        sender
            .send(event)
            .await
            .map_err(|_| GatewayError::TargetNotFound(agent_id.to_string()))
    }

    /// Publish a message to every subscriber of a channel, best-effort.
    /// Full or closed mailboxes are skipped; zero subscribers is fine.
    /// Returns the number of copies submitted.
    pub async fn publish(&self, channel: &str, message: &Message) -> usize {
        let subscribers = self
            .subscriptions
            .read()
            .await
            .get(channel)
            .cloned()
            .unwrap_or_default();

        let mailboxes = self.mailboxes.read().await;
        let mut delivered = 0;
        for agent_id in &subscribers {
            if let Some(sender) = mailboxes.get(agent_id) {
                match sender.try_send(AgentEvent::Message(message.clone())) {
                    Ok(()) => delivered += 1,
                    Err(_) => {
                        tracing::debug!("dropping broadcast on '{}' for '{}'", channel, agent_id)
                    }
                }
            }
        }
        delivered
    }

    /// Close every mailbox and hand back the agent task handles. Each task
    /// finishes its queued work and stops; awaiting the returned handles
    /// observes the drain.
    pub async fn close_all(&self) -> Vec<tokio::task::JoinHandle<()>> {
        self.mailboxes.write().await.clear();
        self.subscriptions.write().await.clear();
        self.tasks.write().await.drain().map(|(_, handle)| handle).collect()
    }
}
