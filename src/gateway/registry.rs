//! Agent registry: agent id to capability descriptor, safe for concurrent
//! registration and lookup.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::domain::AgentDescriptor;

/// Tie-break when several registered agents advertise the same action name.
/// Candidates are always presented in registration order.
pub trait DiscoveryPolicy: Send + Sync {
    fn select(&self, candidates: Vec<AgentDescriptor>) -> Option<AgentDescriptor>;
}

/// Default policy: the agent that registered first wins.
pub struct FirstRegistered;

impl DiscoveryPolicy for FirstRegistered {
    fn select(&self, candidates: Vec<AgentDescriptor>) -> Option<AgentDescriptor> {
        candidates.into_iter().next()
    }
}

/// Alternative policy: the lexicographically smallest agent id wins,
/// independent of registration order.
pub struct LexicographicId;

impl DiscoveryPolicy for LexicographicId {
    fn select(&self, candidates: Vec<AgentDescriptor>) -> Option<AgentDescriptor> {
        candidates.into_iter().min_by(|a, b| a.agent_id.cmp(&b.agent_id))
    }
}

struct RegistryInner {
    /// agent id -> live descriptor
    descriptors: HashMap<String, AgentDescriptor>,
    /// registration order of the ids in `descriptors`
    order: Vec<String>,
}

/// The container's directory of registered agents.
///
/// Re-registering an existing id replaces the descriptor wholesale but
/// keeps the agent's original position in registration order, so discovery
/// stays reproducible across capability updates.
pub struct AgentRegistry {
    inner: RwLock<RegistryInner>,
    policy: Arc<dyn DiscoveryPolicy>,
}

impl AgentRegistry {
    pub fn new(policy: Arc<dyn DiscoveryPolicy>) -> Self {
        Self {
            inner: RwLock::new(RegistryInner {
                descriptors: HashMap::new(),
                order: Vec::new(),
            }),
            policy,
        }
    }

    /// Insert or replace the descriptor keyed by its agent id.
    pub async fn register(&self, descriptor: AgentDescriptor) {
        let mut inner = self.inner.write().await;
        let agent_id = descriptor.agent_id.clone();
        if inner.descriptors.insert(agent_id.clone(), descriptor).is_none() {
            inner.order.push(agent_id.clone());
        }
        tracing::info!("registered agent '{}'", agent_id);
    }

    /// Remove the descriptor if present; idempotent.
    pub async fn deregister(&self, agent_id: &str) {
        let mut inner = self.inner.write().await;
        if inner.descriptors.remove(agent_id).is_some() {
            inner.order.retain(|id| id != agent_id);
            tracing::info!("deregistered agent '{}'", agent_id);
        }
    }

    /// Snapshot of all registered descriptors, in registration order.
    pub async fn list(&self) -> Vec<AgentDescriptor> {
        let inner = self.inner.read().await;
        inner
            .order
            .iter()
            .filter_map(|id| inner.descriptors.get(id).cloned())
            .collect()
    }

    pub async fn lookup_by_id(&self, agent_id: &str) -> Option<AgentDescriptor> {
        self.inner.read().await.descriptors.get(agent_id).cloned()
    }

    /// Find an agent advertising the given action. With multiple
    /// candidates, the configured discovery policy decides.
    pub async fn lookup_by_action(&self, action: &str) -> Option<AgentDescriptor> {
        let candidates: Vec<AgentDescriptor> = {
            let inner = self.inner.read().await;
            inner
                .order
                .iter()
                .filter_map(|id| inner.descriptors.get(id))
                .filter(|desc| desc.provides_action(action))
                .cloned()
                .collect()
        };
        self.policy.select(candidates)
    }
}
