//! The gateway core: registry, synchronization bridge, message router and
//! container lifecycle, composed into one explicitly constructed object.

use std::sync::Arc;

use crate::config::GatewaySettings;
use crate::domain::GatewayResult;
use crate::runtime::{AgentRuntime, ContainerizedAgent};

pub mod bridge;
pub mod lifecycle;
pub mod registry;
pub mod router;

pub use lifecycle::{ContainerLifecycle, LifecycleState};
pub use registry::{AgentRegistry, DiscoveryPolicy, FirstRegistered, LexicographicId};
pub use router::MessageRouter;

/// The agent container gateway. Owns all mutable gateway state; built in
/// `main` (or a test) and torn down via [`ContainerGateway::shutdown`] --
/// there is no ambient process-global state.
pub struct ContainerGateway {
    registry: Arc<AgentRegistry>,
    runtime: Arc<AgentRuntime>,
    router: Arc<MessageRouter>,
    lifecycle: Arc<ContainerLifecycle>,
}

impl ContainerGateway {
    pub fn new(settings: &GatewaySettings) -> Self {
        let registry = Arc::new(AgentRegistry::new(settings.discovery.policy()));
        let runtime = Arc::new(AgentRuntime::new(settings.mailbox_capacity));
        let router = Arc::new(MessageRouter::new(runtime.clone(), registry.clone()));
        let lifecycle = Arc::new(ContainerLifecycle::new());
        Self {
            registry,
            runtime,
            router,
            lifecycle,
        }
    }

    /// Host an agent: register its capability descriptor and start its
    /// mailbox loop, subscribing it to its broadcast channels.
    pub async fn spawn_agent<A: ContainerizedAgent>(&self, agent: A) {
        self.registry.register(agent.description()).await;
        self.runtime.spawn(agent).await;
    }

    /// Deregister an agent and close its mailbox; idempotent.
    pub async fn remove_agent(&self, agent_id: &str) {
        self.registry.deregister(agent_id).await;
        self.runtime.remove(agent_id).await;
    }

    /// Best-effort shutdown: stop accepting work, close every mailbox and
    /// clear the container identity. Always acknowledges; queued agent
    /// work may still finish after this returns. The lifecycle stays in
    /// `ShuttingDown` while the agent tasks drain and reaches `Shutdown`
    /// once they have all ended.
    pub async fn shutdown(&self) -> bool {
        let acknowledged = self.lifecycle.begin_shutdown().await;
        let handles = self.runtime.close_all().await;
        let lifecycle = self.lifecycle.clone();
        tokio::spawn(async move {
            for handle in handles {
                let _ = handle.await;
            }
            lifecycle.finish_shutdown().await;
        });
        acknowledged
    }

    pub fn registry(&self) -> &Arc<AgentRegistry> {
        &self.registry
    }

    pub fn router(&self) -> &Arc<MessageRouter> {
        &self.router
    }

    pub fn lifecycle(&self) -> &Arc<ContainerLifecycle> {
        &self.lifecycle
    }

    /// Base URL of the parent platform; available once initialized.
    pub async fn parent_url(&self) -> GatewayResult<String> {
        self.lifecycle.parent_url().await.ok_or_else(|| {
            crate::domain::GatewayError::Internal(
                "container has no parent platform (not initialized)".to_string(),
            )
        })
    }
}
