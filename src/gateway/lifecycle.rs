//! Container lifecycle: identity, start time and the parent platform
//! address, gated by a small state machine.

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

/// `Uninitialized -> Initialized -> ShuttingDown -> Shutdown`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Uninitialized,
    Initialized,
    ShuttingDown,
    Shutdown,
}

#[derive(Debug)]
struct LifecycleInner {
    state: LifecycleState,
    container_id: Option<String>,
    parent_platform_url: Option<String>,
    started_at: Option<DateTime<Utc>>,
}

/// Lifecycle state of this container. Identity is set exactly once; the
/// state check and the writes happen under one write lock, so concurrent
/// initializations have exactly one winner.
pub struct ContainerLifecycle {
    inner: RwLock<LifecycleInner>,
}

impl Default for ContainerLifecycle {
    fn default() -> Self {
        Self::new()
    }
}

impl ContainerLifecycle {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(LifecycleInner {
                state: LifecycleState::Uninitialized,
                container_id: None,
                parent_platform_url: None,
                started_at: None,
            }),
        }
    }

    /// Accept the one-time initialize call. Any call while not
    /// `Uninitialized` is a no-op reporting `false`; that is idempotent
    /// rejection, not an error.
    pub async fn initialize(&self, container_id: String, platform_url: String) -> bool {
        let mut inner = self.inner.write().await;
        if inner.state != LifecycleState::Uninitialized {
            tracing::info!("ignoring repeated initialize for '{}'", container_id);
            return false;
        }
        tracing::info!(
            "container '{}' initialized, parent platform at {}",
            container_id,
            platform_url
        );
        inner.state = LifecycleState::Initialized;
        inner.container_id = Some(container_id);
        inner.parent_platform_url = Some(platform_url);
        inner.started_at = Some(Utc::now());
        true
    }

    /// Enter `ShuttingDown` and clear the container identity. Always
    /// acknowledged; in-flight agent work is not awaited. The state stays
    /// `ShuttingDown` until [`finish_shutdown`](Self::finish_shutdown)
    /// reports the drain complete.
    pub async fn begin_shutdown(&self) -> bool {
        let mut inner = self.inner.write().await;
        if matches!(
            inner.state,
            LifecycleState::ShuttingDown | LifecycleState::Shutdown
        ) {
            return true;
        }
        tracing::info!("container shutting down");
        inner.state = LifecycleState::ShuttingDown;
        inner.container_id = None;
        inner.parent_platform_url = None;
        inner.started_at = None;
        true
    }

    /// Enter `Shutdown` once the hosted agents have drained.
    pub async fn finish_shutdown(&self) {
        self.inner.write().await.state = LifecycleState::Shutdown;
    }

    pub async fn state(&self) -> LifecycleState {
        self.inner.read().await.state
    }

    /// Container id and start time; both absent before initialization.
    pub async fn identity(&self) -> (Option<String>, Option<DateTime<Utc>>) {
        let inner = self.inner.read().await;
        (inner.container_id.clone(), inner.started_at)
    }

    /// Base URL of the parent platform, captured at initialization.
    pub async fn parent_url(&self) -> Option<String> {
        self.inner.read().await.parent_platform_url.clone()
    }
}
