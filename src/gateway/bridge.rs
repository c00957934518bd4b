//! Synchronization bridge: turns one asynchronous reply into a value a
//! waiting caller can block on.
//!
//! Each invoke owns a private one-shot channel; nothing is shared across
//! unrelated calls, so slow invokes never serialize behind each other. The
//! one-shot sender enforces at the type level that a call resolves at most
//! once, and a reply arriving after the caller timed out is discarded when
//! the send hits a dropped receiver.

use std::time::Duration;

use serde_json::Value;
use tokio::sync::oneshot;

use crate::domain::{GatewayError, GatewayResult};

/// The resolving side of one pending invoke, handed to the target agent's
/// mailbox loop. Consumed on resolution.
#[derive(Debug)]
pub struct ReplyHandle {
    tx: oneshot::Sender<Result<Value, String>>,
}

impl ReplyHandle {
    /// Deliver the success value. A no-op if the caller already gave up.
    pub fn resolve(self, value: Value) {
        self.deliver(Ok(value));
    }

    /// Deliver an application-level error detail from the agent.
    pub fn reject(self, detail: impl Into<String>) {
        self.deliver(Err(detail.into()));
    }

    fn deliver(self, outcome: Result<Value, String>) {
        if self.tx.send(outcome).is_err() {
            tracing::trace!("reply arrived for a retired call, discarding");
        }
    }
}

/// The waiting side of one pending invoke.
#[derive(Debug)]
pub struct PendingCall {
    rx: oneshot::Receiver<Result<Value, String>>,
}

impl PendingCall {
    /// Wait for the reply, up to `timeout`. Exactly one of four outcomes:
    /// the agent's value, the agent's error (as `ActionFailed`), `Timeout`,
    /// or `Internal` if the reply handle was dropped unresolved.
    pub async fn wait(self, timeout: Duration) -> GatewayResult<Value> {
        match tokio::time::timeout(timeout, self.rx).await {
            Ok(Ok(Ok(value))) => Ok(value),
            Ok(Ok(Err(detail))) => Err(GatewayError::ActionFailed(detail)),
            Ok(Err(_)) => Err(GatewayError::Internal(
                "invoke reply was dropped without resolution".to_string(),
            )),
            Err(_) => Err(GatewayError::Timeout(timeout)),
        }
    }
}

/// Open a fresh correlation between one blocking caller and one eventual
/// asynchronous reply.
pub fn pending_call() -> (ReplyHandle, PendingCall) {
    let (tx, rx) = oneshot::channel();
    (ReplyHandle { tx }, PendingCall { rx })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_resolve_delivers_value() {
        let (reply, call) = pending_call();
        reply.resolve(json!(42));
        let value = call.wait(Duration::from_secs(1)).await.unwrap();
        assert_eq!(value, json!(42));
    }

    #[tokio::test]
    async fn test_reject_becomes_action_failed() {
        let (reply, call) = pending_call();
        reply.reject("boom");
        let err = call.wait(Duration::from_secs(1)).await.unwrap_err();
        match err {
            GatewayError::ActionFailed(detail) => assert_eq!(detail, "boom"),
            other => panic!("expected ActionFailed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_timeout_then_late_reply_is_discarded() {
        let (reply, call) = pending_call();

        let err = call.wait(Duration::from_millis(20)).await.unwrap_err();
        assert!(matches!(err, GatewayError::Timeout(_)));

        // the call is retired; a late resolve must have no effect
        reply.resolve(json!("too late"));
    }

    #[tokio::test]
    async fn test_dropped_reply_is_internal_error() {
        let (reply, call) = pending_call();
        drop(reply);
        let err = call.wait(Duration::from_secs(1)).await.unwrap_err();
        assert!(matches!(err, GatewayError::Internal(_)));
    }

    #[tokio::test]
    async fn test_independent_calls_do_not_interfere() {
        let (reply_a, call_a) = pending_call();
        let (_reply_b, call_b) = pending_call();

        reply_a.resolve(json!("a"));
        assert_eq!(call_a.wait(Duration::from_secs(1)).await.unwrap(), json!("a"));

        // b is untouched by a's resolution
        let err = call_b.wait(Duration::from_millis(20)).await.unwrap_err();
        assert!(matches!(err, GatewayError::Timeout(_)));
    }
}
