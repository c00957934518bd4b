//! Error types for the gateway

use std::time::Duration;
use thiserror::Error;

/// Errors that can occur while routing requests through the gateway.
///
/// Routing failures ([`TargetNotFound`](GatewayError::TargetNotFound),
/// [`ActionNotFound`](GatewayError::ActionNotFound)) are kept distinct from
/// failures raised by the addressed agent itself
/// ([`ActionFailed`](GatewayError::ActionFailed)), so a caller can tell
/// "the agent couldn't be reached" from "the agent ran and failed".
#[derive(Debug, Error)]
pub enum GatewayError {
    /// No live agent with the given id
    #[error("Agent not found: {0}")]
    TargetNotFound(String),

    /// No registered agent advertises the given action
    #[error("No agent provides action: {0}")]
    ActionNotFound(String),

    /// The addressed agent handled the invoke and reported a failure
    #[error("Action failed: {0}")]
    ActionFailed(String),

    /// No reply arrived within the invoke deadline. A zero duration means
    /// the deadline was enforced elsewhere (e.g. by an upstream gateway)
    /// and is not known here.
    #[error("{}", timeout_detail(.0))]
    Timeout(Duration),

    /// Request body or path could not be parsed
    #[error("Malformed request: {0}")]
    MalformedRequest(String),

    /// Unexpected failure in the bridge or router
    #[error("Internal dispatch error: {0}")]
    Internal(String),
}

fn timeout_detail(timeout: &Duration) -> String {
    if timeout.is_zero() {
        "Invoke timed out".to_string()
    } else {
        format!("Invoke timed out after {}ms", timeout.as_millis())
    }
}

impl From<reqwest::Error> for GatewayError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            GatewayError::Timeout(Duration::ZERO)
        } else {
            GatewayError::Internal(err.to_string())
        }
    }
}

/// Result type alias for gateway operations
pub type GatewayResult<T> = Result<T, GatewayError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = GatewayError::TargetNotFound("agent-1".to_string());
        assert_eq!(err.to_string(), "Agent not found: agent-1");

        let err = GatewayError::Timeout(Duration::from_secs(30));
        assert_eq!(err.to_string(), "Invoke timed out after 30000ms");
    }

    #[test]
    fn test_timeout_without_known_deadline_omits_duration() {
        let err = GatewayError::Timeout(Duration::ZERO);
        assert_eq!(err.to_string(), "Invoke timed out");
    }
}
