//! Outbound proxy toward the parent platform, one level up.
//!
//! Hosted agents use this for outbound send/broadcast/invoke; the routes
//! mirror the container's own HTTP contract, so the proxy is structurally
//! symmetric to the inbound dispatch layer.

use std::collections::HashMap;
use std::time::Duration;

use reqwest::StatusCode;
use serde_json::Value;

use crate::domain::{AgentDescriptor, GatewayError, GatewayResult, Message};
use crate::gateway::ContainerLifecycle;

pub struct ParentProxy {
    base_url: String,
    client: reqwest::Client,
}

impl ParentProxy {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            client: reqwest::Client::new(),
        }
    }

    /// Proxy for the platform URL captured at container initialization.
    /// Fails if the container has not been initialized yet.
    pub async fn from_lifecycle(lifecycle: &ContainerLifecycle) -> GatewayResult<Self> {
        lifecycle
            .parent_url()
            .await
            .map(Self::new)
            .ok_or_else(|| {
                GatewayError::Internal("container has no parent platform (not initialized)".to_string())
            })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// GET /info at the parent; platform info documents differ from
    /// container info, so the body stays opaque.
    pub async fn info(&self) -> GatewayResult<Value> {
        let response = self.client.get(self.url("/info")).send().await?;
        Ok(response.error_for_status()?.json().await?)
    }

    /// GET /agents at the parent.
    pub async fn agents(&self) -> GatewayResult<Vec<AgentDescriptor>> {
        let response = self.client.get(self.url("/agents")).send().await?;
        Ok(response.error_for_status()?.json().await?)
    }

    /// POST /send/{id} at the parent.
    pub async fn send(&self, agent_id: &str, message: &Message) -> GatewayResult<()> {
        tracing::debug!("outbound send to '{}' via {}", agent_id, self.base_url);
        let response = self
            .client
            .post(self.url(&format!("/send/{agent_id}")))
            .json(message)
            .send()
            .await?;
        Self::check(response, || GatewayError::TargetNotFound(agent_id.to_string())).await?;
        Ok(())
    }

    /// POST /broadcast/{channel} at the parent.
    pub async fn broadcast(&self, channel: &str, message: &Message) -> GatewayResult<()> {
        tracing::debug!("outbound broadcast on '{}' via {}", channel, self.base_url);
        let response = self
            .client
            .post(self.url(&format!("/broadcast/{channel}")))
            .json(message)
            .send()
            .await?;
        response.error_for_status()?;
        Ok(())
    }

    /// POST /invoke/{action} or /invoke/{action}/{agentId} at the parent.
    pub async fn invoke(
        &self,
        action: &str,
        parameters: &HashMap<String, Value>,
        agent_id: Option<&str>,
    ) -> GatewayResult<Value> {
        let path = match agent_id {
            Some(agent_id) => format!("/invoke/{action}/{agent_id}"),
            None => format!("/invoke/{action}"),
        };
        tracing::debug!("outbound invoke '{}' via {}", action, self.base_url);
        let response = self
            .client
            .post(self.url(&path))
            .json(parameters)
            .send()
            .await?;
        let response =
            Self::check(response, || GatewayError::ActionNotFound(action.to_string())).await?;
        Ok(response.json().await?)
    }

    /// Translate the parent's error statuses back into gateway error kinds.
    async fn check(
        response: reqwest::Response,
        not_found: impl FnOnce() -> GatewayError,
    ) -> GatewayResult<reqwest::Response> {
        match response.status() {
            StatusCode::NOT_FOUND => Err(not_found()),
            StatusCode::GATEWAY_TIMEOUT | StatusCode::REQUEST_TIMEOUT => {
                Err(GatewayError::Timeout(Duration::ZERO))
            }
            status if status.is_client_error() || status.is_server_error() => {
                let detail = response.text().await.unwrap_or_default();
                Err(GatewayError::ActionFailed(detail))
            }
            _ => Ok(response),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_is_normalized() {
        let proxy = ParentProxy::new("http://parent:8000/");
        assert_eq!(proxy.url("/agents"), "http://parent:8000/agents");

        let proxy = ParentProxy::new("http://parent:8000");
        assert_eq!(
            proxy.url("/invoke/Add/agent-1"),
            "http://parent:8000/invoke/Add/agent-1"
        );
    }

    #[tokio::test]
    async fn test_from_lifecycle_requires_initialization() {
        let lifecycle = ContainerLifecycle::new();
        assert!(ParentProxy::from_lifecycle(&lifecycle).await.is_err());

        lifecycle
            .initialize("c-1".to_string(), "http://parent:8000".to_string())
            .await;
        let proxy = ParentProxy::from_lifecycle(&lifecycle).await.unwrap();
        assert_eq!(proxy.base_url, "http://parent:8000");
    }
}
