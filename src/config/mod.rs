use config::{Config, File};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

use crate::cli::Cli;
use crate::gateway::registry::{DiscoveryPolicy, FirstRegistered, LexicographicId};

#[derive(Debug, Deserialize, Serialize)]
pub struct Settings {
    pub server: ServerSettings,
    #[serde(default)]
    pub gateway: GatewaySettings,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct GatewaySettings {
    /// Default deadline for invoke calls, in seconds
    #[serde(default = "default_invoke_timeout")]
    pub invoke_timeout_seconds: u64,
    /// Bound of each agent's mailbox queue; values below 1 are clamped
    /// to 1 by the runtime
    #[serde(default = "default_mailbox_capacity")]
    pub mailbox_capacity: usize,
    /// Tie-break when several agents advertise the same action
    #[serde(default)]
    pub discovery: DiscoveryPolicyKind,
}

impl Default for GatewaySettings {
    fn default() -> Self {
        Self {
            invoke_timeout_seconds: default_invoke_timeout(),
            mailbox_capacity: default_mailbox_capacity(),
            discovery: DiscoveryPolicyKind::default(),
        }
    }
}

impl GatewaySettings {
    pub fn invoke_timeout(&self) -> Duration {
        Duration::from_secs(self.invoke_timeout_seconds)
    }
}

fn default_invoke_timeout() -> u64 {
    30
}

fn default_mailbox_capacity() -> usize {
    64
}

/// Config-selectable discovery policy (see `gateway::registry`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DiscoveryPolicyKind {
    #[default]
    FirstRegistered,
    LexicographicId,
}

impl DiscoveryPolicyKind {
    pub fn policy(&self) -> Arc<dyn DiscoveryPolicy> {
        match self {
            DiscoveryPolicyKind::FirstRegistered => Arc::new(FirstRegistered),
            DiscoveryPolicyKind::LexicographicId => Arc::new(LexicographicId),
        }
    }
}

impl Settings {
    pub fn new() -> Result<Self, anyhow::Error> {
        let s = Config::builder()
            .add_source(File::with_name("iris").required(false))
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8082)?
            .build()?;

        Ok(s.try_deserialize()?)
    }

    /// Create settings from CLI arguments (config file plus CLI overrides).
    pub fn new_with_cli(cli: &Cli) -> Result<Self, anyhow::Error> {
        let s = Config::builder()
            .add_source(File::from(cli.config.clone()).required(false))
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8082)?
            .build()?;

        let mut settings: Settings = s.try_deserialize()?;
        settings.apply_cli_overrides(cli);
        Ok(settings)
    }

    fn apply_cli_overrides(&mut self, cli: &Cli) {
        if let Some(host) = &cli.host {
            self.server.host = host.clone();
        }
        if let Some(port) = cli.port {
            self.server.port = port;
        }
        if let Some(timeout) = cli.invoke_timeout {
            self.gateway.invoke_timeout_seconds = timeout;
        }
    }
}
