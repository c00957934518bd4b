//! # Iris - Agent Container Gateway
//!
//! Iris hosts a set of independently running agents and exposes them to
//! external callers through a synchronous REST API, while the agents talk
//! to each other through asynchronous actor-style messaging (unicast send,
//! topic broadcast and request/response invoke).
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use iris::config::Settings;
//! use iris::gateway::ContainerGateway;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::new()?;
//!     let gateway = Arc::new(ContainerGateway::new(&settings.gateway));
//!     let app = iris::create_app(gateway, &settings);
//!     // serve `app` on the configured host:port
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! - **Domain**: wire types and error kinds
//! - **Gateway**: registry, synchronization bridge, router, lifecycle
//! - **Runtime**: the minimal actor substrate hosting the agents
//! - **Adapters**: inbound HTTP dispatch, outbound parent proxy
//! - **Config**: configuration management

pub mod adapters;
pub mod cli;
pub mod config;
pub mod domain;
pub mod gateway;
pub mod runtime;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use crate::adapters::http::{self, GatewayState};
use crate::config::Settings;
use crate::gateway::ContainerGateway;

/// Creates the Axum application router with the full gateway route table.
///
/// One route per gateway operation, first match wins; unknown paths get
/// 404 and known paths with the wrong method get 405 from the router
/// itself. Each request runs on its own task, so a slow invoke never
/// stalls dispatch of unrelated requests.
pub fn create_app(gateway: Arc<ContainerGateway>, settings: &Settings) -> Router {
    let state = GatewayState {
        gateway,
        invoke_timeout: settings.gateway.invoke_timeout(),
    };

    Router::new()
        .route("/info", get(http::get_info))
        .route("/agents", get(http::list_agents))
        .route("/agents/:agent_id", get(http::get_agent))
        .route("/initialize", post(http::initialize))
        .route("/shutdown", post(http::shutdown))
        .route("/send/:agent_id", post(http::send_message))
        .route("/broadcast/:channel", post(http::broadcast_message))
        .route("/invoke/:action", post(http::invoke_action))
        .route("/invoke/:action/:agent_id", post(http::invoke_action_of))
        .with_state(state)
        .layer(
            tower_http::cors::CorsLayer::new()
                .allow_origin(tower_http::cors::Any)
                .allow_methods(tower_http::cors::Any)
                .allow_headers(tower_http::cors::Any),
        )
}
