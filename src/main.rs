use clap::Parser;
use iris::cli::Cli;
use iris::config::Settings;
use iris::gateway::ContainerGateway;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let settings = Settings::new_with_cli(&cli)?;
    let host = settings.server.host.clone();
    let port = settings.server.port;

    info!("Starting Iris agent container gateway on {}:{}", host, port);

    let gateway = Arc::new(ContainerGateway::new(&settings.gateway));
    let app = iris::create_app(gateway, &settings);

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Listening on {}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
