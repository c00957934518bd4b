use clap::Parser;
use std::path::PathBuf;

/// Agent container gateway - hosts agents behind a synchronous REST API
#[derive(Parser, Debug, Clone)]
#[command(name = "iris", version, about, long_about = None)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long, env = "IRIS_CONFIG", default_value = "iris.toml")]
    pub config: PathBuf,

    /// Server host address
    #[arg(long, env = "IRIS_HOST")]
    pub host: Option<String>,

    /// Server port
    #[arg(long, env = "IRIS_PORT")]
    pub port: Option<u16>,

    /// Default invoke timeout in seconds
    #[arg(long, env = "IRIS_INVOKE_TIMEOUT")]
    pub invoke_timeout: Option<u64>,
}
