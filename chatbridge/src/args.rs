use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;

/// Chat-completion edge proxy
#[derive(Debug, Parser)]
#[command(name = "chatbridge", about = "Normalize chat requests and fold streamed completions into JSON")]
pub struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "chatbridge.toml", env = "CHATBRIDGE_CONFIG")]
    pub config: PathBuf,

    /// Override the listen address
    #[arg(long, env = "CHATBRIDGE_LISTEN")]
    pub listen: Option<SocketAddr>,
}
