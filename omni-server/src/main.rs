//! omni-server - HTTP backend for publishing to multiple social platforms

use clap::Parser;
use std::path::PathBuf;

use libomnipost::logging::{LogFormat, LoggingConfig};
use libomnipost::Config;

use omni_server::server::Server;

#[derive(Parser, Debug)]
#[command(name = "omni-server")]
#[command(about = "HTTP backend for publishing to multiple social platforms", long_about = None)]
struct Cli {
    /// Path to config file (defaults to XDG config location)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the listen port
    #[arg(short, long)]
    port: Option<u16>,

    /// Log output format (text, json, or pretty)
    #[arg(long, default_value = "text")]
    log_format: LogFormat,

    /// Minimum log level
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    LoggingConfig::new(cli.log_format, cli.log_level.clone(), cli.verbose).init();

    let mut config = match &cli.config {
        Some(path) => Config::load_from_path(path)?,
        None => Config::load()?,
    };
    if let Some(port) = cli.port {
        config.server.port = port;
    }

    Server::new(config).run().await
}
