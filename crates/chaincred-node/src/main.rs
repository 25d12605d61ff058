//! ChainCred Node: entry point.
//!
//! Starts the ChainCred node with configuration from a TOML file or defaults.

mod api;
mod config;
mod node;
mod state;
mod storage;

use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use config::ChainCredConfig;
use node::ChainCredNode;

/// ChainCred Node
#[derive(Parser, Debug)]
#[command(name = "chaincred-node", version, about = "ChainCred credential node")]
struct Args {
    /// Path to the configuration file (TOML).
    #[arg(short, long, default_value = "chaincred.toml")]
    config: PathBuf,

    /// Override the API port.
    #[arg(long)]
    api_port: Option<u16>,

    /// Override the data directory.
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Override the log level (trace, debug, info, warn, error).
    #[arg(long)]
    log_level: Option<String>,

    /// Emit logs as JSON.
    #[arg(long)]
    json_logs: bool,

    /// Generate a default config file and exit.
    #[arg(long)]
    init: bool,
}

fn init_tracing(level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Handle --init flag
    if args.init {
        init_tracing(args.log_level.as_deref().unwrap_or("info"), args.json_logs);
        let config = ChainCredConfig::default();
        config.save(&args.config)?;
        tracing::info!(path = %args.config.display(), "wrote default config");
        return Ok(());
    }

    // Load configuration
    let mut config = ChainCredConfig::load(&args.config)?;

    // Apply CLI overrides
    if let Some(api_port) = args.api_port {
        config.api.port = api_port;
    }
    if let Some(ref data_dir) = args.data_dir {
        config.storage.data_dir = data_dir.clone();
    }
    if let Some(level) = args.log_level {
        config.logging.level = level;
    }
    if args.json_logs {
        config.logging.format = "json".into();
    }

    init_tracing(&config.logging.level, config.json_logs());
    tracing::info!(config = %args.config.display(), "ChainCred Node v{}", env!("CARGO_PKG_VERSION"));

    // Create and start the node
    let mut node = ChainCredNode::new(config);
    node.start().await?;

    // Set up graceful shutdown on SIGINT
    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
        tracing::info!("received shutdown signal");
    };

    tokio::select! {
        result = node.run() => {
            if let Err(e) = result {
                tracing::error!(error = %e, "API server error");
            }
        }
        _ = shutdown => {
            tracing::info!("initiating graceful shutdown");
        }
    }

    node.shutdown().await?;
    tracing::info!("ChainCred node exited cleanly");
    Ok(())
}
