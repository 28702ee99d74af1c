//! recon-server binary entry point

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use recon_config::Paths;
use recon_registry::Registry;
use recon_server::{Server, ServerConfig};
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "recon-server", version, about = "Streaming reconstruction server")]
struct Cli {
    /// Address to listen on
    #[arg(short, long, default_value = "0.0.0.0")]
    address: String,

    /// Port to listen on
    #[arg(short, long, default_value_t = 9002)]
    port: u16,

    /// Server home directory (configuration files live under <home>/config)
    #[arg(long, default_value = ".")]
    home: PathBuf,

    /// Log level when RUST_LOG is unset
    #[arg(short, long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    let registry = Arc::new(Registry::builtin());
    info!(
        readers = ?registry.reader_names(),
        writers = ?registry.writer_names(),
        "plugin registry initialized"
    );

    let config = ServerConfig {
        address: cli.address,
        port: cli.port,
    };
    let server = Server::bind(config, Paths::new(cli.home), registry).await?;

    let cancel = CancellationToken::new();
    let signal_cancel = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("shutdown signal received");
            signal_cancel.cancel();
        }
    });

    server.run(cancel).await?;
    Ok(())
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}
