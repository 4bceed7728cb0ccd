use clap::Parser;
use color_eyre::Result;
use std::net::SocketAddr;
use std::path::PathBuf;
use skywatch::{config::Config, location, logging, server};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "skywatch", version, about = "Flights, satellites and solar system bodies over HTTP")]
struct Cli {
    /// Path to the TOML config file (created with defaults if missing)
    #[arg(short, long, env = "SKYWATCH_CONFIG", default_value = skywatch::config::DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Overrides server.listen_addr
    #[arg(short, long)]
    listen: Option<SocketAddr>,

    /// Overrides logging.level (RUST_LOG still wins)
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let (mut config, load_outcome) = Config::load(&cli.config);
    if let Some(addr) = cli.listen {
        config.server.listen_addr = addr;
    }

    // Instrumentation and safety
    let _log_guard = logging::initialize_logging(&config.logging, cli.log_level.as_deref());
    color_eyre::install()?;
    load_outcome.log(&cli.config);

    let observer = location::resolve_default_observer(&config.observer).await;
    let state = server::AppState::from_config(&config, observer)?;
    let app = server::create_router(state);

    let listener = tokio::net::TcpListener::bind(config.server.listen_addr).await?;
    info!("skywatch listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for ctrl-c: {}", e);
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
