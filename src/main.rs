//! roster-engine: the scheduling HTTP server.
//!
//! # Usage
//!
//! ```text
//! roster-engine --config ./config/default --bind 0.0.0.0:8080
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use roster_engine::api::{AppState, create_router};
use roster_engine::config::ConfigLoader;

#[derive(Parser)]
#[command(name = "roster-engine", about = "Staff roster scheduling server", version)]
struct Cli {
    /// Directory holding solver.yaml and scoring.yaml.
    #[arg(long, default_value = "./config/default")]
    config: PathBuf,

    /// Address to listen on.
    #[arg(long, default_value = "127.0.0.1:8080")]
    bind: SocketAddr,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,roster_engine=debug")),
        )
        .init();

    let cli = Cli::parse();

    let loader = ConfigLoader::load(&cli.config)
        .with_context(|| format!("loading configuration from {}", cli.config.display()))?;
    info!(
        config = %cli.config.display(),
        time_budget_ms = loader.config().solver.time_budget_ms,
        parallel_evaluation = loader.config().solver.parallel_evaluation,
        "configuration loaded"
    );

    let router = create_router(AppState::new(loader));
    let listener = tokio::net::TcpListener::bind(cli.bind)
        .await
        .with_context(|| format!("binding {}", cli.bind))?;
    info!(addr = %cli.bind, "roster engine listening");

    axum::serve(listener, router).await?;
    Ok(())
}
