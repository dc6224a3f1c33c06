mod config;
mod error;
mod http;
mod ingest;
mod logging;

use std::path::PathBuf;

use bridge::Executor;
use catalog::Catalog;
use clap::Parser;
use runtime::{AnthropicBackend, Driver, ProcessToolHost};
use tracing::{info, warn};

use config::Config;
use error::Result;
use http::AppState;

#[derive(Parser)]
#[command(name = "building-assistant")]
#[command(about = "Building analytics chat service", long_about = None)]
#[command(version)]
struct Cli {
    /// Config file (default: ./building-assistant.toml if present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Listen address, overrides server.bind
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    logging::init();

    let mut config = Config::resolve(cli.config.as_deref())?;
    if let Some(bind) = cli.bind {
        config.server.bind = bind;
    }

    let backend = AnthropicBackend::builder(config.api_key()?, &config.model.model)
        .max_tokens(config.model.max_tokens)
        .build();
    let executor = Executor::new(config.executor_config());
    let tools = ProcessToolHost::new(Catalog::occupancy(), executor);
    let driver = Driver::new(backend, tools).with_max_rounds(config.tool_loop.max_rounds);
    let state = AppState::new(driver, config.turn_timeout());

    let listener = tokio::net::TcpListener::bind(&config.server.bind).await?;
    info!(
        addr = %listener.local_addr()?,
        model = %config.model.model,
        executor = %config.executor.program,
        max_rounds = config.tool_loop.max_rounds,
        "listening"
    );

    axum::serve(listener, http::router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}
