#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod config;
mod server;

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use axum::Router;
use foundation_identity::delivery::LogDelivery;
use foundation_server::handler::routes;
use foundation_server::middleware::RouterExt;
use foundation_server::service::ServiceState;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::config::{Cli, ServerConfig};

// Tracing target constants
pub const TRACING_TARGET_SERVER_STARTUP: &str = "foundation_cli::server::startup";
pub const TRACING_TARGET_SERVER_SHUTDOWN: &str = "foundation_cli::server::shutdown";
pub const TRACING_TARGET_CONFIG: &str = "foundation_cli::config";

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => {
            tracing::info!(target: TRACING_TARGET_SERVER_SHUTDOWN, "foundation stopped");
            ExitCode::SUCCESS
        }
        Err(error) if tracing::enabled!(tracing::Level::ERROR) => {
            tracing::error!(
                target: TRACING_TARGET_SERVER_SHUTDOWN,
                error = format!("{error:#}"),
                "foundation stopped with an error"
            );
            ExitCode::FAILURE
        }
        Err(error) => {
            eprintln!("Error: {error:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> anyhow::Result<()> {
    let cli = Cli::init();
    init_tracing();

    tracing::info!(
        target: TRACING_TARGET_SERVER_STARTUP,
        version = env!("CARGO_PKG_VERSION"),
        pid = std::process::id(),
        dotenv = cfg!(feature = "dotenv"),
        "starting foundation"
    );

    cli.log();
    cli.validate()?;

    let state = ServiceState::from_config(&cli.identity, Arc::new(LogDelivery))
        .await
        .context("failed to initialize the authentication service")?;
    let router = create_router(state, &cli.server);

    server::serve(router, cli.server).await?;
    Ok(())
}

/// Applies state and middleware to the route table.
///
/// Error handling is layered last, making it the outermost layer.
fn create_router(state: ServiceState, config: &ServerConfig) -> Router {
    routes()
        .with_state(state)
        .with_observability_layer()
        .with_error_handling_layer(config.request_timeout())
}

/// Installs the fmt subscriber filtered by `RUST_LOG` (default `info`).
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
