//! HTTP server startup and graceful shutdown.

mod error;
mod http_server;
mod shutdown;

use axum::Router;
pub use error::{ServerError, ServerResult};

use crate::config::ServerConfig;

/// Binds the configured address and serves `app` until a shutdown signal
/// arrives and in-flight requests drain or the shutdown timeout elapses.
pub async fn serve(app: Router, config: ServerConfig) -> ServerResult<()> {
    http_server::serve_http(app, config).await
}
