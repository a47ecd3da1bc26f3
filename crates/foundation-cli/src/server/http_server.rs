//! HTTP listener and serve loop.

use std::future::{Future, IntoFuture};
use std::io;
use std::net::SocketAddr;
use std::time::Duration;

use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::watch;

use super::shutdown::{shutdown_requested, shutdown_signal};
use super::{ServerError, ServerResult};
use crate::config::ServerConfig;
use crate::{TRACING_TARGET_SERVER_SHUTDOWN, TRACING_TARGET_SERVER_STARTUP};

/// Starts an HTTP server with graceful shutdown.
///
/// # Errors
///
/// Returns an error if the address cannot be bound or the server fails
/// while running.
pub async fn serve_http(app: Router, server_config: ServerConfig) -> ServerResult<()> {
    let server_addr = server_config.server_addr();
    let listener = TcpListener::bind(server_addr).await.map_err(|source| {
        let error = ServerError::Bind {
            addr: server_addr,
            source,
        };
        tracing::error!(
            target: TRACING_TARGET_SERVER_STARTUP,
            error = %error,
            hint = error.hint(),
            "failed to bind to address"
        );
        error
    })?;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        shutdown_signal().await;
        shutdown_tx.send_replace(true);
    });

    serve_listener(listener, app, shutdown_rx, &server_config).await
}

/// Serves connections from `listener` until `shutdown` fires, then waits at
/// most the configured shutdown timeout for in-flight requests.
async fn serve_listener(
    listener: TcpListener,
    app: Router,
    shutdown: watch::Receiver<bool>,
    server_config: &ServerConfig,
) -> ServerResult<()> {
    let shutdown_timeout = server_config.shutdown_timeout();
    let server = axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_requested(shutdown.clone()));

    serve_with_shutdown(server_config, || async move {
        tokio::select! {
            result = server.into_future() => result,
            () = drain_deadline(shutdown, shutdown_timeout) => {
                tracing::warn!(
                    target: TRACING_TARGET_SERVER_SHUTDOWN,
                    timeout_secs = shutdown_timeout.as_secs(),
                    "shutdown timeout elapsed, dropping remaining connections"
                );
                Ok(())
            }
        }
    })
    .await
}

async fn drain_deadline(shutdown: watch::Receiver<bool>, timeout: Duration) {
    shutdown_requested(shutdown).await;
    tracing::info!(
        target: TRACING_TARGET_SERVER_SHUTDOWN,
        timeout_secs = timeout.as_secs(),
        "graceful shutdown initiated"
    );
    tokio::time::sleep(timeout).await;
}

/// Logs readiness, runs `serve_fn` and reports how the server stopped.
async fn serve_with_shutdown<F>(
    server_config: &ServerConfig,
    serve_fn: impl FnOnce() -> F,
) -> ServerResult<()>
where
    F: Future<Output = io::Result<()>>,
{
    tracing::info!(
        target: TRACING_TARGET_SERVER_STARTUP,
        addr = %server_config.server_addr(),
        "server is ready and listening for connections"
    );

    if server_config.binds_to_all_interfaces() {
        tracing::warn!(
            target: TRACING_TARGET_SERVER_STARTUP,
            "server is bound to all interfaces; ensure firewall rules are configured"
        );
    }

    serve_fn().await.map_err(|err| {
        let error = ServerError::Serve(err);
        tracing::error!(
            target: TRACING_TARGET_SERVER_SHUTDOWN,
            error = %error,
            hint = error.hint(),
            "server encountered an error"
        );
        error
    })?;

    tracing::info!(target: TRACING_TARGET_SERVER_SHUTDOWN, "server shut down gracefully");
    Ok(())
}
