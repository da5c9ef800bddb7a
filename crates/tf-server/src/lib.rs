//! tf-server: HTTP front end for textflow.
//!
//! Exposes the orchestrator over a small JSON API:
//!
//! - `POST /process` -- run a request over a text payload
//! - `GET /steps` -- registered steps and how each one resolves
//! - `GET /health` -- liveness
//!
//! Shuts down gracefully on SIGINT / SIGTERM.

pub mod context;
pub mod error;
pub mod router;
pub mod routes;

use std::net::SocketAddr;

use tf_core::config::Config;
use tokio_util::sync::CancellationToken;

pub use context::AppContext;
pub use router::build_router;

/// Start the textflow server.
///
/// Builds the [`AppContext`], binds the configured address, and serves until
/// a shutdown signal is received.
pub async fn start(config: Config) -> tf_core::Result<()> {
    start_with_cancel(config, CancellationToken::new()).await
}

/// Like [`start`], but also stops when `cancel` is triggered.
pub async fn start_with_cancel(config: Config, cancel: CancellationToken) -> tf_core::Result<()> {
    for warning in config.validate() {
        tracing::warn!("Config warning: {warning}");
    }

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .map_err(|e| tf_core::Error::Config(format!("Invalid server address: {e}")))?;

    let ctx = AppContext::new(config);

    let orchestrator = &ctx.orchestrator;
    for info in orchestrator.launcher().check_all(orchestrator.registry()) {
        if info.available {
            tracing::info!(
                "Step available: {} ({})",
                info.name,
                info.location.as_deref().unwrap_or("unknown location")
            );
        } else {
            tracing::warn!("Step not available: {}", info.name);
        }
    }
    tracing::info!("Step selection: {}", orchestrator.selector().kind());

    let app = router::build_router(ctx);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| tf_core::Error::Internal(format!("Failed to bind to {addr}: {e}")))?;

    tracing::info!("Starting server on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(cancel))
        .await
        .map_err(|e| tf_core::Error::Internal(format!("Server error: {e}")))?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Wait for a shutdown signal (SIGINT or SIGTERM) or cancellation.
async fn shutdown_signal(cancel: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!("Failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::warn!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
        _ = cancel.cancelled() => {}
    }

    tracing::info!("Shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn invalid_address_is_config_error() {
        let mut config = Config::default();
        config.server.host = "not an address".into();
        let err = start(config).await.unwrap_err();
        assert!(matches!(err, tf_core::Error::Config(_)));
    }

    #[tokio::test]
    async fn cancelled_server_stops() {
        let mut config = Config::default();
        config.server.host = "127.0.0.1".into();
        config.server.port = 0;

        let cancel = CancellationToken::new();
        cancel.cancel();
        start_with_cancel(config, cancel).await.unwrap();
    }
}
