//! Binding and serving the router.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use relay::SyncEngine;
use thiserror::Error;
use tokio::net::TcpListener;
use tracing::info;

use crate::routes;

/// Errors raised while running the HTTP server.
#[derive(Debug, Error)]
pub enum ServerError {
    /// The listening socket could not be opened.
    #[error("failed to bind {addr}: {source}")]
    Bind {
        /// Address that was requested.
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    /// The server stopped with an I/O error after binding.
    #[error("HTTP server failed: {0}")]
    Serve(#[source] std::io::Error),
}

/// Serves the relay router on `addr` until `shutdown` resolves.
///
/// In-flight requests are allowed to finish after the shutdown signal.
pub async fn serve<F>(
    addr: SocketAddr,
    engine: Arc<SyncEngine>,
    shutdown: F,
) -> Result<(), ServerError>
where
    F: Future<Output = ()> + Send + 'static,
{
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|source| ServerError::Bind { addr, source })?;
    let local = listener.local_addr().unwrap_or(addr);
    info!(addr = %local, project = %engine.settings().project.key(), "issue relay listening");

    axum::serve(listener, routes::router(engine))
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(ServerError::Serve)?;

    info!("issue relay stopped");
    Ok(())
}
