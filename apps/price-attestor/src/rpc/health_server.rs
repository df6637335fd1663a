use std::net::SocketAddr;

use tokio::{net::TcpListener, sync::broadcast};
use tracing::{error, info};

use super::{health, RpcError};

/// Start the health check server.
///
/// Runs independently of the API server so readiness and liveness probes do
/// not compete with attestation traffic.
///
/// # Errors
///
/// Returns an error if the server fails to bind to the specified address or
/// encounters an error while serving requests.
#[tracing::instrument(skip_all, fields(health_addr = %health_addr))]
pub async fn start(
    health_addr: SocketAddr,
    mut shutdown_rx: broadcast::Receiver<()>,
) -> Result<(), RpcError> {
    info!(healthAddr = %health_addr, "starting health check server");

    let listener = TcpListener::bind(health_addr).await.map_err(|e| {
        error!(error = ?e, "health check server failed to bind");
        RpcError::from(e)
    })?;

    info!(healthAddr = %health_addr, "health check server ready, listening for requests");

    let serve_result = axum::serve(listener, health::router())
        .with_graceful_shutdown(async move {
            let _ = shutdown_rx.recv().await;
            info!("health check server received shutdown signal");
        })
        .await;

    match serve_result {
        Ok(()) => {
            info!("health check server stopped gracefully");
            Ok(())
        }
        Err(e) => {
            error!(error = ?e, "health check server failed");
            Err(e.into())
        }
    }
}
