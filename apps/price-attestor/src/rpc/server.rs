use std::net::SocketAddr;

use tokio::{net::TcpListener, sync::broadcast};
use tracing::{error, info};

use super::{router, AttestorService, RpcError, VerifierService};
use crate::{price_source::PriceSource, signer::Signer};

/// Start the HTTP API server with attestation and verification routes.
#[tracing::instrument(
    skip_all,
    fields(listen_addr = %listen_addr, source = attestor.source_name(), signer = attestor.signer_name())
)]
pub async fn start<P, S>(
    listen_addr: SocketAddr,
    attestor: AttestorService<P, S>,
    verifier: VerifierService,
    mut shutdown_rx: broadcast::Receiver<()>,
) -> Result<(), RpcError>
where
    P: PriceSource,
    S: Signer,
{
    info!(
        listenAddr = %listen_addr,
        source = attestor.source_name(),
        network = %attestor.network(),
        "starting API server"
    );

    let listener = TcpListener::bind(listen_addr).await.map_err(|e| {
        error!(error = ?e, "API server failed to bind");
        RpcError::from(e)
    })?;
    let app = router(attestor, verifier);

    info!(listenAddr = %listen_addr, "API server ready, listening for requests");

    let serve_result = axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = shutdown_rx.recv().await;
            info!("API server received shutdown signal");
        })
        .await;

    match serve_result {
        Ok(()) => {
            info!("API server stopped gracefully");
            Ok(())
        }
        Err(e) => {
            error!(error = ?e, "API server failed");
            Err(e.into())
        }
    }
}
