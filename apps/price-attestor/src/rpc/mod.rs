use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use thiserror::Error;
use tower_http::trace::TraceLayer;

use crate::{price_source::PriceSource, signer::Signer};

pub mod attestor;
pub mod health;
pub mod health_server;
pub mod interceptor;
pub mod middleware;
pub mod server;
pub mod verifier;

pub use attestor::AttestorService;
pub use interceptor::trace_context;
pub use middleware::{logging_middleware, LoggingContext};
pub use verifier::VerifierService;

/// Errors raised while running the HTTP servers.
#[derive(Debug, Error)]
pub enum RpcError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Build the attestation and verification API.
///
/// Routes:
/// - `POST /api/price` signs the latest price of a feed
/// - `POST /api/verify` checks a signed price against the trusted key
/// - `GET /api/events` lists the prices verified so far
pub fn router<P, S>(attestor: AttestorService<P, S>, verifier: VerifierService) -> Router
where
    P: PriceSource,
    S: Signer,
{
    let context = LoggingContext {
        source: attestor.source_name(),
        signer: attestor.signer_name(),
    };

    let attest_routes = Router::new()
        .route("/api/price", post(attestor::attest_price_handler::<P, S>))
        .with_state(Arc::new(attestor));
    let verify_routes = Router::new()
        .route("/api/verify", post(verifier::verify_handler))
        .route("/api/events", get(verifier::events_handler))
        .with_state(Arc::new(verifier));

    attest_routes
        .merge(verify_routes)
        .layer(axum::middleware::from_fn_with_state(
            context,
            logging_middleware,
        ))
        .layer(axum::middleware::from_fn(trace_context))
        .layer(TraceLayer::new_for_http())
}
