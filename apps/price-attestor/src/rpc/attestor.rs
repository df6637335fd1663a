use std::sync::Arc;

use axum::{extract::State, Json};
use serde::Deserialize;
use tracing::{debug, error, warn};

use crate::{
    attestation::{sign_attestation, Attestation, SignedPrice},
    attestation_payload::NetworkMode,
    encoding::{FeedId, PriceObservation},
    price_source::PriceSource,
    signer::Signer,
    AttestorError,
};

/// Produces signed price attestations
///
/// Composes a [`PriceSource`] with a [`Signer`]: the latest price of a feed is
/// fetched, bound to the requested freshness bound, and signed.
pub struct AttestorService<P, S> {
    source: P,
    source_name: &'static str,
    signer: S,
    signer_name: &'static str,
    network: NetworkMode,
}

impl<P, S> AttestorService<P, S> {
    pub const fn new(
        source: P,
        source_name: &'static str,
        signer: S,
        signer_name: &'static str,
        network: NetworkMode,
    ) -> Self {
        Self {
            source,
            source_name,
            signer,
            signer_name,
            network,
        }
    }

    pub const fn source_name(&self) -> &'static str {
        self.source_name
    }

    pub const fn signer_name(&self) -> &'static str {
        self.signer_name
    }

    pub const fn network(&self) -> NetworkMode {
        self.network
    }
}

impl<P, S> AttestorService<P, S>
where
    P: PriceSource,
    S: Signer,
{
    /// Fetch and sign the latest price of `feed` published within `max_age` seconds.
    #[tracing::instrument(skip(self), fields(source = self.source_name, signer = self.signer_name))]
    pub async fn attest_price(&self, feed: &str, max_age: u64) -> Result<Attestation, AttestorError> {
        let feed = FeedId::from_hex(feed).map_err(|e| {
            error!(error = %e, "rejected feed identifier");
            e
        })?;
        if !feed.is_canonical() {
            // Still signable; the scalar encoding reduces it modulo the group order.
            warn!(feed = %feed, "feed identifier exceeds the scalar field and will be reduced");
        }

        let quote = self.source.latest_price(&feed, max_age).await?;
        debug!(
            price = quote.price,
            expo = quote.expo,
            publishTime = quote.publish_time,
            "price retrieved"
        );

        let observation = PriceObservation::new(feed, max_age, quote.price);
        sign_attestation(observation, self.network, &self.signer).await
    }
}

/// Body of `POST /api/price`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceRequest {
    /// Hex feed identifier, `0x` prefix optional
    pub feed: String,
    /// Freshness bound in seconds
    pub max_age: u64,
}

pub async fn attest_price_handler<P, S>(
    State(service): State<Arc<AttestorService<P, S>>>,
    Json(request): Json<PriceRequest>,
) -> Result<Json<SignedPrice>, AttestorError>
where
    P: PriceSource,
    S: Signer,
{
    let attestation = service
        .attest_price(&request.feed, request.max_age)
        .await?;
    Ok(Json(SignedPrice::from(&attestation)))
}
