use std::sync::Arc;

use axum::{extract::State, Json};
use base58::FromBase58;
use oracle_keys::PublicKey;
use serde::Deserialize;
use tracing::warn;

use crate::{
    encoding::FeedId,
    verifier::{RejectionReason, VerifiedPriceEvent, Verifier},
    AttestorError,
};

/// Body of `POST /api/verify`.
///
/// `publicKey` is the trusted key the caller expects; when omitted the
/// registry's current key is assumed.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyRequest {
    pub price: u64,
    pub max_age: u64,
    pub feed: String,
    /// Base58 signature
    pub signature: String,
    #[serde(default)]
    pub public_key: Option<PublicKey>,
}

/// Decodes API requests for the [`Verifier`].
#[derive(Debug, Clone)]
pub struct VerifierService {
    verifier: Verifier,
}

impl VerifierService {
    pub const fn new(verifier: Verifier) -> Self {
        Self { verifier }
    }

    pub const fn verifier(&self) -> &Verifier {
        &self.verifier
    }

    pub fn verify(&self, request: &VerifyRequest) -> Result<VerifiedPriceEvent, AttestorError> {
        let feed = FeedId::from_hex(&request.feed)?;

        let expected_key = match &request.public_key {
            Some(key) => key.clone(),
            None => self
                .verifier
                .registry()
                .trusted_key()
                .cloned()
                .ok_or(RejectionReason::Uninitialized)?,
        };

        // Undecodable text is passed on as empty bytes so the registry is
        // checked first and the signature is rejected only after it.
        let signature = request.signature.from_base58().unwrap_or_else(|_| {
            warn!("rejected signature that is not base58");
            Vec::new()
        });

        Ok(self.verifier.verify_encoded(
            &expected_key,
            request.price,
            request.max_age,
            feed,
            &signature,
        )?)
    }
}

pub async fn verify_handler(
    State(service): State<Arc<VerifierService>>,
    Json(request): Json<VerifyRequest>,
) -> Result<Json<VerifiedPriceEvent>, AttestorError> {
    service.verify(&request).map(Json)
}

pub async fn events_handler(
    State(service): State<Arc<VerifierService>>,
) -> Json<Vec<VerifiedPriceEvent>> {
    Json(service.verifier().events().events())
}
