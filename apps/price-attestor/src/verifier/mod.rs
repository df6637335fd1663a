//! Verification of price attestations against a trusted key.
//!
//! Each call is a self-contained unit: the outcome is computed first and the
//! event is appended only when the whole tuple is authenticated. A rejected call
//! leaves no trace in the event log.

use std::sync::Arc;

use alloy_primitives::Signature;
use oracle_keys::{signature as codec, PublicKey};
use thiserror::Error;
use tracing::{debug, warn};

use crate::{
    attestation::Attestation,
    attestation_payload::AttestationPayload,
    encoding::{FeedId, PriceObservation},
};

pub mod events;
pub mod registry;

pub use events::{EventLog, VerifiedPriceEvent};
pub use registry::{RegistryError, RegistryState, TrustedKeyRegistry};

/// Why a verification was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RejectionReason {
    #[error("no trusted key has been registered")]
    Uninitialized,

    #[error("trusted key does not match the key the caller expected")]
    StaleRegistryState,

    #[error("signature does not verify against the trusted key")]
    InvalidSignature,
}

/// Checks attestations against a [`TrustedKeyRegistry`] and records accepted prices.
///
/// Cheap to clone; clones share the registry and event log.
#[derive(Debug, Clone)]
pub struct Verifier {
    registry: Arc<TrustedKeyRegistry>,
    events: Arc<EventLog>,
}

impl Verifier {
    pub const fn new(registry: Arc<TrustedKeyRegistry>, events: Arc<EventLog>) -> Self {
        Self { registry, events }
    }

    pub fn registry(&self) -> &TrustedKeyRegistry {
        &self.registry
    }

    pub fn events(&self) -> &EventLog {
        &self.events
    }

    /// Verify `signature` over `(feed, max_age, price)` against the trusted key.
    ///
    /// `expected_key` is the trusted key the caller believes it is operating
    /// against. On success exactly one [`VerifiedPriceEvent`] is emitted.
    #[tracing::instrument(skip(self, expected_key, feed, signature), fields(feed = %feed))]
    pub fn verify(
        &self,
        expected_key: &PublicKey,
        price: u64,
        max_age: u64,
        feed: FeedId,
        signature: &Signature,
    ) -> Result<VerifiedPriceEvent, RejectionReason> {
        let trusted_key = self.check_registry(expected_key)?;

        let observation = PriceObservation::new(feed, max_age, price);
        let message =
            AttestationPayload::price(&observation, self.registry.network()).tagged_signing_input();

        if !codec::verify(trusted_key, &message, signature) {
            warn!(trustedKey = %trusted_key, "rejected price attestation with invalid signature");
            return Err(RejectionReason::InvalidSignature);
        }

        let event = VerifiedPriceEvent { price };
        self.events.emit(event);
        debug!(price, "price attestation accepted");
        Ok(event)
    }

    /// Like [`Self::verify`], taking the signature in its 65-byte wire encoding.
    ///
    /// Bytes that do not decode to a signature are rejected as `InvalidSignature`.
    pub fn verify_encoded(
        &self,
        expected_key: &PublicKey,
        price: u64,
        max_age: u64,
        feed: FeedId,
        signature: &[u8],
    ) -> Result<VerifiedPriceEvent, RejectionReason> {
        self.check_registry(expected_key)?;
        let signature = codec::from_bytes(signature).map_err(|e| {
            warn!(error = %e, "rejected undecodable signature");
            RejectionReason::InvalidSignature
        })?;
        self.verify(expected_key, price, max_age, feed, &signature)
    }

    /// Verify an [`Attestation`], expecting its embedded key to be the trusted one.
    pub fn verify_attestation(
        &self,
        attestation: &Attestation,
    ) -> Result<VerifiedPriceEvent, RejectionReason> {
        let observation = &attestation.observation;
        self.verify(
            &attestation.public_key,
            observation.price,
            observation.max_age,
            observation.feed,
            &attestation.signature,
        )
    }

    fn check_registry(&self, expected_key: &PublicKey) -> Result<&PublicKey, RejectionReason> {
        let trusted_key = self
            .registry
            .trusted_key()
            .ok_or(RejectionReason::Uninitialized)?;
        if trusted_key != expected_key {
            warn!(
                trustedKey = %trusted_key,
                expectedKey = %expected_key,
                "caller expected a different trusted key"
            );
            return Err(RejectionReason::StaleRegistryState);
        }
        Ok(trusted_key)
    }
}
