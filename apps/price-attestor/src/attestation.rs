use alloy_primitives::Signature;
use alloy_signer_local::PrivateKeySigner;
use oracle_keys::{signature as codec, PublicKey};
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::{
    attestation_payload::{AttestationPayload, NetworkMode},
    encoding::PriceObservation,
    signer::{Signer, SignerError},
    AttestorError,
};

/// Sign a price observation with a private key.
///
/// The signature covers the tagged signing input of the observation's canonical
/// encoding and verifies under the returned public key only.
pub fn sign_observation(
    observation: &PriceObservation,
    network: NetworkMode,
    private_key: &PrivateKeySigner,
) -> Result<(Signature, PublicKey), SignerError> {
    let message = AttestationPayload::price(observation, network).tagged_signing_input();
    let signature =
        codec::sign(private_key, &message).map_err(|e| SignerError::LocalError(e.to_string()))?;
    let public_key = PublicKey::from(private_key.credential().verifying_key().clone());
    Ok((signature, public_key))
}

/// Sign a price observation with the provided signer
///
/// The signature can be checked by a [`crate::verifier::Verifier`] holding the
/// signer's public key as its trusted key.
#[tracing::instrument(skip(signer), fields(feed = %observation.feed, maxAge = observation.max_age, price = observation.price))]
pub async fn sign_attestation(
    observation: PriceObservation,
    network: NetworkMode,
    signer: &impl Signer,
) -> Result<Attestation, AttestorError> {
    debug!(%network, "signing price attestation");

    let message = AttestationPayload::price(&observation, network).tagged_signing_input();
    let signature = signer.sign(&message).await.map_err(|e| {
        error!(error = %e, "failed to sign price attestation");
        AttestorError::SignerError(e.to_string())
    })?;

    debug!(
        signature = %codec::to_base58(&signature),
        "price attestation signed successfully"
    );

    Ok(Attestation {
        observation,
        signature,
        public_key: signer.public_key(),
    })
}

/// A price observation bound to a signature and the key that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attestation {
    /// The attested observation
    pub observation: PriceObservation,
    /// 65-byte ECDSA signature (r: 32, s: 32, v: 1)
    pub signature: Signature,
    /// Key that verifies `signature`
    pub public_key: PublicKey,
}

/// Wire form of an [`Attestation`].
///
/// `signature` and `publicKey` are Base58 text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignedPrice {
    pub data: PriceObservation,
    pub signature: String,
    pub public_key: PublicKey,
}

impl From<&Attestation> for SignedPrice {
    fn from(attestation: &Attestation) -> Self {
        Self {
            data: attestation.observation,
            signature: codec::to_base58(&attestation.signature),
            public_key: attestation.public_key.clone(),
        }
    }
}

impl TryFrom<SignedPrice> for Attestation {
    type Error = oracle_keys::KeyError;

    fn try_from(wire: SignedPrice) -> Result<Self, Self::Error> {
        Ok(Self {
            observation: wire.data,
            signature: codec::from_base58(&wire.signature)?,
            public_key: wire.public_key,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{encoding::FeedId, signer::local::LocalSigner};

    fn observation() -> PriceObservation {
        PriceObservation::new(
            FeedId::from_hex("0xe62df6c8b4a85fe1a67db44dc12de5db330f7ac66b72dc658afedf0f4a415b43")
                .unwrap(),
            60,
            787,
        )
    }

    #[tokio::test]
    async fn signer_trait_and_private_key_paths_agree() {
        let key = PrivateKeySigner::random();
        let (signature, public_key) =
            sign_observation(&observation(), NetworkMode::Testnet, &key).unwrap();

        let signer = LocalSigner::new(key);
        let attestation = sign_attestation(observation(), NetworkMode::Testnet, &signer)
            .await
            .unwrap();

        assert_eq!(attestation.signature, signature);
        assert_eq!(attestation.public_key, public_key);
        assert_eq!(attestation.observation, observation());
    }

    #[test]
    fn signature_recovers_the_signing_key() {
        let key = PrivateKeySigner::random();
        let (signature, public_key) =
            sign_observation(&observation(), NetworkMode::Mainnet, &key).unwrap();

        let message = AttestationPayload::price(&observation(), NetworkMode::Mainnet)
            .tagged_signing_input();
        assert_eq!(codec::recover(&signature, &message).unwrap(), public_key);
    }

    #[tokio::test]
    async fn wire_form_matches_the_published_layout() {
        let signer = LocalSigner::new(PrivateKeySigner::random());
        let attestation = sign_attestation(observation(), NetworkMode::Testnet, &signer)
            .await
            .unwrap();

        let json = serde_json::to_value(SignedPrice::from(&attestation)).unwrap();
        assert_eq!(json["data"]["price"], 787);
        assert_eq!(json["data"]["maxAge"], 60);
        assert_eq!(
            json["data"]["feed"],
            "0xe62df6c8b4a85fe1a67db44dc12de5db330f7ac66b72dc658afedf0f4a415b43"
        );
        assert_eq!(json["publicKey"], signer.public_key().to_base58());

        let wire: SignedPrice = serde_json::from_value(json).unwrap();
        assert_eq!(Attestation::try_from(wire).unwrap(), attestation);
    }
}
