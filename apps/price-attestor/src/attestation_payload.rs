use std::fmt;

use oracle_keys::PublicKey;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::encoding::PriceObservation;

/// Length of the tagged signing input: type tag, network tag, SHA-256 of the data.
pub const TAGGED_INPUT_LEN: usize = 2 + 32;

/// Distinguishes signed messages so a signature for one purpose never verifies for another.
///
/// The signing input is `type_tag || network_tag || sha256(data)`. The signer hashes this
/// again, so the final signature covers `sha256(type_tag || network_tag || sha256(data))`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum AttestationType {
    /// Price observations (`[feed, maxAge, price]` scalars)
    Price = 0x01,
    /// Trusted key registration, signed by the deploying identity
    RegistryInit = 0x02,
}

impl AttestationType {
    /// Returns the single-byte wire representation.
    #[must_use]
    pub const fn as_byte(self) -> u8 {
        self as u8
    }
}

/// The network an attestation is produced for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NetworkMode {
    #[default]
    Testnet,
    Mainnet,
}

impl NetworkMode {
    /// Returns the single-byte wire representation.
    #[must_use]
    pub const fn as_byte(self) -> u8 {
        match self {
            Self::Testnet => 0x00,
            Self::Mainnet => 0x01,
        }
    }
}

impl fmt::Display for NetworkMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Testnet => f.write_str("testnet"),
            Self::Mainnet => f.write_str("mainnet"),
        }
    }
}

/// Encoded data bound to an [`AttestationType`] and a [`NetworkMode`].
///
/// Bundling the tags with the data ensures a caller can never forget to supply
/// them or accidentally swap them.
#[derive(Debug, Clone)]
pub struct AttestationPayload {
    attestation_type: AttestationType,
    network: NetworkMode,
    data: Vec<u8>,
}

impl AttestationPayload {
    /// Bind `data` to the given type and network.
    #[must_use]
    pub fn new(data: Vec<u8>, attestation_type: AttestationType, network: NetworkMode) -> Self {
        Self {
            attestation_type,
            network,
            data,
        }
    }

    /// Payload for a price observation.
    #[must_use]
    pub fn price(observation: &PriceObservation, network: NetworkMode) -> Self {
        Self::new(
            observation.encoded_bytes().to_vec(),
            AttestationType::Price,
            network,
        )
    }

    /// Payload authorizing `trusted_key` as the registry's key.
    #[must_use]
    pub fn registry_init(trusted_key: &PublicKey, network: NetworkMode) -> Self {
        Self::new(
            trusted_key.to_bytes().to_vec(),
            AttestationType::RegistryInit,
            network,
        )
    }

    /// Construct the tagged message: `type_tag || network_tag || sha256(data)`.
    #[must_use]
    pub fn tagged_signing_input(&self) -> Vec<u8> {
        let inner_hash = Sha256::digest(self.data());
        let mut tagged = Vec::with_capacity(TAGGED_INPUT_LEN);
        tagged.push(self.attestation_type().as_byte());
        tagged.push(self.network().as_byte());
        tagged.extend_from_slice(&inner_hash);
        tagged
    }

    /// Returns a reference to the raw encoded data.
    #[must_use]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Returns the [`AttestationType`] this payload is bound to.
    #[must_use]
    pub const fn attestation_type(&self) -> AttestationType {
        self.attestation_type
    }

    /// Returns the [`NetworkMode`] this payload is bound to.
    #[must_use]
    pub const fn network(&self) -> NetworkMode {
        self.network
    }
}
