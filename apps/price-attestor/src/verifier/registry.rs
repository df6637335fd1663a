//! Write-once store of the key trusted to sign price attestations.

use std::sync::OnceLock;

use alloy_primitives::Signature;
use oracle_keys::{signature as codec, PublicKey};
use thiserror::Error;
use tracing::{info, warn};

use crate::{
    attestation_payload::{AttestationPayload, NetworkMode},
    signer::{Signer, SignerError},
};

/// Errors raised while initializing the registry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("trusted key registry is already initialized")]
    AlreadyInitialized,

    #[error("registry initialization is not authorized by the deployer")]
    Unauthorized,
}

/// Lifecycle of a [`TrustedKeyRegistry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistryState {
    Uninitialized,
    Ready,
}

/// Holds the single public key whose attestations are accepted.
///
/// The key is bound exactly once, by an initialization signed by the deploying
/// identity. Afterwards it is only read.
#[derive(Debug)]
pub struct TrustedKeyRegistry {
    deployer: PublicKey,
    network: NetworkMode,
    trusted_key: OnceLock<PublicKey>,
}

impl TrustedKeyRegistry {
    /// An uninitialized registry owned by `deployer`.
    pub const fn new(deployer: PublicKey, network: NetworkMode) -> Self {
        Self {
            deployer,
            network,
            trusted_key: OnceLock::new(),
        }
    }

    /// Bind `trusted_key`.
    ///
    /// `authorization` must be the deployer's signature over the registry-init payload
    /// for `trusted_key` on this registry's network.
    pub fn initialize(
        &self,
        trusted_key: PublicKey,
        authorization: &Signature,
    ) -> Result<(), RegistryError> {
        let message =
            AttestationPayload::registry_init(&trusted_key, self.network).tagged_signing_input();
        if !codec::verify(&self.deployer, &message, authorization) {
            warn!(
                deployer = %self.deployer,
                trustedKey = %trusted_key,
                "rejected unauthorized registry initialization"
            );
            return Err(RegistryError::Unauthorized);
        }

        let key_text = trusted_key.to_base58();
        self.trusted_key
            .set(trusted_key)
            .map_err(|_| RegistryError::AlreadyInitialized)?;

        info!(trustedKey = %key_text, network = %self.network, "trusted key registry initialized");
        Ok(())
    }

    /// The trusted key, if initialized.
    pub fn trusted_key(&self) -> Option<&PublicKey> {
        self.trusted_key.get()
    }

    pub fn state(&self) -> RegistryState {
        if self.trusted_key.get().is_some() {
            RegistryState::Ready
        } else {
            RegistryState::Uninitialized
        }
    }

    pub const fn deployer(&self) -> &PublicKey {
        &self.deployer
    }

    pub const fn network(&self) -> NetworkMode {
        self.network
    }
}

/// Produce the deployer's authorization for binding `trusted_key`.
pub async fn authorize(
    deployer: &impl Signer,
    trusted_key: &PublicKey,
    network: NetworkMode,
) -> Result<Signature, SignerError> {
    let message = AttestationPayload::registry_init(trusted_key, network).tagged_signing_input();
    deployer.sign(&message).await
}

/// Create a registry owned by `deployer` and bind `trusted_key` in one step.
pub async fn deploy(
    deployer: &impl Signer,
    trusted_key: PublicKey,
    network: NetworkMode,
) -> Result<TrustedKeyRegistry, crate::AttestorError> {
    let registry = TrustedKeyRegistry::new(deployer.public_key(), network);
    let authorization = authorize(deployer, &trusted_key, network).await?;
    registry.initialize(trusted_key, &authorization)?;
    Ok(registry)
}
