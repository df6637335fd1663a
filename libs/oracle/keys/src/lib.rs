//! Key material and signature codecs shared by the price attestor and its verifier.
//!
//! Public keys are compressed secp256k1 points, signatures are recoverable ECDSA
//! signatures laid out as `r || s || v`. Both travel as Base58 text.

pub mod public_key;
pub mod signature;

#[cfg(feature = "signer-local")]
pub mod signer_local;

pub use public_key::PublicKey;

/// Errors produced while decoding or checking key material.
#[derive(Debug, thiserror::Error)]
pub enum KeyError {
    #[error("invalid base58 text")]
    Base58,

    #[error("expected {expected} bytes, got {actual}")]
    Length { expected: usize, actual: usize },

    #[error("invalid public key: {0}")]
    PublicKey(String),

    #[error("invalid recovery byte {0:#04x}, expected 0x1b or 0x1c")]
    RecoveryByte(u8),

    #[error("signature recovery failed: {0}")]
    Recovery(String),

    #[error("signing failed: {0}")]
    Signing(String),
}
