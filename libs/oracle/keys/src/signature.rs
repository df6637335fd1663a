//! Recoverable ECDSA signatures over SHA-256 message digests.
//!
//! Signatures are 65 bytes, `r || s || v`, with `v` restricted to `27` or `28`.
//! Decoding is strict so that every single-bit change of the encoded form
//! either fails to parse or recovers a different key.

use alloy_primitives::{Signature, B256, U256};
use alloy_signer::SignerSync;
use alloy_signer_local::PrivateKeySigner;
use base58::{FromBase58, ToBase58};
use sha2::{Digest, Sha256};

use crate::{KeyError, PublicKey};

/// Length of an encoded signature.
pub const SIGNATURE_LEN: usize = 65;

/// The SHA-256 digest that is actually signed for `message`.
#[must_use]
pub fn message_digest(message: &[u8]) -> B256 {
    B256::from_slice(&Sha256::digest(message))
}

/// Sign `message` (hashed with SHA-256) with `signer`.
pub fn sign(signer: &PrivateKeySigner, message: &[u8]) -> Result<Signature, KeyError> {
    signer
        .sign_hash_sync(&message_digest(message))
        .map_err(|e| KeyError::Signing(e.to_string()))
}

/// Recover the public key that produced `signature` over `message`.
pub fn recover(signature: &Signature, message: &[u8]) -> Result<PublicKey, KeyError> {
    signature
        .recover_from_prehash(&message_digest(message))
        .map(PublicKey::from)
        .map_err(|e| KeyError::Recovery(e.to_string()))
}

/// Returns true when `signature` over `message` was produced by `public_key`.
#[must_use]
pub fn verify(public_key: &PublicKey, message: &[u8], signature: &Signature) -> bool {
    recover(signature, message).is_ok_and(|recovered| &recovered == public_key)
}

/// Encode a signature as `r || s || v` with `v` in `{27, 28}`.
#[must_use]
pub fn to_bytes(signature: &Signature) -> [u8; SIGNATURE_LEN] {
    signature.as_bytes()
}

/// Strictly decode a 65-byte `r || s || v` signature.
pub fn from_bytes(bytes: &[u8]) -> Result<Signature, KeyError> {
    if bytes.len() != SIGNATURE_LEN {
        return Err(KeyError::Length {
            expected: SIGNATURE_LEN,
            actual: bytes.len(),
        });
    }
    let (r, rest) = bytes.split_at(32);
    let (s, v) = rest.split_at(32);
    let y_parity = match v {
        [27] => false,
        [28] => true,
        [other, ..] => return Err(KeyError::RecoveryByte(*other)),
        [] => return Err(KeyError::RecoveryByte(0)),
    };
    Ok(Signature::new(
        U256::from_be_slice(r),
        U256::from_be_slice(s),
        y_parity,
    ))
}

/// Encode a signature as Base58 text.
#[must_use]
pub fn to_base58(signature: &Signature) -> String {
    to_bytes(signature).to_base58()
}

/// Decode a signature from Base58 text.
pub fn from_base58(text: &str) -> Result<Signature, KeyError> {
    let bytes = text.from_base58().map_err(|_| KeyError::Base58)?;
    from_bytes(&bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign_then_recover_returns_signer_key() {
        let signer = PrivateKeySigner::random();
        let expected = PublicKey::from(signer.credential().verifying_key().clone());

        let signature = sign(&signer, b"price").unwrap();
        assert_eq!(recover(&signature, b"price").unwrap(), expected);
        assert!(verify(&expected, b"price", &signature));
        assert!(!verify(&expected, b"other", &signature));
    }

    #[test]
    fn signing_is_deterministic() {
        let signer = PrivateKeySigner::random();
        assert_eq!(sign(&signer, b"m").unwrap(), sign(&signer, b"m").unwrap());
    }

    #[test]
    fn encoding_uses_27_or_28_recovery_byte() {
        let signer = PrivateKeySigner::random();
        let bytes = to_bytes(&sign(&signer, b"m").unwrap());
        assert!(bytes[64] == 27 || bytes[64] == 28);
        assert_eq!(from_bytes(&bytes).unwrap(), sign(&signer, b"m").unwrap());
    }

    #[test]
    fn rejects_raw_parity_byte() {
        let mut bytes = [1u8; SIGNATURE_LEN];
        bytes[64] = 0;
        assert!(matches!(from_bytes(&bytes), Err(KeyError::RecoveryByte(0))));
    }

    #[test]
    fn rejects_wrong_length() {
        assert!(matches!(
            from_bytes(&[27u8; 64]),
            Err(KeyError::Length { expected: 65, actual: 64 })
        ));
        assert!(matches!(
            from_bytes(&[]),
            Err(KeyError::Length { expected: 65, actual: 0 })
        ));
    }

    #[test]
    fn base58_round_trip_keeps_signature() {
        let signer = PrivateKeySigner::random();
        let signature = sign(&signer, b"m").unwrap();
        assert_eq!(from_base58(&to_base58(&signature)).unwrap(), signature);
    }
}
