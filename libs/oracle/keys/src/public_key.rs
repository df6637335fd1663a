use std::{fmt, str::FromStr};

use base58::{FromBase58, ToBase58};
use k256::ecdsa::VerifyingKey;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::KeyError;

/// Length of a SEC1 compressed secp256k1 point.
pub const PUBLIC_KEY_LEN: usize = 33;

/// A secp256k1 verifying key, rendered as Base58 over its compressed SEC1 form.
#[derive(Clone, PartialEq, Eq)]
pub struct PublicKey(VerifyingKey);

impl PublicKey {
    /// Decode a compressed SEC1 point.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, KeyError> {
        if bytes.len() != PUBLIC_KEY_LEN {
            return Err(KeyError::Length {
                expected: PUBLIC_KEY_LEN,
                actual: bytes.len(),
            });
        }
        VerifyingKey::from_sec1_bytes(bytes)
            .map(Self)
            .map_err(|e| KeyError::PublicKey(e.to_string()))
    }

    /// The compressed SEC1 encoding.
    #[must_use]
    pub fn to_bytes(&self) -> [u8; PUBLIC_KEY_LEN] {
        let point = self.0.to_encoded_point(true);
        let mut out = [0u8; PUBLIC_KEY_LEN];
        out.copy_from_slice(point.as_bytes());
        out
    }

    /// Decode from Base58 text.
    pub fn from_base58(text: &str) -> Result<Self, KeyError> {
        let bytes = text.from_base58().map_err(|_| KeyError::Base58)?;
        Self::from_bytes(&bytes)
    }

    /// Encode as Base58 text.
    #[must_use]
    pub fn to_base58(&self) -> String {
        self.to_bytes().to_base58()
    }

    /// Borrow the underlying verifying key.
    #[must_use]
    pub const fn as_verifying_key(&self) -> &VerifyingKey {
        &self.0
    }
}

impl From<VerifyingKey> for PublicKey {
    fn from(key: VerifyingKey) -> Self {
        Self(key)
    }
}

impl FromStr for PublicKey {
    type Err = KeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_base58(s)
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_base58())
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({})", self.to_base58())
    }
}

impl Serialize for PublicKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_base58())
    }
}

impl<'de> Deserialize<'de> for PublicKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Self::from_base58(&text).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_signer_local::PrivateKeySigner;

    fn random_key() -> PublicKey {
        PublicKey::from(PrivateKeySigner::random().credential().verifying_key().clone())
    }

    #[test]
    fn compressed_encoding_is_33_bytes() {
        let bytes = random_key().to_bytes();
        assert_eq!(bytes.len(), PUBLIC_KEY_LEN);
        assert!(bytes[0] == 0x02 || bytes[0] == 0x03);
    }

    #[test]
    fn base58_text_parses_back() {
        let key = random_key();
        let text = key.to_base58();
        assert_eq!(text.parse::<PublicKey>().unwrap(), key);
    }

    #[test]
    fn rejects_wrong_length() {
        let err = PublicKey::from_bytes(&[2u8; 32]).unwrap_err();
        assert!(matches!(err, KeyError::Length { expected: 33, actual: 32 }));
    }

    #[test]
    fn rejects_non_base58_text() {
        assert!(matches!(PublicKey::from_base58("0OIl"), Err(KeyError::Base58)));
    }

    #[test]
    fn serializes_as_base58_string() {
        let key = random_key();
        let json = serde_json::to_string(&key).unwrap();
        assert_eq!(json, format!("\"{}\"", key.to_base58()));
        let back: PublicKey = serde_json::from_str(&json).unwrap();
        assert_eq!(back, key);
    }
}
