//! Canonical scalar encoding of price observations.
//!
//! An observation is signed as the ordered scalar sequence `[feed, maxAge, price]`.
//! Every component is read as a 32-byte big-endian unsigned integer and reduced
//! modulo the secp256k1 group order, so the signer and the verifier always agree
//! on the bytes that were signed.

use std::{fmt, str::FromStr};

use alloy_primitives::U256;
use k256::{elliptic_curve::ops::Reduce, FieldBytes, Scalar};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Width of one encoded scalar.
pub const SCALAR_LEN: usize = 32;

/// Width of an encoded observation.
pub const ENCODED_LEN: usize = 3 * SCALAR_LEN;

/// Maximum number of significant hex digits in a feed identifier.
const MAX_FEED_DIGITS: usize = 64;

/// Errors raised while turning boundary input into encodable integers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodingError {
    #[error("feed identifier is empty")]
    EmptyFeed,

    #[error("feed identifier contains non-hex character {0:?}")]
    InvalidHexDigit(char),

    #[error("feed identifier does not fit in 256 bits")]
    FeedOverflow,
}

/// Numeric identifier of a price feed.
///
/// Parsed from hex as an unsigned integer, so `0x00ab` and `0xAB` are the same feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FeedId(U256);

impl FeedId {
    /// Parse a feed identifier from hex, with or without a `0x` prefix.
    pub fn from_hex(text: &str) -> Result<Self, EncodingError> {
        let text = text.trim();
        let digits = text
            .strip_prefix("0x")
            .or_else(|| text.strip_prefix("0X"))
            .unwrap_or(text);

        if digits.is_empty() {
            return Err(EncodingError::EmptyFeed);
        }
        if let Some(bad) = digits.chars().find(|c| !c.is_ascii_hexdigit()) {
            return Err(EncodingError::InvalidHexDigit(bad));
        }

        let significant = digits.trim_start_matches('0');
        if significant.len() > MAX_FEED_DIGITS {
            return Err(EncodingError::FeedOverflow);
        }
        if significant.is_empty() {
            return Ok(Self(U256::ZERO));
        }

        U256::from_str_radix(significant, 16)
            .map(Self)
            .map_err(|_| EncodingError::FeedOverflow)
    }

    /// Big-endian bytes of the unreduced identifier.
    #[must_use]
    pub fn to_be_bytes(&self) -> [u8; SCALAR_LEN] {
        self.0.to_be_bytes::<SCALAR_LEN>()
    }

    /// Canonical lowercase, zero padded `0x` form.
    #[must_use]
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.to_be_bytes()))
    }

    /// The identifier reduced into the scalar field.
    #[must_use]
    pub fn to_scalar(&self) -> Scalar {
        reduce(self.to_be_bytes())
    }

    /// Whether the identifier is already below the group order.
    ///
    /// Identifiers at or above the order share a scalar with a smaller value.
    #[must_use]
    pub fn is_canonical(&self) -> bool {
        self.to_scalar().to_bytes().as_slice() == self.to_be_bytes().as_slice()
    }
}

impl From<U256> for FeedId {
    fn from(value: U256) -> Self {
        Self(value)
    }
}

impl FromStr for FeedId {
    type Err = EncodingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl fmt::Display for FeedId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for FeedId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for FeedId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Self::from_hex(&text).map_err(serde::de::Error::custom)
    }
}

/// A price read from a feed, together with the freshness bound it was read under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceObservation {
    /// Fixed-point price.
    pub price: u64,
    /// Freshness bound in seconds.
    pub max_age: u64,
    /// Feed the price was read from.
    pub feed: FeedId,
}

impl PriceObservation {
    pub const fn new(feed: FeedId, max_age: u64, price: u64) -> Self {
        Self {
            price,
            max_age,
            feed,
        }
    }

    /// Scalars in signing order: `[feed, maxAge, price]`.
    #[must_use]
    pub fn encode(&self) -> [Scalar; 3] {
        [
            self.feed.to_scalar(),
            reduce(u64_to_be_bytes(self.max_age)),
            reduce(u64_to_be_bytes(self.price)),
        ]
    }

    /// The encoded scalars laid out back to back.
    #[must_use]
    pub fn encoded_bytes(&self) -> [u8; ENCODED_LEN] {
        let mut out = [0u8; ENCODED_LEN];
        for (chunk, scalar) in out.chunks_exact_mut(SCALAR_LEN).zip(self.encode()) {
            chunk.copy_from_slice(&scalar.to_bytes());
        }
        out
    }
}

fn u64_to_be_bytes(value: u64) -> [u8; SCALAR_LEN] {
    U256::from(value).to_be_bytes::<SCALAR_LEN>()
}

fn reduce(bytes: [u8; SCALAR_LEN]) -> Scalar {
    <Scalar as Reduce<k256::U256>>::reduce_bytes(&FieldBytes::from(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    const BTC_USD: &str = "0xe62df6c8b4a85fe1a67db44dc12de5db330f7ac66b72dc658afedf0f4a415b43";
    const GROUP_ORDER: &str = "fffffffffffffffffffffffffffffffebaaedce6af48a03bbfd25e8cd0364141";

    #[test]
    fn parses_prefixed_and_bare_hex() {
        let prefixed = FeedId::from_hex(BTC_USD).unwrap();
        let bare = FeedId::from_hex(&BTC_USD[2..]).unwrap();
        assert_eq!(prefixed, bare);
        assert_eq!(prefixed.to_hex(), BTC_USD);
    }

    #[test]
    fn padding_and_case_do_not_change_the_feed() {
        let a = FeedId::from_hex("0x00000000ABCDEF").unwrap();
        let b = FeedId::from_hex("0xabcdef").unwrap();
        let c = FeedId::from_hex("ABCDEF").unwrap();
        assert_eq!(a, b);
        assert_eq!(b, c);

        let first = PriceObservation::new(a, 60, 787);
        let second = PriceObservation::new(c, 60, 787);
        assert_eq!(first.encoded_bytes(), second.encoded_bytes());
    }

    #[test]
    fn leading_zeros_beyond_64_digits_are_accepted() {
        let padded = format!("0x{}{}", "0".repeat(10), &BTC_USD[2..]);
        assert_eq!(
            FeedId::from_hex(&padded).unwrap(),
            FeedId::from_hex(BTC_USD).unwrap()
        );
    }

    #[test]
    fn rejects_malformed_feeds() {
        assert_eq!(FeedId::from_hex(""), Err(EncodingError::EmptyFeed));
        assert_eq!(FeedId::from_hex("0x"), Err(EncodingError::EmptyFeed));
        assert_eq!(
            FeedId::from_hex("0x12g4"),
            Err(EncodingError::InvalidHexDigit('g'))
        );
        assert_eq!(
            FeedId::from_hex(&format!("1{}", "0".repeat(64))),
            Err(EncodingError::FeedOverflow)
        );
    }

    #[test]
    fn zero_feed_is_valid() {
        let feed = FeedId::from_hex("0x0000").unwrap();
        assert_eq!(feed.to_be_bytes(), [0u8; 32]);
    }

    #[test]
    fn encoding_order_is_feed_max_age_price() {
        let feed = FeedId::from_hex("0x01").unwrap();
        let bytes = PriceObservation::new(feed, 60, 787).encoded_bytes();

        assert_eq!(bytes[31], 1);
        assert_eq!(&bytes[56..64], &60u64.to_be_bytes());
        assert_eq!(&bytes[88..96], &787u64.to_be_bytes());
    }

    #[test]
    fn swapping_max_age_and_price_changes_the_encoding() {
        let feed = FeedId::from_hex(BTC_USD).unwrap();
        assert_ne!(
            PriceObservation::new(feed, 60, 787).encoded_bytes(),
            PriceObservation::new(feed, 787, 60).encoded_bytes()
        );
    }

    #[test]
    fn feeds_at_or_above_the_order_are_reduced() {
        let order = FeedId::from_hex(GROUP_ORDER).unwrap();
        assert!(!order.is_canonical());
        assert_eq!(order.to_scalar(), Scalar::ZERO);

        let zero = FeedId::from_hex("0x0").unwrap();
        assert_eq!(
            PriceObservation::new(order, 1, 1).encoded_bytes(),
            PriceObservation::new(zero, 1, 1).encoded_bytes()
        );
    }

    #[test]
    fn feeds_below_the_order_are_canonical() {
        assert!(FeedId::from_hex(BTC_USD).unwrap().is_canonical());
    }

    #[test]
    fn observation_serializes_with_camel_case_keys() {
        let feed = FeedId::from_hex(BTC_USD).unwrap();
        let json = serde_json::to_value(PriceObservation::new(feed, 60, 787)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "price": 787, "maxAge": 60, "feed": BTC_USD })
        );
    }
}
