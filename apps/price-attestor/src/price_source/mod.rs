use std::time::{SystemTime, UNIX_EPOCH};

use thiserror::Error;

use crate::encoding::FeedId;

pub mod fixed;
pub mod hermes;

/// Errors that can occur while fetching a price
#[derive(Debug, Error)]
pub enum PriceSourceError {
    #[error("Failed to build price source due to: {0}")]
    ConfigError(String),
    #[error("Error while retrieving data: {0}")]
    RetrievalError(String),
    #[error("Price source rejected the request: {0}")]
    UpstreamRejected(String),
    #[error("Malformed price source response: {0}")]
    MalformedResponse(String),
    #[error("Failed to fetch the feed {0}")]
    FeedNotFound(FeedId),
    #[error("No price for {feed} within {max_age}s, try increasing `maxAge`")]
    StalePrice { feed: FeedId, max_age: u64 },
    #[error("Feed {feed} reported a negative price {price}")]
    NegativePrice { feed: FeedId, price: i64 },
}

/// A price as reported by a source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceQuote {
    /// Fixed-point mantissa
    pub price: u64,
    /// Power-of-ten exponent applied to `price`
    pub expo: i32,
    /// UNIX timestamp in seconds of the underlying market data
    pub publish_time: u64,
}

pub trait PriceSourceBuilder {
    type Config: Clone;
    type Source: PriceSource;

    /// Returns the name of the price source for logging and observability purposes.
    fn source_name() -> &'static str;

    /// Build the specific price source
    fn build(config: Self::Config) -> Result<Self::Source, PriceSourceError>;
}

#[async_trait::async_trait]
pub trait PriceSource: Sync + Send + 'static {
    /// Fetch the latest price of `feed` whose data is no older than `max_age` seconds.
    ///
    /// Fails the whole request when no such price exists.
    async fn latest_price(&self, feed: &FeedId, max_age: u64)
        -> Result<PriceQuote, PriceSourceError>;
}

/// Current UNIX time in seconds.
pub fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

/// Whether data published at `publish_time` is within `max_age` seconds of `now`.
///
/// Clock skew counts in both directions.
pub const fn is_fresh(publish_time: u64, max_age: u64, now: u64) -> bool {
    now.abs_diff(publish_time) <= max_age
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn freshness_is_inclusive() {
        assert!(is_fresh(100, 60, 160));
        assert!(!is_fresh(100, 60, 161));
    }

    #[test]
    fn future_timestamps_count_as_skew() {
        assert!(is_fresh(130, 60, 100));
        assert!(!is_fresh(200, 60, 100));
    }

    #[test]
    fn zero_max_age_needs_exact_time() {
        assert!(is_fresh(100, 0, 100));
        assert!(!is_fresh(99, 0, 100));
    }
}
