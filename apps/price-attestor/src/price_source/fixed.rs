use std::collections::HashMap;

use serde::Deserialize;
use tracing::{debug, info};

use crate::{
    encoding::FeedId,
    price_source::{unix_now, PriceQuote, PriceSource, PriceSourceBuilder, PriceSourceError},
};

/// One configured price.
#[derive(Clone, Debug, Deserialize)]
pub struct FixedPrice {
    pub feed: FeedId,
    pub price: u64,
    #[serde(default)]
    pub expo: i32,
}

/// Configuration for a source that serves configured prices.
///
/// Intended for local development and tests where no upstream feed is reachable.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct FixedPriceConfig {
    #[serde(default)]
    pub prices: Vec<FixedPrice>,
}

/// Builder for creating fixed price sources
#[derive(Debug)]
pub struct FixedPriceSourceBuilder;

impl PriceSourceBuilder for FixedPriceSourceBuilder {
    type Config = FixedPriceConfig;
    type Source = FixedPriceSource;

    fn source_name() -> &'static str {
        "fixed"
    }

    fn build(config: Self::Config) -> Result<Self::Source, PriceSourceError> {
        info!(numFeeds = config.prices.len(), "initializing fixed price source");
        Ok(FixedPriceSource::new(config.prices))
    }
}

/// Serves configured prices, always stamped with the current time.
#[derive(Debug, Default)]
pub struct FixedPriceSource {
    prices: HashMap<FeedId, FixedPrice>,
}

impl FixedPriceSource {
    pub fn new(prices: impl IntoIterator<Item = FixedPrice>) -> Self {
        Self {
            prices: prices.into_iter().map(|p| (p.feed, p)).collect(),
        }
    }
}

#[async_trait::async_trait]
impl PriceSource for FixedPriceSource {
    async fn latest_price(
        &self,
        feed: &FeedId,
        _max_age: u64,
    ) -> Result<PriceQuote, PriceSourceError> {
        let entry = self
            .prices
            .get(feed)
            .ok_or(PriceSourceError::FeedNotFound(*feed))?;
        debug!(%feed, price = entry.price, "serving fixed price");
        Ok(PriceQuote {
            price: entry.price,
            expo: entry.expo,
            publish_time: unix_now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn serves_configured_prices_by_numeric_feed() {
        let config: FixedPriceConfig = toml::from_str(
            r#"
            [[prices]]
            feed = "0x00ab"
            price = 787
            expo = -2
            "#,
        )
        .unwrap();
        let source = FixedPriceSourceBuilder::build(config).unwrap();

        let quote = source
            .latest_price(&FeedId::from_hex("AB").unwrap(), 60)
            .await
            .unwrap();
        assert_eq!(quote.price, 787);
        assert_eq!(quote.expo, -2);
    }

    #[tokio::test]
    async fn unknown_feed_is_not_found() {
        let source = FixedPriceSource::default();
        let err = source
            .latest_price(&FeedId::from_hex("0x1").unwrap(), 60)
            .await
            .unwrap_err();
        assert!(matches!(err, PriceSourceError::FeedNotFound(_)));
    }
}
