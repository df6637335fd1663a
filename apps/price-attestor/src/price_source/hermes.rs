use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tokio_retry::{
    strategy::{jitter, ExponentialBackoff},
    RetryIf,
};
use tracing::{debug, error, info, warn};
use url::Url;

use crate::{
    encoding::FeedId,
    price_source::{is_fresh, unix_now, PriceQuote, PriceSource, PriceSourceBuilder, PriceSourceError},
};

/// Public Pyth Hermes endpoint.
pub const DEFAULT_HERMES_URL: &str = "https://hermes.pyth.network";

const LATEST_PRICE_FEEDS_PATH: &str = "api/latest_price_feeds";

fn default_url() -> Url {
    Url::parse(DEFAULT_HERMES_URL).unwrap_or_else(|_| unreachable!("constant URL is valid"))
}

const fn default_timeout_secs() -> u64 {
    10
}

const fn default_max_retries() -> usize {
    3
}

/// Configuration for the Pyth Hermes price service.
#[derive(Clone, Debug, Deserialize)]
pub struct HermesConfig {
    /// Base URL of the Hermes service. Endpoint paths are resolved against it.
    #[serde(default = "default_url")]
    pub url: Url,

    /// Per-request timeout.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Retries after the first attempt for transport failures and 5xx responses.
    #[serde(default = "default_max_retries")]
    pub max_retries: usize,
}

impl Default for HermesConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
        }
    }
}

/// Builder for creating Hermes price sources
#[derive(Debug)]
pub struct HermesPriceSourceBuilder;

impl PriceSourceBuilder for HermesPriceSourceBuilder {
    type Config = HermesConfig;
    type Source = HermesPriceSource;

    fn source_name() -> &'static str {
        "hermes"
    }

    fn build(config: Self::Config) -> Result<Self::Source, PriceSourceError> {
        info!(
            url = %config.url,
            timeoutSecs = config.timeout_secs,
            maxRetries = config.max_retries,
            "initializing Hermes price source"
        );

        let endpoint = config
            .url
            .join(LATEST_PRICE_FEEDS_PATH)
            .map_err(|e| PriceSourceError::ConfigError(e.to_string()))?;
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| PriceSourceError::ConfigError(e.to_string()))?;

        info!(endpoint = %endpoint, "Hermes price source initialized successfully");

        Ok(HermesPriceSource {
            config,
            client,
            endpoint,
        })
    }
}

/// Price feed entry returned by `latest_price_feeds`.
#[derive(Debug, Clone, Deserialize)]
pub struct HermesPriceFeed {
    /// Feed id as bare hex
    pub id: String,
    /// Spot price
    pub price: HermesPrice,
}

/// Price component of a [`HermesPriceFeed`]. Integers arrive as decimal strings.
#[derive(Debug, Clone, Deserialize)]
pub struct HermesPrice {
    pub price: String,
    pub conf: String,
    pub expo: i32,
    pub publish_time: u64,
}

/// Client for the Pyth Hermes price service
#[derive(Debug)]
pub struct HermesPriceSource {
    config: HermesConfig,
    client: Client,
    endpoint: Url,
}

impl HermesPriceSource {
    async fn fetch_feeds(&self, feed: &FeedId) -> Result<Vec<HermesPriceFeed>, PriceSourceError> {
        debug!(endpoint = %self.endpoint, "fetching latest price feed from Hermes");

        let response = self
            .client
            .get(self.endpoint.clone())
            .query(&[("ids[]", feed.to_hex())])
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "Hermes request failed");
                PriceSourceError::RetrievalError(e.to_string())
            })?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            error!("feed not known to Hermes");
            return Err(PriceSourceError::FeedNotFound(*feed));
        }
        if status.is_server_error() {
            warn!(status = %status, "Hermes returned a server error");
            return Err(PriceSourceError::RetrievalError(format!(
                "unexpected status {status}"
            )));
        }
        if !status.is_success() {
            error!(status = %status, "Hermes rejected the request");
            return Err(PriceSourceError::UpstreamRejected(format!(
                "unexpected status {status}"
            )));
        }

        response.json().await.map_err(|e| {
            error!(error = %e, "failed to decode Hermes response");
            PriceSourceError::MalformedResponse(e.to_string())
        })
    }
}

/// Pick `feed` out of a Hermes response and apply the freshness bound.
pub fn select_price(
    feeds: &[HermesPriceFeed],
    feed: &FeedId,
    max_age: u64,
    now: u64,
) -> Result<PriceQuote, PriceSourceError> {
    let entry = feeds
        .iter()
        .find(|entry| FeedId::from_hex(&entry.id).is_ok_and(|id| id == *feed))
        .ok_or(PriceSourceError::FeedNotFound(*feed))?;

    let raw: i64 = entry.price.price.parse().map_err(|e| {
        PriceSourceError::MalformedResponse(format!("price {:?}: {e}", entry.price.price))
    })?;
    let price = u64::try_from(raw).map_err(|_| PriceSourceError::NegativePrice {
        feed: *feed,
        price: raw,
    })?;

    if !is_fresh(entry.price.publish_time, max_age, now) {
        return Err(PriceSourceError::StalePrice {
            feed: *feed,
            max_age,
        });
    }

    Ok(PriceQuote {
        price,
        expo: entry.price.expo,
        publish_time: entry.price.publish_time,
    })
}

#[async_trait::async_trait]
impl PriceSource for HermesPriceSource {
    #[tracing::instrument(skip(self), fields(feed = %feed))]
    async fn latest_price(
        &self,
        feed: &FeedId,
        max_age: u64,
    ) -> Result<PriceQuote, PriceSourceError> {
        let strategy = ExponentialBackoff::from_millis(10)
            .max_delay(Duration::from_secs(2))
            .map(jitter)
            .take(self.config.max_retries);

        let feeds = RetryIf::spawn(
            strategy,
            || self.fetch_feeds(feed),
            |e: &PriceSourceError| matches!(e, PriceSourceError::RetrievalError(_)),
        )
        .await?;

        let quote = select_price(&feeds, feed, max_age, unix_now()).inspect_err(|e| {
            error!(error = %e, "no usable price in Hermes response");
        })?;

        debug!(
            price = quote.price,
            expo = quote.expo,
            publishTime = quote.publish_time,
            "retrieved latest price"
        );
        Ok(quote)
    }
}
