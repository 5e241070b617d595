//! Exchange-rate pipeline
//!
//! Owns the fetcher, the result cache, its memoizer and the periodic
//! invalidator for one configured endpoint.

use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt};
use tokio::sync::RwLock;
use tracing::info;

use crate::cache::{BoundedCache, CacheStats, SingleFlight};
use crate::config::Config;
use crate::error::{FetchError, Result};
use crate::models::ExchangeRateRecord;
use crate::rates::{Fetcher, RateQuery};
use crate::tasks::PeriodicInvalidator;

type Producer = Box<
    dyn Fn(String) -> BoxFuture<'static, std::result::Result<String, FetchError>> + Send + Sync,
>;

// == Exchange Rates ==
/// Memoized ECB exchange-rate client.
///
/// Identical requests made while one is in flight share its outcome, and
/// successful results are served from a bounded cache that is flushed
/// entirely at the configured invalidation interval.
pub struct ExchangeRates {
    endpoint: String,
    memo: SingleFlight<Producer, FetchError>,
    invalidator: PeriodicInvalidator,
}

impl ExchangeRates {
    /// Builds the pipeline and starts its invalidation task.
    ///
    /// Must be called from within a tokio runtime.
    pub fn new(config: &Config) -> Result<Self> {
        let fetcher = Fetcher::new(config.request_timeout(), config.max_response_bytes)?;
        let cache = Arc::new(RwLock::new(BoundedCache::new(
            config.max_cache_entries,
            config.max_cache_bytes,
        )));

        let producer: Producer = Box::new(move |url: String| {
            let fetcher = fetcher.clone();
            async move { fetcher.fetch_and_parse(&url).await }.boxed()
        });

        let invalidator =
            PeriodicInvalidator::start(Arc::clone(&cache), config.invalidation_interval());

        info!(
            endpoint = %config.endpoint,
            max_entries = config.max_cache_entries,
            max_bytes = config.max_cache_bytes,
            "exchange-rate pipeline ready"
        );

        Ok(Self {
            endpoint: config.endpoint.clone(),
            memo: SingleFlight::new(cache, producer),
            invalidator,
        })
    }

    // == Fetch ==
    /// Returns the serialized record for a fully-formed request URL.
    ///
    /// Served from cache when possible; concurrent calls for the same URL
    /// share a single download.
    pub async fn fetch(&self, url: &str) -> std::result::Result<String, FetchError> {
        self.memo.get(url).await
    }

    /// Fetches the rates described by `query` and decodes a fresh record.
    pub async fn exchange_rate(&self, query: &RateQuery) -> Result<ExchangeRateRecord> {
        let url = query.url(&self.endpoint)?;
        let json = self.fetch(url.as_str()).await?;
        Ok(serde_json::from_str(&json)?)
    }

    // == Teardown ==
    /// Stops the periodic invalidator. Safe to call more than once.
    pub fn destroy(&self) {
        if self.invalidator.stop() {
            info!("exchange-rate pipeline destroyed");
        }
    }

    pub fn is_destroyed(&self) -> bool {
        !self.invalidator.is_running()
    }

    // == Cache Access ==
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn cache(&self) -> &Arc<RwLock<BoundedCache>> {
        self.memo.cache()
    }

    pub async fn stats(&self) -> CacheStats {
        self.memo.stats().await
    }

    /// Number of URLs with a download currently running.
    pub async fn in_flight_len(&self) -> usize {
        self.memo.in_flight_len().await
    }

    /// Flushes the cache immediately, returning the number of entries removed.
    pub async fn clear_cache(&self) -> usize {
        let mut cache = self.memo.cache().write().await;
        let count = cache.len();
        cache.clear();
        count
    }
}
