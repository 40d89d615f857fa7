use std::collections::HashMap;
use std::sync::Arc;

use futures::future::join_all;
use tracing::{info, warn};

use crate::external::quote_provider::QuoteProvider;
use crate::models::Position;
use crate::services::failure_cache::{FailureCache, FailureType};
use crate::services::rate_limiter::RateLimiter;

/// Live price lookups for open positions. Failures never propagate: a ticker
/// that cannot be priced maps to `None`.
#[derive(Clone)]
pub struct QuoteService {
    provider: Arc<dyn QuoteProvider>,
    limiter: Arc<RateLimiter>,
    failure_cache: FailureCache,
}

impl QuoteService {
    pub fn new(provider: Arc<dyn QuoteProvider>, limiter: RateLimiter, failure_cache: FailureCache) -> Self {
        Self {
            provider,
            limiter: Arc::new(limiter),
            failure_cache,
        }
    }

    pub fn failure_cache(&self) -> &FailureCache {
        &self.failure_cache
    }

    pub async fn fetch_price(&self, ticker: &str) -> Option<f64> {
        if let Some(failure) = self.failure_cache.is_failed(ticker) {
            info!("⚠️ Skipping quote for {} - failed recently ({:?})", ticker, failure.error_type);
            return None;
        }

        let _guard = self.limiter.acquire().await;
        match self.provider.fetch_quote(ticker).await {
            Ok(quote) => {
                self.failure_cache.clear(ticker);
                Some(quote.price)
            }
            Err(e) => {
                warn!("✗ Quote lookup for {} via {} failed: {}", ticker, self.provider.name(), e);
                self.failure_cache.record_failure(ticker, FailureType::from(&e));
                None
            }
        }
    }

    /// Looks up every ticker concurrently and returns once all have resolved.
    pub async fn fetch_prices(&self, tickers: &[String]) -> HashMap<String, Option<f64>> {
        let lookups = tickers.iter().map(|ticker| async move {
            (ticker.clone(), self.fetch_price(ticker).await)
        });
        join_all(lookups).await.into_iter().collect()
    }

    pub async fn price_positions(&self, positions: Vec<Position>) -> Vec<Position> {
        let tickers: Vec<String> = positions.iter().map(|p| p.ticker.clone()).collect();
        let prices = self.fetch_prices(&tickers).await;
        apply_prices(positions, &prices)
    }
}

pub fn apply_prices(positions: Vec<Position>, prices: &HashMap<String, Option<f64>>) -> Vec<Position> {
    positions
        .into_iter()
        .map(|mut position| {
            position.current_price = prices.get(&position.ticker).copied().flatten();
            position
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::external::quote_provider::{Quote, QuoteProviderError};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct TableProvider {
        prices: HashMap<&'static str, f64>,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl QuoteProvider for TableProvider {
        fn name(&self) -> &'static str {
            "table"
        }

        async fn fetch_quote(&self, ticker: &str) -> Result<Quote, QuoteProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.prices
                .get(ticker)
                .map(|price| Quote::new(ticker, *price))
                .ok_or(QuoteProviderError::NotFound)
        }
    }

    fn service() -> (QuoteService, Arc<TableProvider>) {
        let provider = Arc::new(TableProvider {
            prices: HashMap::from([("AAPL", 150.0), ("MSFT", 400.0)]),
            calls: AtomicUsize::new(0),
        });
        let service = QuoteService::new(provider.clone(), RateLimiter::new(4, 60_000), FailureCache::new());
        (service, provider)
    }

    #[tokio::test]
    async fn test_failed_quote_degrades_to_none() {
        let (service, _) = service();
        let tickers = vec!["AAPL".to_string(), "NOPE".to_string(), "MSFT".to_string()];

        let prices = service.fetch_prices(&tickers).await;
        assert_eq!(prices["AAPL"], Some(150.0));
        assert_eq!(prices["MSFT"], Some(400.0));
        assert_eq!(prices["NOPE"], None);
    }

    #[tokio::test]
    async fn test_failed_ticker_is_not_requested_again() {
        let (service, provider) = service();

        assert!(service.fetch_price("NOPE").await.is_none());
        assert!(service.fetch_price("NOPE").await.is_none());
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
        assert!(service.failure_cache().is_failed("NOPE").is_some());
    }

    #[tokio::test]
    async fn test_price_positions_fills_current_price() {
        let (service, _) = service();
        let positions = vec![
            Position::new("AAPL".to_string(), 10.0, 100.0),
            Position::new("ZZZZ".to_string(), 1.0, 5.0),
        ];

        let priced = service.price_positions(positions).await;
        assert_eq!(priced[0].current_price, Some(150.0));
        assert_eq!(priced[1].current_price, None);
    }

    #[tokio::test]
    async fn test_refresh_with_default_quota_does_not_serialize_lookups() {
        let tickers = ["AAPL", "MSFT", "NVDA", "AMZN", "GOOG", "META", "TSLA", "SHOP"];
        let provider = Arc::new(TableProvider {
            prices: tickers.iter().map(|t| (*t, 100.0)).collect(),
            calls: AtomicUsize::new(0),
        });
        let service = QuoteService::new(provider.clone(), RateLimiter::new(4, 60), FailureCache::new());
        let tickers: Vec<String> = tickers.iter().map(|t| t.to_string()).collect();

        for _ in 0..2 {
            let start = std::time::Instant::now();
            let prices = service.fetch_prices(&tickers).await;
            assert!(start.elapsed().as_millis() < 500, "refresh took {:?}", start.elapsed());
            assert!(prices.values().all(|p| *p == Some(100.0)));
        }
        assert_eq!(provider.calls.load(Ordering::SeqCst), 16);
    }
}
