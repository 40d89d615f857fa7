use crate::external::quote_provider::{Quote, QuoteProvider, QuoteProviderError};
use async_trait::async_trait;
use tracing::{info, warn};

/// Tries the primary quote provider and falls back to the secondary one on
/// any error. The fallback's error is returned when both fail.
pub struct MultiProvider {
    primary: Box<dyn QuoteProvider>,
    fallback: Box<dyn QuoteProvider>,
}

impl MultiProvider {
    pub fn new(primary: Box<dyn QuoteProvider>, fallback: Box<dyn QuoteProvider>) -> Self {
        Self { primary, fallback }
    }
}

#[async_trait]
impl QuoteProvider for MultiProvider {
    fn name(&self) -> &'static str {
        "multi"
    }

    async fn fetch_quote(&self, ticker: &str) -> Result<Quote, QuoteProviderError> {
        match self.primary.fetch_quote(ticker).await {
            Ok(quote) => return Ok(quote),
            Err(QuoteProviderError::RateLimited) => {
                info!("⚠️ {} rate limited, trying {} for {}", self.primary.name(), self.fallback.name(), ticker);
            }
            Err(e) => {
                warn!("{} failed for {}: {}", self.primary.name(), ticker, e);
            }
        }

        self.fallback.fetch_quote(ticker).await.map_err(|e| {
            warn!("{} failed for {}: {}", self.fallback.name(), ticker, e);
            e
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct FixedProvider {
        price: Option<f64>,
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl QuoteProvider for FixedProvider {
        fn name(&self) -> &'static str {
            "fixed"
        }

        async fn fetch_quote(&self, ticker: &str) -> Result<Quote, QuoteProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.price {
                Some(price) => Ok(Quote::new(ticker, price)),
                None => Err(QuoteProviderError::RateLimited),
            }
        }
    }

    fn provider(price: Option<f64>) -> (Box<dyn QuoteProvider>, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        (Box::new(FixedProvider { price, calls: calls.clone() }), calls)
    }

    #[tokio::test]
    async fn test_primary_success_skips_fallback() {
        let (primary, _) = provider(Some(10.0));
        let (fallback, fallback_calls) = provider(Some(20.0));
        let multi = MultiProvider::new(primary, fallback);

        assert_eq!(multi.fetch_quote("AAPL").await.unwrap().price, 10.0);
        assert_eq!(fallback_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_falls_back_on_primary_error() {
        let (primary, _) = provider(None);
        let (fallback, fallback_calls) = provider(Some(20.0));
        let multi = MultiProvider::new(primary, fallback);

        assert_eq!(multi.fetch_quote("AAPL").await.unwrap().price, 20.0);
        assert_eq!(fallback_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_both_failing_returns_error() {
        let (primary, _) = provider(None);
        let (fallback, _) = provider(None);
        let multi = MultiProvider::new(primary, fallback);

        assert!(matches!(multi.fetch_quote("AAPL").await, Err(QuoteProviderError::RateLimited)));
    }
}
