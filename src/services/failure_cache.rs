use std::sync::Arc;
use chrono::{DateTime, Utc, Duration};
use dashmap::DashMap;

use crate::external::quote_provider::QuoteProviderError;

/// Information about a failed quote lookup for a ticker
#[derive(Debug, Clone)]
pub struct FailureInfo {
    pub failed_at: DateTime<Utc>,
    pub error_type: FailureType,
    pub ttl_minutes: i64,
}

impl FailureInfo {
    fn expires_at(&self) -> DateTime<Utc> {
        self.failed_at + Duration::minutes(self.ttl_minutes)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FailureType {
    NotFound,       // Symbol unknown to every provider
    RateLimited,    // Temporary rate limit
    ApiError,       // Network, parse or other provider errors
}

impl FailureType {
    fn ttl_minutes(self) -> i64 {
        match self {
            FailureType::NotFound => 24 * 60,
            FailureType::RateLimited => 1,
            FailureType::ApiError => 5,
        }
    }
}

impl From<&QuoteProviderError> for FailureType {
    fn from(e: &QuoteProviderError) -> Self {
        match e {
            QuoteProviderError::NotFound => FailureType::NotFound,
            QuoteProviderError::RateLimited => FailureType::RateLimited,
            _ => FailureType::ApiError,
        }
    }
}

/// Thread-safe cache of tickers whose quote lookup recently failed, so a page
/// refresh does not hammer the provider for symbols it cannot price.
#[derive(Clone, Default)]
pub struct FailureCache {
    cache: Arc<DashMap<String, FailureInfo>>,
}

impl FailureCache {
    pub fn new() -> Self {
        Self {
            cache: Arc::new(DashMap::new()),
        }
    }

    /// Returns the failure if the ticker is still within its TTL
    pub fn is_failed(&self, ticker: &str) -> Option<FailureInfo> {
        self.is_failed_at(ticker, Utc::now())
    }

    fn is_failed_at(&self, ticker: &str, now: DateTime<Utc>) -> Option<FailureInfo> {
        let info = self.cache.get(ticker)?.value().clone();
        if now < info.expires_at() {
            return Some(info);
        }
        self.evict_if_expired(ticker, now);
        None
    }

    // Re-checks under the shard lock; a concurrent record_failure may have
    // replaced the entry since it was read.
    fn evict_if_expired(&self, ticker: &str, now: DateTime<Utc>) {
        self.cache.remove_if(ticker, |_, current| now >= current.expires_at());
    }

    pub fn record_failure(&self, ticker: &str, error_type: FailureType) {
        let info = FailureInfo {
            failed_at: Utc::now(),
            error_type,
            ttl_minutes: error_type.ttl_minutes(),
        };

        self.cache.insert(ticker.to_string(), info);
    }

    /// Clear a ticker from the failure cache (e.g., after successful fetch)
    pub fn clear(&self, ticker: &str) {
        self.cache.remove(ticker);
    }

    pub fn cleanup_expired(&self) {
        let now = Utc::now();
        self.cache.retain(|_, info| now < info.expires_at());
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }
}
