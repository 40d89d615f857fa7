use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::db;
use crate::errors::AppError;
use crate::models::{PerformanceSummary, PositionView, Trade};
use crate::services::pnl_engine::PositionCalculator;
use crate::services::quote_service::QuoteService;

/// Runs the engine over a user's trades and prices the open positions.
pub async fn summarize(
    calculator: &dyn PositionCalculator,
    quotes: &QuoteService,
    trades: &[Trade],
    as_of: DateTime<Utc>,
) -> PerformanceSummary {
    let positions = calculator.positions(trades);
    let realized_pl_ytd = calculator.realized_pl(trades, &as_of.fixed_offset());

    let priced = quotes.price_positions(positions).await;
    let views: Vec<PositionView> = priced.into_iter().map(PositionView::from).collect();

    PerformanceSummary::new(as_of, realized_pl_ytd, views)
}

pub async fn load(
    pool: &PgPool,
    calculator: &dyn PositionCalculator,
    quotes: &QuoteService,
    user_id: Uuid,
) -> Result<PerformanceSummary, AppError> {
    let trades = db::trade_queries::fetch_all(pool, user_id).await?;
    let summary = summarize(calculator, quotes, &trades, Utc::now()).await;
    info!(
        "Computed performance for user {}: {} open positions ({} priced), realized YTD {:.2}",
        user_id,
        summary.positions.len(),
        summary.priced_positions,
        summary.realized_pl_ytd
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::external::quote_provider::{Quote, QuoteProvider, QuoteProviderError};
    use crate::models::TradeSide;
    use crate::services::failure_cache::FailureCache;
    use crate::services::pnl_engine::WeightedAverageCalculator;
    use crate::services::rate_limiter::RateLimiter;
    use async_trait::async_trait;
    use chrono::TimeZone;
    use std::sync::Arc;

    struct OnlyApple;

    #[async_trait]
    impl QuoteProvider for OnlyApple {
        fn name(&self) -> &'static str {
            "only-apple"
        }

        async fn fetch_quote(&self, ticker: &str) -> Result<Quote, QuoteProviderError> {
            if ticker == "AAPL" {
                Ok(Quote::new(ticker, 130.0))
            } else {
                Err(QuoteProviderError::Network("connection reset".into()))
            }
        }
    }

    fn trade(ticker: &str, side: TradeSide, shares: f64, price: f64, month: u32) -> Trade {
        let when = Utc.with_ymd_and_hms(2026, month, 1, 15, 0, 0).unwrap();
        Trade::new(Uuid::nil(), ticker.to_string(), shares, price, side, when)
    }

    #[tokio::test]
    async fn test_summary_combines_engine_and_quotes() {
        let quotes = QuoteService::new(Arc::new(OnlyApple), RateLimiter::new(4, 60_000), FailureCache::new());
        let trades = vec![
            trade("AAPL", TradeSide::Buy, 10.0, 100.0, 1),
            trade("AAPL", TradeSide::Sell, 4.0, 150.0, 2),
            trade("MSFT", TradeSide::Buy, 2.0, 300.0, 3),
        ];
        let as_of = Utc.with_ymd_and_hms(2026, 10, 19, 0, 0, 0).unwrap();

        let summary = summarize(&WeightedAverageCalculator, &quotes, &trades, as_of).await;

        assert_eq!(summary.realized_pl_ytd, 200.0);
        assert_eq!(summary.positions.len(), 2);
        assert_eq!(summary.priced_positions, 1);
        assert_eq!(summary.total_cost_basis, 600.0 + 600.0);
        assert_eq!(summary.total_market_value, 6.0 * 130.0);

        let apple = &summary.positions[0];
        assert_eq!(apple.ticker, "AAPL");
        assert_eq!(apple.unrealized_gain_loss, Some(6.0 * 30.0));

        let msft = &summary.positions[1];
        assert_eq!(msft.current_price, None);
        assert_eq!(msft.market_value, None);
    }

    #[tokio::test]
    async fn test_empty_history() {
        let quotes = QuoteService::new(Arc::new(OnlyApple), RateLimiter::new(1, 60), FailureCache::new());
        let summary = summarize(&WeightedAverageCalculator, &quotes, &[], Utc::now()).await;

        assert!(summary.positions.is_empty());
        assert_eq!(summary.realized_pl_ytd, 0.0);
        assert_eq!(summary.total_market_value, 0.0);
    }
}
