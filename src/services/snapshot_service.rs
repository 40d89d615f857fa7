use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::db;
use crate::errors::AppError;
use crate::models::JournalSnapshot;
use crate::services::performance_service;
use crate::services::pnl_engine::PositionCalculator;
use crate::services::quote_service::QuoteService;

/// Rebuilds the user's whole view from the stores. Nothing derived is cached
/// between calls.
pub async fn load(
    pool: &PgPool,
    calculator: &dyn PositionCalculator,
    quotes: &QuoteService,
    user_id: Uuid,
) -> Result<JournalSnapshot, AppError> {
    let (trades, journal_entries) = tokio::try_join!(
        db::trade_queries::fetch_all(pool, user_id),
        db::journal_queries::fetch_all(pool, user_id),
    )?;

    let performance = performance_service::summarize(calculator, quotes, &trades, Utc::now()).await;

    Ok(JournalSnapshot {
        trades,
        performance,
        journal_entries,
    })
}
