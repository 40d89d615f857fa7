use std::sync::OnceLock;

use chrono::Utc;
use regex::Regex;
use sqlx::PgPool;
use tracing::{error, info};
use uuid::Uuid;

use crate::db;
use crate::errors::AppError;
use crate::models::{CreateTrade, Trade};

fn ticker_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[A-Z0-9][A-Z0-9.\-]{0,11}$").expect("valid ticker regex"))
}

/// Trims and uppercases a ticker, rejecting anything that is not a plausible symbol.
pub fn normalize_ticker(raw: &str) -> Result<String, AppError> {
    let ticker = raw.trim().to_uppercase();
    if ticker.is_empty() {
        return Err(AppError::Validation("Ticker cannot be empty".into()));
    }
    if !ticker_pattern().is_match(&ticker) {
        return Err(AppError::Validation(format!("Invalid ticker: {}", raw.trim())));
    }
    Ok(ticker)
}

/// Checks a submitted trade and builds the record to store.
pub fn build_trade(user_id: Uuid, input: CreateTrade) -> Result<Trade, AppError> {
    let ticker = normalize_ticker(&input.ticker)?;
    if !input.shares.is_finite() || input.shares <= 0.0 {
        return Err(AppError::Validation("Shares must be > 0".into()));
    }
    if !input.price.is_finite() || input.price <= 0.0 {
        return Err(AppError::Validation("Price must be > 0".into()));
    }

    Ok(Trade::new(
        user_id,
        ticker,
        input.shares,
        input.price,
        input.trade_type,
        input.created_at.unwrap_or_else(Utc::now),
    ))
}

pub async fn create(pool: &PgPool, user_id: Uuid, input: CreateTrade) -> Result<Trade, AppError> {
    let trade = build_trade(user_id, input)?;
    let stored = db::trade_queries::insert(pool, &trade).await.map_err(|e| {
        error!("Failed to insert trade for user {}: {}", user_id, e);
        AppError::Db(e)
    })?;
    info!("Recorded {:?} {} x {} @ {} for user {}", stored.trade_type, stored.ticker, stored.shares, stored.price, user_id);
    Ok(stored)
}

pub async fn list(pool: &PgPool, user_id: Uuid, ticker: Option<&str>) -> Result<Vec<Trade>, AppError> {
    let trades = match ticker {
        Some(raw) => {
            let ticker = normalize_ticker(raw)?;
            db::trade_queries::fetch_by_ticker(pool, user_id, &ticker).await?
        }
        None => db::trade_queries::fetch_all(pool, user_id).await?,
    };
    Ok(trades)
}
