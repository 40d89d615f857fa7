use sqlx::PgPool;
use uuid::Uuid;
use crate::models::Trade;

pub async fn insert(pool: &PgPool, trade: &Trade) -> Result<Trade, sqlx::Error> {
    sqlx::query_as::<_, Trade>(
        "INSERT INTO trades (id, user_id, ticker, shares, price, trade_type, created_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7)
         RETURNING id, user_id, ticker, shares, price, trade_type, created_at"
    )
        .bind(trade.id)
        .bind(trade.user_id)
        .bind(&trade.ticker)
        .bind(trade.shares)
        .bind(trade.price)
        .bind(trade.trade_type)
        .bind(trade.created_at)
        .fetch_one(pool)
        .await
}

pub async fn insert_many(pool: &PgPool, trades: &[Trade]) -> Result<u64, sqlx::Error> {
    let mut tx = pool.begin().await?;
    let mut inserted = 0;

    for trade in trades {
        let result = sqlx::query(
            "INSERT INTO trades (id, user_id, ticker, shares, price, trade_type, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7)"
        )
            .bind(trade.id)
            .bind(trade.user_id)
            .bind(&trade.ticker)
            .bind(trade.shares)
            .bind(trade.price)
            .bind(trade.trade_type)
            .bind(trade.created_at)
            .execute(&mut *tx)
            .await?;
        inserted += result.rows_affected();
    }

    tx.commit().await?;
    Ok(inserted)
}

pub async fn fetch_all(pool: &PgPool, user_id: Uuid) -> Result<Vec<Trade>, sqlx::Error> {
    sqlx::query_as::<_, Trade>(
        "SELECT id, user_id, ticker, shares, price, trade_type, created_at
         FROM trades
         WHERE user_id = $1
         ORDER BY created_at ASC"
    )
        .bind(user_id)
        .fetch_all(pool)
        .await
}

pub async fn fetch_by_ticker(
    pool: &PgPool,
    user_id: Uuid,
    ticker: &str,
) -> Result<Vec<Trade>, sqlx::Error> {
    sqlx::query_as::<_, Trade>(
        "SELECT id, user_id, ticker, shares, price, trade_type, created_at
         FROM trades
         WHERE user_id = $1 AND ticker = $2
         ORDER BY created_at ASC"
    )
        .bind(user_id)
        .bind(ticker)
        .fetch_all(pool)
        .await
}
