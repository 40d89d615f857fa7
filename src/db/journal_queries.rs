use sqlx::PgPool;
use uuid::Uuid;
use crate::models::JournalEntry;

pub async fn insert(pool: &PgPool, entry: &JournalEntry) -> Result<JournalEntry, sqlx::Error> {
    sqlx::query_as::<_, JournalEntry>(
        "INSERT INTO journal_entries (id, user_id, ticker, content, created_at)
         VALUES ($1, $2, $3, $4, $5)
         RETURNING id, user_id, ticker, content, created_at"
    )
        .bind(entry.id)
        .bind(entry.user_id)
        .bind(&entry.ticker)
        .bind(&entry.content)
        .bind(entry.created_at)
        .fetch_one(pool)
        .await
}

/// Newest first. `ticker = None` returns entries for every ticker.
pub async fn fetch_page(
    pool: &PgPool,
    user_id: Uuid,
    ticker: Option<&str>,
    limit: i64,
    offset: i64,
) -> Result<Vec<JournalEntry>, sqlx::Error> {
    sqlx::query_as::<_, JournalEntry>(
        "SELECT id, user_id, ticker, content, created_at
         FROM journal_entries
         WHERE user_id = $1 AND ($2::TEXT IS NULL OR ticker = $2)
         ORDER BY created_at DESC
         LIMIT $3 OFFSET $4"
    )
        .bind(user_id)
        .bind(ticker)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await
}

pub async fn fetch_all(pool: &PgPool, user_id: Uuid) -> Result<Vec<JournalEntry>, sqlx::Error> {
    sqlx::query_as::<_, JournalEntry>(
        "SELECT id, user_id, ticker, content, created_at
         FROM journal_entries
         WHERE user_id = $1
         ORDER BY created_at DESC"
    )
        .bind(user_id)
        .fetch_all(pool)
        .await
}

pub async fn update_content(
    pool: &PgPool,
    user_id: Uuid,
    id: Uuid,
    content: &str,
) -> Result<Option<JournalEntry>, sqlx::Error> {
    sqlx::query_as::<_, JournalEntry>(
        "UPDATE journal_entries
         SET content = $3
         WHERE id = $1 AND user_id = $2
         RETURNING id, user_id, ticker, content, created_at"
    )
        .bind(id)
        .bind(user_id)
        .bind(content)
        .fetch_optional(pool)
        .await
}

pub async fn delete(pool: &PgPool, user_id: Uuid, id: Uuid) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM journal_entries WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}
