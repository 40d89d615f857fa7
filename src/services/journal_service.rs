use std::sync::OnceLock;

use regex::Regex;
use sqlx::PgPool;
use tracing::{error, info};
use uuid::Uuid;

use crate::db;
use crate::errors::AppError;
use crate::models::{CreateJournalEntry, JournalEntry, JournalQuery, UpdateJournalEntry};
use crate::services::trade_service::normalize_ticker;

pub const DEFAULT_PAGE_SIZE: i64 = 5;
pub const MAX_PAGE_SIZE: i64 = 100;

fn tag_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"<[^>]*>").expect("valid tag regex"))
}

/// Visible text of an editor document: tags removed, `&nbsp;` treated as space.
pub fn visible_text(content: &str) -> String {
    tag_pattern()
        .replace_all(content, " ")
        .replace("&nbsp;", " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

// An entry needs visible text or at least one embedded image.
fn validate_content(content: &str) -> Result<(), AppError> {
    if visible_text(content).is_empty() && !content.contains("<img") {
        return Err(AppError::Validation("Journal entry cannot be empty".into()));
    }
    Ok(())
}

fn page_bounds(query: &JournalQuery) -> (i64, i64) {
    let limit = query.limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);
    let offset = query.offset.unwrap_or(0).max(0);
    (limit, offset)
}

pub async fn list(pool: &PgPool, user_id: Uuid, query: JournalQuery) -> Result<Vec<JournalEntry>, AppError> {
    let (limit, offset) = page_bounds(&query);
    let ticker = query.ticker.as_deref().map(normalize_ticker).transpose()?;

    let entries = db::journal_queries::fetch_page(pool, user_id, ticker.as_deref(), limit, offset).await?;
    Ok(entries)
}

pub async fn create(pool: &PgPool, user_id: Uuid, input: CreateJournalEntry) -> Result<JournalEntry, AppError> {
    let ticker = normalize_ticker(&input.ticker)?;
    validate_content(&input.content)?;

    let entry = JournalEntry::new(user_id, ticker, input.content);
    let stored = db::journal_queries::insert(pool, &entry).await.map_err(|e| {
        error!("Failed to insert journal entry for user {}: {}", user_id, e);
        AppError::Db(e)
    })?;
    info!("Added journal entry {} ({}) for user {}", stored.id, stored.ticker, user_id);
    Ok(stored)
}

pub async fn update(
    pool: &PgPool,
    user_id: Uuid,
    id: Uuid,
    input: UpdateJournalEntry,
) -> Result<JournalEntry, AppError> {
    validate_content(&input.content)?;

    db::journal_queries::update_content(pool, user_id, id, &input.content)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Journal entry {} not found", id)))
}

pub async fn delete(pool: &PgPool, user_id: Uuid, id: Uuid) -> Result<(), AppError> {
    match db::journal_queries::delete(pool, user_id, id).await {
        Ok(0) => Err(AppError::NotFound(format!("Journal entry {} not found", id))),
        Ok(_) => Ok(()),
        Err(e) => Err(AppError::from(e)),
    }
}
