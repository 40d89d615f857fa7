use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

// A user's note about a ticker. Content is stored as the editor produced it (HTML or plain text).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct JournalEntry {
    pub id: Uuid,
    pub user_id: Uuid,
    pub ticker: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl JournalEntry {
    pub(crate) fn new(user_id: Uuid, ticker: String, content: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            ticker,
            content,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateJournalEntry {
    pub ticker: String,
    pub content: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UpdateJournalEntry {
    pub content: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct JournalQuery {
    pub ticker: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}
