use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum TradeSide {
    Buy,
    Sell,
}

impl TradeSide {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_uppercase().as_str() {
            "BUY" | "B" => Some(TradeSide::Buy),
            "SELL" | "S" => Some(TradeSide::Sell),
            _ => None,
        }
    }
}

// A single executed buy or sell. `created_at` is when the trade happened, which
// the user may backdate, not when the row was written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Trade {
    pub id: Uuid,
    pub user_id: Uuid,
    pub ticker: String,
    pub shares: f64,
    pub price: f64,
    pub trade_type: TradeSide,
    pub created_at: DateTime<Utc>,
}

impl Trade {
    pub(crate) fn new(
        user_id: Uuid,
        ticker: String,
        shares: f64,
        price: f64,
        trade_type: TradeSide,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            ticker,
            shares,
            price,
            trade_type,
            created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTrade {
    pub ticker: String,
    pub shares: f64,
    pub price: f64,
    pub trade_type: TradeSide,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub struct TradeQuery {
    pub ticker: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ImportRowError {
    pub line: usize,
    pub error: String,
}

#[derive(Debug, Serialize)]
pub struct ImportResult {
    pub imported: usize,
    pub errors: Vec<ImportRowError>,
}
