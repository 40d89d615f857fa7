mod trade;
mod position;
mod journal_entry;
mod performance;
mod auth;

pub use trade::{Trade, TradeSide, CreateTrade, TradeQuery, ImportResult, ImportRowError};
pub use position::{Position, PositionView};
pub use journal_entry::{JournalEntry, CreateJournalEntry, UpdateJournalEntry, JournalQuery};
pub use performance::{PerformanceSummary, JournalSnapshot};
pub use auth::{Claims, SessionInfo};
