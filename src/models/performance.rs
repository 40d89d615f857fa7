use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::{JournalEntry, PositionView, Trade};

#[derive(Debug, Clone, Serialize)]
pub struct PerformanceSummary {
    pub as_of: DateTime<Utc>,
    pub realized_pl_ytd: f64,
    pub positions: Vec<PositionView>,
    pub total_cost_basis: f64,
    /// Sum over positions with a known price only.
    pub total_market_value: f64,
    pub priced_positions: usize,
}

impl PerformanceSummary {
    pub fn new(as_of: DateTime<Utc>, realized_pl_ytd: f64, positions: Vec<PositionView>) -> Self {
        let total_cost_basis = positions.iter().map(|p| p.cost_basis).sum();
        let total_market_value = positions.iter().filter_map(|p| p.market_value).sum();
        let priced_positions = positions.iter().filter(|p| p.market_value.is_some()).count();

        Self {
            as_of,
            realized_pl_ytd,
            positions,
            total_cost_basis,
            total_market_value,
            priced_positions,
        }
    }
}

/// Everything one signed-in user sees, rebuilt from the stores on each request.
#[derive(Debug, Serialize)]
pub struct JournalSnapshot {
    pub trades: Vec<Trade>,
    pub performance: PerformanceSummary,
    pub journal_entries: Vec<JournalEntry>,
}
