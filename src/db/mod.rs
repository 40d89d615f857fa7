pub mod trade_queries;
pub mod journal_queries;
