pub mod pnl_engine;
pub mod trade_service;
pub mod trade_import_service;
pub mod journal_service;
pub mod auth_service;
pub mod quote_service;
pub mod failure_cache;
pub mod rate_limiter;
pub mod performance_service;
pub mod snapshot_service;
