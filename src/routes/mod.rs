pub mod auth;
pub mod health;
pub mod trades;
pub mod journal;
pub mod performance;
