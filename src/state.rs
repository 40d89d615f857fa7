use std::sync::Arc;
use sqlx::PgPool;
use crate::services::auth_service::TokenVerifier;
use crate::services::pnl_engine::PositionCalculator;
use crate::services::quote_service::QuoteService;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub quotes: QuoteService,
    pub tokens: TokenVerifier,
    pub calculator: Arc<dyn PositionCalculator>,
}
