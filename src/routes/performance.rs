use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use tracing::info;

use crate::errors::AppError;
use crate::models::{JournalSnapshot, PerformanceSummary};
use crate::routes::auth::AuthUser;
use crate::services;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/performance", get(get_performance))
        .route("/api/snapshot", get(get_snapshot))
}

pub async fn get_performance(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<PerformanceSummary>, AppError> {
    info!("GET /performance - user {}", user.user_id);
    let summary = services::performance_service::load(
        &state.pool,
        state.calculator.as_ref(),
        &state.quotes,
        user.user_id,
    )
    .await?;
    Ok(Json(summary))
}

pub async fn get_snapshot(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<JournalSnapshot>, AppError> {
    info!("GET /snapshot - user {}", user.user_id);
    let snapshot = services::snapshot_service::load(
        &state.pool,
        state.calculator.as_ref(),
        &state.quotes,
        user.user_id,
    )
    .await?;
    Ok(Json(snapshot))
}
