use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use tracing::{error, info};

use crate::errors::AppError;
use crate::models::{CreateTrade, ImportResult, Trade, TradeQuery};
use crate::routes::auth::AuthUser;
use crate::services;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_trades).post(create_trade))
        .route("/import", post(import_trades))
}

pub async fn list_trades(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<TradeQuery>,
) -> Result<Json<Vec<Trade>>, AppError> {
    info!("GET /trades - user {} (ticker: {:?})", user.user_id, query.ticker);
    let trades = services::trade_service::list(&state.pool, user.user_id, query.ticker.as_deref())
        .await
        .map_err(|e| {
            error!("Failed to list trades for user {}: {}", user.user_id, e);
            e
        })?;
    Ok(Json(trades))
}

pub async fn create_trade(
    State(state): State<AppState>,
    user: AuthUser,
    Json(input): Json<CreateTrade>,
) -> Result<(StatusCode, Json<Trade>), AppError> {
    info!("POST /trades - user {} {:?} {}", user.user_id, input.trade_type, input.ticker);
    let trade = services::trade_service::create(&state.pool, user.user_id, input).await?;
    Ok((StatusCode::CREATED, Json(trade)))
}

pub async fn import_trades(
    State(state): State<AppState>,
    user: AuthUser,
    body: String,
) -> Result<Json<ImportResult>, AppError> {
    info!("POST /trades/import - user {} ({} bytes)", user.user_id, body.len());
    let result = services::trade_import_service::import_csv(&state.pool, user.user_id, &body).await?;
    Ok(Json(result))
}
