use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, put};
use axum::{Json, Router};
use tracing::{error, info};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::{CreateJournalEntry, JournalEntry, JournalQuery, UpdateJournalEntry};
use crate::routes::auth::AuthUser;
use crate::services;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_entries).post(create_entry))
        .route("/:id", put(update_entry).delete(delete_entry))
}

pub async fn list_entries(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<JournalQuery>,
) -> Result<Json<Vec<JournalEntry>>, AppError> {
    info!("GET /journal - user {} (ticker: {:?})", user.user_id, query.ticker);
    let entries = services::journal_service::list(&state.pool, user.user_id, query).await?;
    Ok(Json(entries))
}

pub async fn create_entry(
    State(state): State<AppState>,
    user: AuthUser,
    Json(input): Json<CreateJournalEntry>,
) -> Result<(StatusCode, Json<JournalEntry>), AppError> {
    info!("POST /journal - user {} ({})", user.user_id, input.ticker);
    let entry = services::journal_service::create(&state.pool, user.user_id, input).await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

pub async fn update_entry(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateJournalEntry>,
) -> Result<Json<JournalEntry>, AppError> {
    info!("PUT /journal/{} - user {}", id, user.user_id);
    let entry = services::journal_service::update(&state.pool, user.user_id, id, input)
        .await
        .map_err(|e| {
            error!("Failed to update journal entry {}: {}", id, e);
            e
        })?;
    Ok(Json(entry))
}

pub async fn delete_entry(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    info!("DELETE /journal/{} - user {}", id, user.user_id);
    services::journal_service::delete(&state.pool, user.user_id, id)
        .await
        .map_err(|e| {
            error!("Failed to delete journal entry {}: {}", id, e);
            e
        })?;
    Ok(StatusCode::NO_CONTENT)
}
