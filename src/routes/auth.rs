use axum::async_trait;
use axum::extract::{FromRequestParts, State};
use axum::http::request::Parts;
use axum::http::{header, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::{Claims, SessionInfo};
use crate::services::auth_service::bearer_token;
use crate::state::AppState;

/// The signed-in caller. Every store query is scoped to `user_id`.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub claims: Claims,
    token: String,
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(bearer_token)
            .ok_or(AppError::Unauthorized)?
            .to_string();

        let claims = state.tokens.verify(&token)?;
        Ok(Self {
            user_id: claims.sub,
            claims,
            token,
        })
    }
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/session", get(get_session))
        .route("/logout", post(logout))
}

pub async fn get_session(user: AuthUser) -> Json<SessionInfo> {
    info!("GET /auth/session - user {}", user.user_id);
    Json(SessionInfo {
        user_id: user.user_id,
        email: user.claims.email.clone(),
        expires_at: user.claims.exp,
    })
}

pub async fn logout(State(state): State<AppState>, user: AuthUser) -> StatusCode {
    info!("POST /auth/logout - user {}", user.user_id);
    state.tokens.revoke(&user.claims, &user.token);
    StatusCode::NO_CONTENT
}
