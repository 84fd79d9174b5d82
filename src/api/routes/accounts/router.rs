//! Router for the accounts API

use std::sync::Arc;

use axum::{Json, Router, extract::State, routing::post};

use super::public;
use crate::accounts;
use crate::api::state::AppState;

type SharedState = Arc<AppState>;

async fn register(
    State(state): State<SharedState>,
    Json(req): Json<public::RegisterRequest>,
) -> Result<Json<public::RegisterResponse>, crate::api::public::ApiError> {
    let user_id = accounts::register(
        &state.db,
        Arc::clone(&state.notifier),
        &state.config.mail,
        &req.email,
    )
    .await?;

    Ok(Json(public::RegisterResponse {
        user_id,
        message: "A confirmation code has been sent".to_string(),
    }))
}

async fn confirm(
    State(state): State<SharedState>,
    Json(req): Json<public::ConfirmRequest>,
) -> Result<Json<public::ConfirmResponse>, crate::api::public::ApiError> {
    let user = accounts::confirm(&state.db, &req.email, &req.code).await?;
    Ok(Json(public::ConfirmResponse {
        user_id: user.id,
        confirmed: user.is_confirmed,
    }))
}

/// Create the accounts router
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/register", post(register))
        .route("/confirm", post(confirm))
}
