//! Router for invitee responses. Requests are identified by the
//! invitee's token only.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};

use super::public;
use crate::api::state::AppState;
use crate::scheduling::service::{RespondView, find_invitee};
use crate::scheduling::{self, InviteeStatus, RsvpAction};

type SharedState = Arc<AppState>;

async fn respond_view(
    State(state): State<SharedState>,
    Path(token): Path<String>,
) -> Result<Json<RespondView>, crate::api::public::ApiError> {
    let view = scheduling::respond_view(&state.db, &token).await?;
    Ok(Json(view))
}

async fn submit_response(
    State(state): State<SharedState>,
    Path(token): Path<String>,
    Json(req): Json<public::RespondRequest>,
) -> Result<Json<public::RespondResponse>, crate::api::public::ApiError> {
    let invitee = find_invitee(&state.db, &token).await?;
    let action = RsvpAction::parse(&req.action);
    let invitee =
        scheduling::record_response(&state.db, invitee, action, &req.available_slots).await?;

    let message = match (action, invitee.status) {
        (None, _) => format!("Unrecognized action: {}", req.action),
        (Some(_), InviteeStatus::Declined) => "Your response has been recorded as not attending".to_string(),
        (Some(_), _) => "Thank you for your response!".to_string(),
    };
    Ok(Json(public::RespondResponse {
        accepted: action.is_some(),
        status: invitee.status,
        message,
    }))
}

/// Create the respond router
pub fn router() -> Router<SharedState> {
    Router::new().route("/{token}", get(respond_view).post(submit_response))
}
