//! API routes module

pub mod accounts;
pub mod events;
pub mod respond;

use std::sync::Arc;

use crate::api::state::AppState;
use axum::Router;

type SharedState = Arc<AppState>;

/// Create the combined API router
pub fn router() -> Router<SharedState> {
    Router::new()
        // Organizer registration and confirmation
        .nest("/accounts", accounts::router())
        // Event invitations, results and finalization
        .nest("/events", events::router())
        // Invitee responses by token
        .nest("/respond", respond::router())
}
