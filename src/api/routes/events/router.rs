//! Router for the events API

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};
use axum_extra::extract::Query;

use super::public;
use crate::api::Organizer;
use crate::api::state::AppState;
use crate::scheduling::db::EventSummary;
use crate::scheduling::models::format_instant;
use crate::scheduling::service::{EventResults, InvitationOutcome};
use crate::scheduling::{self, FinalizeRequest, NewInvitation};

type SharedState = Arc<AppState>;

// Create an event and invite participants
async fn create_event(
    State(state): State<SharedState>,
    Organizer(organizer_id): Organizer,
    Json(req): Json<public::CreateEventRequest>,
) -> Result<Json<InvitationOutcome>, crate::api::public::ApiError> {
    let outcome = scheduling::create_invitation(
        &state.db,
        Arc::clone(&state.notifier),
        &state.config.base_url,
        organizer_id,
        NewInvitation {
            title: req.title,
            start: req.start,
            end: req.end,
            emails: req.emails,
        },
    )
    .await?;
    Ok(Json(outcome))
}

// List the organizer's events with response counts
async fn list_events(
    State(state): State<SharedState>,
    Organizer(organizer_id): Organizer,
    Query(params): Query<public::ListEventsQuery>,
) -> Result<Json<Vec<EventSummary>>, crate::api::public::ApiError> {
    let events = scheduling::list_events(&state.db, organizer_id, params.status).await?;
    Ok(Json(events))
}

// Aggregated availability for an event
async fn event_results(
    State(state): State<SharedState>,
    Organizer(organizer_id): Organizer,
    Path(event_id): Path<i64>,
) -> Result<Json<EventResults>, crate::api::public::ApiError> {
    let results = scheduling::event_results(&state.db, organizer_id, event_id).await?;
    Ok(Json(results))
}

// Confirm the event at the chosen slot and notify attendees
async fn finalize_event(
    State(state): State<SharedState>,
    Organizer(organizer_id): Organizer,
    Path(event_id): Path<i64>,
    Json(req): Json<public::FinalizeEventRequest>,
) -> Result<Json<public::FinalizeEventResponse>, crate::api::public::ApiError> {
    let outcome = scheduling::finalize(
        &state.db,
        Arc::clone(&state.notifier),
        organizer_id,
        event_id,
        FinalizeRequest {
            chosen_slot: req.final_datetime,
            new_title: req.final_title,
            custom_message: req.custom_message,
        },
    )
    .await?;

    let event = outcome.event;
    Ok(Json(public::FinalizeEventResponse {
        event_id: event.id,
        title: event.title,
        start: format_instant(&event.start),
        end: format_instant(&event.end),
        status: event.status,
        notified: outcome.notified,
        attendees: outcome.attendees,
    }))
}

/// Create the events router
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/", get(list_events).post(create_event))
        .route("/{id}/results", get(event_results))
        .route("/{id}/finalize", post(finalize_event))
}
