//! Scheduling operations: invitation, availability responses,
//! aggregation and finalization. Every function takes the storage
//! handle explicitly and performs one unit of work against it.

use std::collections::BTreeSet;
use std::sync::Arc;

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::{Duration, NaiveDateTime, Timelike, Utc};
use rand::Rng;
use serde::Serialize;
use serde_json::json;
use tokio_rusqlite::Connection;

use super::aggregate::{AggregationResult, aggregate_slots};
use super::db::{self, EventSummary, NewEvent};
use super::grid::{DayGroup, generate_slot_grid, is_on_grid};
use super::models::{Event, EventStatus, Invitee, InviteeStatus, RsvpAction, parse_instant};
use crate::accounts::{self, is_valid_email};
use crate::core::PlannerError;
use crate::notify::{EmailTemplate, Notifier, broadcast_email, broadcast_messages, templates};

/// Confirmed meetings always last one hour
pub const CONFIRMED_DURATION_HOURS: i64 = 1;

/// Longest proposal window, in calendar days, an event may span
pub const MAX_WINDOW_DAYS: i64 = 366;

const DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M";

/// 16 random bytes, URL-safe base64 without padding
pub fn generate_token() -> String {
    let mut bytes = [0u8; 16];
    rand::thread_rng().fill(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

// Second precision, matching what the database stores
fn now() -> NaiveDateTime {
    let now = Utc::now().naive_utc();
    now.with_nanosecond(0).unwrap_or(now)
}

#[derive(Debug, Clone)]
pub struct NewInvitation {
    pub title: String,
    pub start: String,
    pub end: String,
    pub emails: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct InvitationOutcome {
    pub event: Event,
    pub invitees: Vec<Invitee>,
    pub invitations_sent: usize,
}

/// Create a pending event with one invitee per address and mail each
/// invitee their response link. The rows are committed before any mail
/// goes out, and failed sends are only counted.
pub async fn create_invitation(
    db: &Connection,
    notifier: Arc<dyn Notifier>,
    base_url: &str,
    organizer_id: i64,
    invitation: NewInvitation,
) -> Result<InvitationOutcome, PlannerError> {
    let organizer = accounts::require_organizer(db, organizer_id).await?;

    let title = invitation.title.trim().to_string();
    if title.is_empty() {
        return Err(PlannerError::validation("Title is required"));
    }
    let start = parse_instant(&invitation.start)?;
    let end = parse_instant(&invitation.end)?;
    if start >= end {
        return Err(PlannerError::validation("The window must end after it starts"));
    }
    if (end.date() - start.date()).num_days() > MAX_WINDOW_DAYS {
        return Err(PlannerError::validation(format!(
            "The window may span at most {} days",
            MAX_WINDOW_DAYS
        )));
    }

    let mut seen = BTreeSet::new();
    let mut invitees = Vec::new();
    for email in invitation.emails.iter().map(|e| e.trim()) {
        if email.is_empty() {
            continue;
        }
        if !is_valid_email(email) {
            return Err(PlannerError::validation(format!("Invalid email address: {}", email)));
        }
        if seen.insert(email.to_lowercase()) {
            invitees.push((email.to_string(), generate_token()));
        }
    }

    let new_event = NewEvent {
        organizer_id,
        title,
        start,
        end,
        created_at: now(),
    };
    let (event, invitees) = db::insert_event_with_invitees(db, new_event, invitees).await?;
    tracing::info!(
        "Created event {} with {} invitees",
        event.id,
        invitees.len()
    );

    let registry = templates();
    let mut messages = Vec::with_capacity(invitees.len());
    for invitee in &invitees {
        let body = registry.render(
            &EmailTemplate::Invitation.to_string(),
            &json!({
                "organizer": organizer.email,
                "title": event.title,
                "window_start": event.start.format(DISPLAY_FORMAT).to_string(),
                "window_end": event.end.format(DISPLAY_FORMAT).to_string(),
                "respond_url": format!("{}/api/respond/{}", base_url, invitee.token),
            }),
        )?;
        messages.push((invitee.email.clone(), body));
    }
    let invitations_sent =
        broadcast_messages(notifier, messages, format!("[RSVP] {}", event.title)).await;
    if invitations_sent < invitees.len() {
        tracing::warn!(
            "Sent {} of {} invitations for event {}",
            invitations_sent,
            invitees.len(),
            event.id
        );
    }

    Ok(InvitationOutcome {
        event,
        invitees,
        invitations_sent,
    })
}

#[derive(Debug, Serialize)]
pub struct RespondView {
    pub event: Event,
    pub invitee: Invitee,
    pub selected_slots: Vec<NaiveDateTime>,
    pub time_slots: Vec<DayGroup>,
}

pub async fn find_invitee(db: &Connection, token: &str) -> Result<Invitee, PlannerError> {
    db::find_invitee_by_token(db, token.to_string())
        .await?
        .ok_or_else(|| PlannerError::not_found("Invalid invitation link"))
}

async fn find_event(db: &Connection, event_id: i64) -> Result<Event, PlannerError> {
    db::find_event(db, event_id)
        .await?
        .ok_or_else(|| PlannerError::not_found(format!("Event {} not found", event_id)))
}

/// Everything an invitee needs to answer: the event, their current
/// answer and the selectable slot grid.
pub async fn respond_view(db: &Connection, token: &str) -> Result<RespondView, PlannerError> {
    let invitee = find_invitee(db, token).await?;
    let event = find_event(db, invitee.event_id).await?;
    let selected_slots = db::list_responses(db, invitee.id)
        .await?
        .into_iter()
        .map(|r| r.available_slot)
        .collect();
    let time_slots = generate_slot_grid(event.start, event.end);
    Ok(RespondView {
        event,
        invitee,
        selected_slots,
        time_slots,
    })
}

/// Apply an invitee's answer.
///
/// Declining is terminal and repeating it changes nothing. Attending
/// replaces every previously chosen slot with `chosen_slots`, which may
/// be empty. An unrecognized action (`None`) leaves the invitee as is.
pub async fn record_response(
    db: &Connection,
    invitee: Invitee,
    action: Option<RsvpAction>,
    chosen_slots: &[String],
) -> Result<Invitee, PlannerError> {
    let Some(action) = action else {
        return Ok(invitee);
    };

    let event = find_event(db, invitee.event_id).await?;
    if event.status == EventStatus::Confirmed {
        return Err(PlannerError::validation("This event has already been scheduled"));
    }

    let responded_at = now();
    match action {
        RsvpAction::Decline => {
            if invitee.status == InviteeStatus::Declined {
                return Ok(invitee);
            }
            if !invitee.status.can_transition_to(InviteeStatus::Declined) {
                return Err(PlannerError::validation(
                    "Attendance has already been confirmed",
                ));
            }
            if !db::decline_invitee(db, invitee.id, responded_at).await? {
                // The stored status moved on since `invitee` was read
                let current = find_invitee(db, &invitee.token).await?;
                if current.status == InviteeStatus::Declined {
                    return Ok(current);
                }
                return Err(PlannerError::validation(
                    "Attendance has already been confirmed",
                ));
            }
            tracing::info!("Invitee {} declined event {}", invitee.id, event.id);
            Ok(Invitee {
                status: InviteeStatus::Declined,
                responded_at: Some(responded_at),
                ..invitee
            })
        }
        RsvpAction::Attend => {
            if !invitee.status.can_transition_to(InviteeStatus::Attending) {
                return Err(PlannerError::validation("This invitation has been declined"));
            }
            let mut slots = BTreeSet::new();
            for raw in chosen_slots {
                let slot = parse_instant(raw)?;
                if !is_on_grid(event.start, event.end, slot) {
                    return Err(PlannerError::validation(format!(
                        "{} is not one of the proposed slots",
                        raw
                    )));
                }
                slots.insert(slot);
            }
            let slot_count = slots.len();
            let replaced =
                db::replace_responses(db, invitee.id, slots.into_iter().collect(), responded_at)
                    .await?;
            if !replaced {
                return Err(PlannerError::validation("This invitation has been declined"));
            }
            tracing::info!(
                "Invitee {} is attending event {} with {} slots",
                invitee.id,
                event.id,
                slot_count
            );
            Ok(Invitee {
                status: InviteeStatus::Attending,
                responded_at: Some(responded_at),
                ..invitee
            })
        }
    }
}

/// Rank the event's slots by how many attending invitees chose them
pub async fn aggregate(db: &Connection, event_id: i64) -> Result<AggregationResult, PlannerError> {
    find_event(db, event_id).await?;
    let total_invitees = db::count_invitees(db, event_id).await?;
    let slots = db::attending_slots(db, event_id).await?;
    Ok(aggregate_slots(total_invitees, &slots))
}

async fn find_owned_event(
    db: &Connection,
    organizer_id: i64,
    event_id: i64,
) -> Result<Event, PlannerError> {
    let event = find_event(db, event_id).await?;
    if event.organizer_id != organizer_id {
        return Err(PlannerError::unauthorized(
            "You do not have access to this event",
        ));
    }
    Ok(event)
}

#[derive(Debug, Serialize)]
pub struct EventResults {
    pub event: Event,
    pub result: AggregationResult,
    pub invitees: Vec<Invitee>,
}

pub async fn event_results(
    db: &Connection,
    organizer_id: i64,
    event_id: i64,
) -> Result<EventResults, PlannerError> {
    let event = find_owned_event(db, organizer_id, event_id).await?;
    let result = aggregate(db, event_id).await?;
    let invitees = db::list_invitees(db, event_id).await?;
    Ok(EventResults {
        event,
        result,
        invitees,
    })
}

pub async fn list_events(
    db: &Connection,
    organizer_id: i64,
    status: Option<EventStatus>,
) -> Result<Vec<EventSummary>, PlannerError> {
    accounts::require_organizer(db, organizer_id).await?;
    db::list_event_summaries(db, organizer_id, status).await
}

#[derive(Debug, Clone, Default)]
pub struct FinalizeRequest {
    pub chosen_slot: Option<String>,
    pub new_title: Option<String>,
    pub custom_message: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct FinalizeOutcome {
    pub event: Event,
    pub notified: usize,
    pub attendees: usize,
}

/// Confirm the event at one of its ranked slots and tell every attending
/// invitee. The chosen slot must appear in the aggregation details.
pub async fn finalize(
    db: &Connection,
    notifier: Arc<dyn Notifier>,
    organizer_id: i64,
    event_id: i64,
    request: FinalizeRequest,
) -> Result<FinalizeOutcome, PlannerError> {
    let event = find_owned_event(db, organizer_id, event_id).await?;
    if event.status == EventStatus::Confirmed {
        return Err(PlannerError::validation("This event is already confirmed"));
    }

    let chosen = request
        .chosen_slot
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| PlannerError::validation("Please choose a date and time"))?;
    let start = parse_instant(chosen)?;

    let result = aggregate(db, event_id).await?;
    if !result.contains_slot(&start) {
        return Err(PlannerError::validation(format!(
            "{} is not one of the candidate slots",
            chosen
        )));
    }

    let title = request
        .new_title
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| event.title.clone());
    let end = start + Duration::hours(CONFIRMED_DURATION_HOURS);

    if !db::confirm_event(db, event_id, title.clone(), start, end).await? {
        return Err(PlannerError::validation("This event is already confirmed"));
    }
    tracing::info!("Event {} confirmed for {}", event_id, start);

    let confirmed = Event {
        title,
        start,
        end,
        status: EventStatus::Confirmed,
        ..event
    };

    let custom_message = request
        .custom_message
        .as_deref()
        .map(str::trim)
        .filter(|m| !m.is_empty());
    let body = templates().render(
        &EmailTemplate::EventConfirmed.to_string(),
        &json!({
            "title": confirmed.title,
            "starts_at": confirmed.start.format(DISPLAY_FORMAT).to_string(),
            "custom_message": custom_message,
        }),
    )?;
    let recipients = db::attending_emails(db, event_id).await?;
    let attendees = recipients.len();
    let notified = broadcast_email(
        notifier,
        recipients,
        format!("[Confirmed] {}", confirmed.title),
        body,
    )
    .await;
    tracing::info!("Sent confirmation to {} of {} attendees", notified, attendees);

    Ok(FinalizeOutcome {
        event: confirmed,
        notified,
        attendees,
    })
}
