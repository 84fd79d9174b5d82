//! Persisted records for events, invitees and their availability
//! responses, plus the status transition rules.

use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::core::PlannerError;

/// Storage format for every instant column
pub const INSTANT_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Accepts `YYYY-MM-DDTHH:MM` as well as the full storage format.
/// Sub-second precision is dropped so instants compare at second
/// granularity.
pub fn parse_instant(value: &str) -> Result<NaiveDateTime, PlannerError> {
    let value = value.trim();
    NaiveDateTime::parse_from_str(value, INSTANT_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M"))
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S"))
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f"))
        .map(|dt| dt.with_nanosecond(0).unwrap_or(dt))
        .map_err(|_| PlannerError::validation(format!("Invalid date/time: {}", value)))
}

pub fn format_instant(instant: &NaiveDateTime) -> String {
    instant.format(INSTANT_FORMAT).to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    Pending,
    Confirmed,
}

impl fmt::Display for EventStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            EventStatus::Pending => write!(f, "pending"),
            EventStatus::Confirmed => write!(f, "confirmed"),
        }
    }
}

impl FromStr for EventStatus {
    type Err = PlannerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(EventStatus::Pending),
            "confirmed" => Ok(EventStatus::Confirmed),
            other => Err(PlannerError::validation(format!(
                "Unknown event status: {}",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InviteeStatus {
    Pending,
    Attending,
    Declined,
}

impl InviteeStatus {
    /// pending -> attending | declined, attending -> attending.
    /// Declined is terminal and nothing returns to pending.
    pub fn can_transition_to(self, next: InviteeStatus) -> bool {
        matches!(
            (self, next),
            (InviteeStatus::Pending, InviteeStatus::Attending)
                | (InviteeStatus::Pending, InviteeStatus::Declined)
                | (InviteeStatus::Attending, InviteeStatus::Attending)
        )
    }
}

impl fmt::Display for InviteeStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            InviteeStatus::Pending => write!(f, "pending"),
            InviteeStatus::Attending => write!(f, "attending"),
            InviteeStatus::Declined => write!(f, "declined"),
        }
    }
}

impl FromStr for InviteeStatus {
    type Err = PlannerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(InviteeStatus::Pending),
            "attending" => Ok(InviteeStatus::Attending),
            "declined" => Ok(InviteeStatus::Declined),
            other => Err(PlannerError::validation(format!(
                "Unknown invitee status: {}",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Event {
    pub id: i64,
    pub organizer_id: i64,
    pub title: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub status: EventStatus,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Invitee {
    pub id: i64,
    pub event_id: i64,
    pub email: String,
    #[serde(skip_serializing)]
    pub token: String,
    pub status: InviteeStatus,
    pub responded_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Response {
    pub id: i64,
    pub invitee_id: i64,
    pub available_slot: NaiveDateTime,
}

/// What an invitee chose to do with their invitation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RsvpAction {
    Attend,
    Decline,
}

impl RsvpAction {
    /// Unrecognized actions map to `None` and are ignored by the caller
    pub fn parse(action: &str) -> Option<Self> {
        match action.trim() {
            "attend" => Some(RsvpAction::Attend),
            "decline" => Some(RsvpAction::Decline),
            _ => None,
        }
    }
}
