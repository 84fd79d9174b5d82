//! Public types for the events API
use serde::{Deserialize, Serialize};

use crate::scheduling::EventStatus;

#[derive(Deserialize)]
pub struct CreateEventRequest {
    pub title: String,
    pub start: String,
    pub end: String,
    #[serde(default)]
    pub emails: Vec<String>,
}

#[derive(Deserialize)]
pub struct ListEventsQuery {
    pub status: Option<EventStatus>,
}

#[derive(Deserialize)]
pub struct FinalizeEventRequest {
    pub final_datetime: Option<String>,
    pub final_title: Option<String>,
    pub custom_message: Option<String>,
}

#[derive(Serialize, Deserialize)]
pub struct FinalizeEventResponse {
    pub event_id: i64,
    pub title: String,
    pub start: String,
    pub end: String,
    pub status: EventStatus,
    pub notified: usize,
    pub attendees: usize,
}
