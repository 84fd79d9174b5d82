//! Public types for the respond API
use serde::{Deserialize, Serialize};

use crate::scheduling::InviteeStatus;

#[derive(Deserialize)]
pub struct RespondRequest {
    pub action: String,
    #[serde(default)]
    pub available_slots: Vec<String>,
}

#[derive(Serialize, Deserialize)]
pub struct RespondResponse {
    // False when the action was not recognized and nothing changed
    pub accepted: bool,
    pub status: InviteeStatus,
    pub message: String,
}
