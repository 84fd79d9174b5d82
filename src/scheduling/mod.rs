//! Availability aggregation and best-slot selection for proposed events.

pub mod aggregate;
pub mod db;
pub mod grid;
pub mod models;
pub mod service;

pub use aggregate::{AggregationResult, SlotCount, aggregate_slots};
pub use grid::{DayGroup, SlotOption, generate_slot_grid};
pub use models::{Event, EventStatus, Invitee, InviteeStatus, RsvpAction};
pub use service::{
    FinalizeRequest, NewInvitation, aggregate, create_invitation, event_results, finalize,
    list_events, record_response, respond_view,
};
