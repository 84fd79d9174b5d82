//! Attendance ranking over attending invitees' availability.

use std::cmp::Reverse;

use chrono::NaiveDateTime;
use itertools::Itertools;
use serde::Serialize;

pub const NO_RESPONSES_MESSAGE: &str = "No availability has been submitted by attendees yet.";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SlotCount {
    pub time: NaiveDateTime,
    pub display: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregationResult {
    pub best_schedule: Option<NaiveDateTime>,
    pub attendees: usize,
    pub total_invitees: usize,
    pub participation_rate: String,
    pub details: Vec<SlotCount>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl AggregationResult {
    /// Whether `instant` is one of the ranked candidate slots
    pub fn contains_slot(&self, instant: &NaiveDateTime) -> bool {
        self.details.iter().any(|d| &d.time == instant)
    }
}

/// `attendees / total` as a percentage with one fractional digit, or
/// `"0%"` when nobody was invited.
pub fn participation_rate(attendees: usize, total_invitees: usize) -> String {
    if total_invitees == 0 {
        return "0%".to_string();
    }
    format!("{:.1}%", attendees as f64 / total_invitees as f64 * 100.0)
}

/// Count responses per instant and rank them by count descending. Ties
/// are broken by the earliest instant first so results are stable
/// across runs.
pub fn rank_slots(attending_slots: &[NaiveDateTime]) -> Vec<SlotCount> {
    attending_slots
        .iter()
        .counts()
        .into_iter()
        .sorted_by_key(|(time, count)| (Reverse(*count), **time))
        .map(|(time, count)| SlotCount {
            time: *time,
            display: time.format("%Y-%m-%d %H:%M").to_string(),
            count,
        })
        .collect()
}

/// Build the aggregation from the invitee count and every slot held by
/// an attending invitee. Responses of pending or declined invitees must
/// already be filtered out by the caller.
pub fn aggregate_slots(total_invitees: usize, attending_slots: &[NaiveDateTime]) -> AggregationResult {
    if attending_slots.is_empty() {
        return AggregationResult {
            best_schedule: None,
            attendees: 0,
            total_invitees,
            participation_rate: participation_rate(0, total_invitees),
            details: vec![],
            message: Some(NO_RESPONSES_MESSAGE.to_string()),
        };
    }

    let details = rank_slots(attending_slots);
    let (best_schedule, attendees) = details
        .first()
        .map(|best| (Some(best.time), best.count))
        .unwrap_or((None, 0));

    AggregationResult {
        best_schedule,
        attendees,
        total_invitees,
        participation_rate: participation_rate(attendees, total_invitees),
        details,
        message: None,
    }
}
