//! Candidate slot grid for an event's proposal window.
//!
//! The daily hour range is taken from the window's start and end
//! *times* and repeated across every calendar day the window's *dates*
//! span, inclusive. A window of 09:00 on Monday to 17:00 on Wednesday
//! yields 09:00..16:00 on each of the three days.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SlotOption {
    pub value: NaiveDateTime,
    pub display: String,
}

/// All selectable slots for a single calendar day
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayGroup {
    pub date: NaiveDate,
    pub label: String,
    pub slots: Vec<SlotOption>,
}

pub fn day_label(date: &NaiveDate) -> String {
    date.format("%Y-%m-%d (%a)").to_string()
}

/// Build the hourly grid for `[start.date, end.date]`, using hours
/// `[start.hour, end.hour)` on each day. Days without any slot are
/// omitted, so when `start.hour >= end.hour` the result is empty.
pub fn generate_slot_grid(event_start: NaiveDateTime, event_end: NaiveDateTime) -> Vec<DayGroup> {
    let daily_start = event_start.hour();
    let daily_end = event_end.hour();
    if daily_start >= daily_end {
        return vec![];
    }

    let mut groups = Vec::new();
    let mut day = event_start.date();
    let last_day = event_end.date();
    while day <= last_day {
        let slots = (daily_start..daily_end)
            .filter_map(|hour| NaiveTime::from_hms_opt(hour, 0, 0))
            .map(|time| {
                let value = day.and_time(time);
                SlotOption {
                    value,
                    display: value.format("%H:%M").to_string(),
                }
            })
            .collect::<Vec<_>>();

        if !slots.is_empty() {
            groups.push(DayGroup {
                date: day,
                label: day_label(&day),
                slots,
            });
        }

        match day.succ_opt() {
            Some(next) => day = next,
            None => break,
        }
    }

    groups
}

/// Whether `instant` is one of the grid's slots for this window
pub fn is_on_grid(event_start: NaiveDateTime, event_end: NaiveDateTime, instant: NaiveDateTime) -> bool {
    let date = instant.date();
    instant.minute() == 0
        && instant.second() == 0
        && date >= event_start.date()
        && date <= event_end.date()
        && instant.hour() >= event_start.hour()
        && instant.hour() < event_end.hour()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    #[test]
    fn it_repeats_daily_hours_across_each_day() {
        let grid = generate_slot_grid(at(2024, 6, 1, 9, 0), at(2024, 6, 3, 17, 0));

        assert_eq!(grid.len(), 3);
        assert!(grid.iter().all(|day| day.slots.len() == 8));
        assert_eq!(grid.iter().map(|d| d.slots.len()).sum::<usize>(), 24);

        let first = &grid[0];
        assert_eq!(first.label, "2024-06-01 (Sat)");
        assert_eq!(first.slots[0].value, at(2024, 6, 1, 9, 0));
        assert_eq!(first.slots[0].display, "09:00");
        assert_eq!(first.slots[7].display, "16:00");
        assert_eq!(grid[2].slots[7].value, at(2024, 6, 3, 16, 0));
    }

    #[test]
    fn it_is_empty_when_start_hour_is_not_before_end_hour() {
        assert!(generate_slot_grid(at(2024, 6, 1, 17, 0), at(2024, 6, 3, 9, 0)).is_empty());
        assert!(generate_slot_grid(at(2024, 6, 1, 12, 0), at(2024, 6, 2, 12, 0)).is_empty());
    }

    #[test]
    fn it_ignores_minutes_when_bounding_hours() {
        let grid = generate_slot_grid(at(2024, 6, 1, 9, 30), at(2024, 6, 1, 11, 45));
        assert_eq!(grid.len(), 1);
        let displays: Vec<_> = grid[0].slots.iter().map(|s| s.display.as_str()).collect();
        assert_eq!(displays, vec!["09:00", "10:00"]);
    }

    #[test]
    fn it_stops_at_the_last_representable_day() {
        let last = NaiveDate::MAX;
        let start = last.pred_opt().unwrap().and_hms_opt(9, 0, 0).unwrap();
        let end = last.and_hms_opt(17, 0, 0).unwrap();

        let grid = generate_slot_grid(start, end);
        assert_eq!(grid.len(), 2);
        assert_eq!(grid[1].date, last);
        assert_eq!(grid[1].slots.len(), 8);
    }

    #[test]
    fn it_checks_grid_membership() {
        let (start, end) = (at(2024, 6, 1, 9, 0), at(2024, 6, 2, 17, 0));
        assert!(is_on_grid(start, end, at(2024, 6, 2, 9, 0)));
        assert!(is_on_grid(start, end, at(2024, 6, 1, 16, 0)));
        assert!(!is_on_grid(start, end, at(2024, 6, 1, 17, 0)));
        assert!(!is_on_grid(start, end, at(2024, 6, 1, 8, 0)));
        assert!(!is_on_grid(start, end, at(2024, 6, 3, 10, 0)));
        assert!(!is_on_grid(start, end, at(2024, 6, 1, 10, 30)));
    }

    #[test]
    fn grid_membership_agrees_with_generated_grid() {
        let (start, end) = (at(2024, 2, 28, 8, 0), at(2024, 3, 1, 12, 0));
        let grid = generate_slot_grid(start, end);
        assert_eq!(grid.len(), 3);
        for slot in grid.iter().flat_map(|d| d.slots.iter()) {
            assert!(is_on_grid(start, end, slot.value));
        }
    }
}
