//! Event filters.
//!
//! Both filters are pure and commute, so the pipeline can apply them in any order.

use chrono::NaiveDate;

use crate::event::CalendarEvent;

/// Substrings that mark a title as an assignment ("Unit 3: Essay Draft").
///
/// This is a plain containment check: "Ch 1:2 Quiz" and "v2:1:widget" match too.
pub const ASSIGNMENT_MARKERS: [&str; 7] = ["1:", "2:", "3:", "4:", "5:", "6:", "7:"];

/// Keep events whose start date is `today` or later.
pub fn filter_future(events: &[CalendarEvent], today: NaiveDate) -> Vec<CalendarEvent> {
    events
        .iter()
        .filter(|e| e.start.date() >= today)
        .cloned()
        .collect()
}

/// Keep events whose summary contains an assignment marker.
pub fn filter_assignments(events: &[CalendarEvent]) -> Vec<CalendarEvent> {
    events
        .iter()
        .filter(|e| is_assignment(&e.summary))
        .cloned()
        .collect()
}

pub fn is_assignment(summary: &str) -> bool {
    ASSIGNMENT_MARKERS
        .iter()
        .any(|marker| summary.contains(marker))
}
