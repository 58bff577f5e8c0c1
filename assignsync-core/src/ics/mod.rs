//! iCalendar parsing.
//!
//! Only the reading side of RFC 5545 is needed: the feed is parsed into
//! `CalendarEvent`s and never written back.

mod parse;

pub use parse::parse_calendar;
