//! Calendar event types produced by the feed parser.
//!
//! Events are transient: they live for a single run, flow through the filters and
//! are turned into Notion records by the sync writer.

use chrono::{NaiveDate, NaiveDateTime, SecondsFormat, TimeZone};
use chrono_tz::Tz;

/// A VEVENT from the feed, reduced to the fields the sync needs.
#[derive(Debug, Clone, PartialEq)]
pub struct CalendarEvent {
    pub summary: String,
    pub start: EventTime,
    pub end: EventTime,
    pub description: Option<String>,
}

/// Start or end of an event, as supplied by the source.
#[derive(Debug, Clone, PartialEq)]
pub enum EventTime {
    /// All-day value (`VALUE=DATE`)
    Date(NaiveDate),
    /// `...Z` timestamps
    DateTimeUtc(chrono::DateTime<chrono::Utc>),
    /// No timezone information at all
    DateTimeFloating(NaiveDateTime),
    /// Local time in an IANA zone (`DTSTART;TZID=...`)
    DateTimeZoned { datetime: NaiveDateTime, tzid: String },
}

impl EventTime {
    /// Calendar date with the time-of-day stripped.
    ///
    /// Timed values keep the date of their own representation; nothing is converted
    /// into the machine's local zone.
    pub fn date(&self) -> NaiveDate {
        match self {
            EventTime::Date(d) => *d,
            EventTime::DateTimeUtc(dt) => dt.date_naive(),
            EventTime::DateTimeFloating(dt) => dt.date(),
            EventTime::DateTimeZoned { datetime, .. } => datetime.date(),
        }
    }

    /// Full timestamp text for the Notion date property.
    ///
    /// - `2025-03-20` becomes `2025-03-20T00:00:00`
    /// - floating values stay naive: `2025-03-20T15:00:00`
    /// - UTC and zoned values carry their offset: `2025-03-20T15:00:00+00:00`
    pub fn to_timestamp(&self) -> String {
        match self {
            EventTime::Date(d) => format_naive(&d.and_time(chrono::NaiveTime::MIN)),
            EventTime::DateTimeUtc(dt) => dt.to_rfc3339_opts(SecondsFormat::Secs, false),
            EventTime::DateTimeFloating(dt) => format_naive(dt),
            EventTime::DateTimeZoned { datetime, tzid } => match tzid.parse::<Tz>() {
                Ok(tz) => match tz.from_local_datetime(datetime).earliest() {
                    Some(zoned) => zoned.to_rfc3339_opts(SecondsFormat::Secs, false),
                    None => format_naive(datetime),
                },
                Err(_) => format_naive(datetime),
            },
        }
    }
}

fn format_naive(dt: &NaiveDateTime) -> String {
    dt.format("%Y-%m-%dT%H:%M:%S").to_string()
}
