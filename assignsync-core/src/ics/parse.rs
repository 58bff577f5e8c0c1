//! ICS parsing using the icalendar crate's parser.

use icalendar::{
    CalendarDateTime, DatePerhapsTime,
    parser::{Component, read_calendar, unfold},
};
use tracing::warn;

use crate::error::{SyncError, SyncResult};
use crate::event::{CalendarEvent, EventTime};

/// Parse a whole calendar document into its VEVENTs.
///
/// VTODO, VFREEBUSY, VTIMEZONE and any other component types are ignored. A VEVENT
/// without a usable DTSTART is dropped with a warning instead of failing the feed.
pub fn parse_calendar(content: &str) -> SyncResult<Vec<CalendarEvent>> {
    let content = content.trim_start_matches('\u{feff}').trim_start();
    let opens_calendar = content
        .get(.."BEGIN:VCALENDAR".len())
        .is_some_and(|head| head.eq_ignore_ascii_case("BEGIN:VCALENDAR"));
    if !opens_calendar {
        return Err(SyncError::IcsParse(
            "document does not start with BEGIN:VCALENDAR".into(),
        ));
    }

    let unfolded = unfold(content);
    let calendar = read_calendar(&unfolded).map_err(|e| SyncError::IcsParse(e.to_string()))?;

    let events = calendar
        .components
        .iter()
        .filter(|c| c.name == "VEVENT")
        .filter_map(|vevent| {
            let event = parse_vevent(vevent);
            if event.is_none() {
                let uid = vevent.find_prop("UID").map(|p| p.val.to_string());
                warn!(uid = ?uid, "Skipping VEVENT without a valid DTSTART");
            }
            event
        })
        .collect();

    Ok(events)
}

fn parse_vevent(vevent: &Component) -> Option<CalendarEvent> {
    let start = vevent
        .find_prop("DTSTART")
        .and_then(|p| DatePerhapsTime::try_from(p).ok())
        .map(to_event_time)?;

    // DTEND is optional in RFC 5545 (DURATION or nothing at all)
    let end = vevent
        .find_prop("DTEND")
        .and_then(|p| DatePerhapsTime::try_from(p).ok())
        .map(to_event_time)
        .unwrap_or_else(|| start.clone());

    let summary = vevent
        .find_prop("SUMMARY")
        .map(|p| p.val.to_string())
        .unwrap_or_default();
    let description = vevent
        .find_prop("DESCRIPTION")
        .map(|p| p.val.to_string());

    Some(CalendarEvent {
        summary,
        start,
        end,
        description,
    })
}

/// Convert icalendar's DatePerhapsTime to our EventTime, preserving timezone info
fn to_event_time(dpt: DatePerhapsTime) -> EventTime {
    match dpt {
        DatePerhapsTime::Date(d) => EventTime::Date(d),
        DatePerhapsTime::DateTime(cal_dt) => match cal_dt {
            CalendarDateTime::Utc(dt) => EventTime::DateTimeUtc(dt),
            CalendarDateTime::Floating(naive) => EventTime::DateTimeFloating(naive),
            CalendarDateTime::WithTimezone { date_time, tzid } => EventTime::DateTimeZoned {
                datetime: date_time,
                tzid,
            },
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone, Utc};

    const FEED: &str = "BEGIN:VCALENDAR\r\n\
VERSION:2.0\r\n\
PRODID:-//Canvas//EN\r\n\
BEGIN:VTIMEZONE\r\n\
TZID:America/New_York\r\n\
END:VTIMEZONE\r\n\
BEGIN:VEVENT\r\n\
UID:event-1\r\n\
SUMMARY:Unit 3: Essay Draft\r\n\
DTSTART:20250320T150000Z\r\n\
DTEND:20250320T160000Z\r\n\
DESCRIPTION:Submit via the portal\\, not email\r\n\
END:VEVENT\r\n\
BEGIN:VEVENT\r\n\
UID:event-2\r\n\
SUMMARY:Unit 4: Lab Report\r\n\
DTSTART;VALUE=DATE:20250322\r\n\
DTEND;VALUE=DATE:20250323\r\n\
END:VEVENT\r\n\
BEGIN:VTODO\r\n\
UID:todo-1\r\n\
SUMMARY:Unit 1: Not an event\r\n\
END:VTODO\r\n\
END:VCALENDAR\r\n";

    #[test]
    fn test_parses_only_vevents() {
        let events = parse_calendar(FEED).expect("Should parse");

        assert_eq!(events.len(), 2);
        assert!(events.iter().all(|e| e.summary != "Unit 1: Not an event"));
    }

    #[test]
    fn test_parses_fields() {
        let events = parse_calendar(FEED).expect("Should parse");
        let essay = events
            .iter()
            .find(|e| e.summary == "Unit 3: Essay Draft")
            .expect("Should contain essay");

        assert_eq!(
            essay.start,
            EventTime::DateTimeUtc(Utc.with_ymd_and_hms(2025, 3, 20, 15, 0, 0).unwrap())
        );
        assert_eq!(
            essay.description.as_deref(),
            Some("Submit via the portal, not email")
        );
    }

    #[test]
    fn test_missing_description_is_none() {
        let events = parse_calendar(FEED).expect("Should parse");
        let lab = events
            .iter()
            .find(|e| e.summary == "Unit 4: Lab Report")
            .expect("Should contain lab report");

        assert_eq!(lab.description, None);
        assert_eq!(
            lab.start,
            EventTime::Date(NaiveDate::from_ymd_opt(2025, 3, 22).unwrap())
        );
    }

    #[test]
    fn test_zoned_start_keeps_tzid() {
        let ics = "BEGIN:VCALENDAR\r\n\
VERSION:2.0\r\n\
BEGIN:VEVENT\r\n\
UID:zoned\r\n\
SUMMARY:Unit 2: Quiz\r\n\
DTSTART;TZID=America/New_York:20250401T235900\r\n\
DTEND;TZID=America/New_York:20250401T235900\r\n\
END:VEVENT\r\n\
END:VCALENDAR\r\n";

        let events = parse_calendar(ics).expect("Should parse");
        match &events[0].start {
            EventTime::DateTimeZoned { tzid, .. } => assert_eq!(tzid, "America/New_York"),
            other => panic!("Expected DateTimeZoned, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_dtend_falls_back_to_start() {
        let ics = "BEGIN:VCALENDAR\r\n\
VERSION:2.0\r\n\
BEGIN:VEVENT\r\n\
UID:no-end\r\n\
SUMMARY:Unit 5: Reading\r\n\
DTSTART;VALUE=DATE:20250401\r\n\
END:VEVENT\r\n\
END:VCALENDAR\r\n";

        let events = parse_calendar(ics).expect("Should parse");
        assert_eq!(events[0].end, events[0].start);
    }

    #[test]
    fn test_vevent_without_dtstart_is_skipped() {
        let ics = "BEGIN:VCALENDAR\r\n\
VERSION:2.0\r\n\
BEGIN:VEVENT\r\n\
UID:broken\r\n\
SUMMARY:Unit 6: Broken\r\n\
END:VEVENT\r\n\
BEGIN:VEVENT\r\n\
UID:fine\r\n\
SUMMARY:Unit 6: Fine\r\n\
DTSTART:20250401T100000Z\r\n\
DTEND:20250401T110000Z\r\n\
END:VEVENT\r\n\
END:VCALENDAR\r\n";

        let events = parse_calendar(ics).expect("Should parse");
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].summary, "Unit 6: Fine");
    }

    #[test]
    fn test_rejects_non_calendar_body() {
        let result = parse_calendar("<!DOCTYPE html><html><body>Sign in</body></html>");
        assert!(matches!(result, Err(SyncError::IcsParse(_))));
    }

    #[test]
    fn test_accepts_lowercase_begin() {
        let ics = "begin:VCALENDAR\r\n\
VERSION:2.0\r\n\
BEGIN:VEVENT\r\n\
UID:lower\r\n\
SUMMARY:Unit 1: Quiz\r\n\
DTSTART;VALUE=DATE:20250401\r\n\
END:VEVENT\r\n\
END:VCALENDAR\r\n";

        let events = parse_calendar(ics).expect("Should parse");
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].summary, "Unit 1: Quiz");
    }

    #[test]
    fn test_text_values_unescaped_once() {
        let ics = "BEGIN:VCALENDAR\r\n\
VERSION:2.0\r\n\
BEGIN:VEVENT\r\n\
UID:paths\r\n\
SUMMARY:Unit 2: Copy C:\\\\Users\r\n\
DTSTART;VALUE=DATE:20250401\r\n\
DESCRIPTION:C:\\\\new\\, folder\r\n\
END:VEVENT\r\n\
END:VCALENDAR\r\n";

        let events = parse_calendar(ics).expect("Should parse");
        assert_eq!(events[0].summary, r"Unit 2: Copy C:\Users");
        assert_eq!(events[0].description.as_deref(), Some(r"C:\new, folder"));
    }
}
