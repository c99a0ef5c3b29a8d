//! Round-trip parsing and serialization tests for iCalendar.

use super::fixtures::{CHANNEL_FEED, TIMED_FEED};
use crate::rfc::ical::build::serialize;
use crate::rfc::ical::core::ComponentKind;
use crate::rfc::ical::events::extract_events;
use crate::rfc::ical::parse::parse;

/// Parse, serialize, parse again and compare what the engine reads.
fn round_trip(input: &str) -> Result<(), String> {
    let ical1 = parse(input).map_err(|e| format!("First parse failed: {e}"))?;

    let serialized = serialize(&ical1);

    let ical2 =
        parse(&serialized).map_err(|e| format!("Second parse failed: {e}\n{serialized}"))?;

    if ical1.version() != ical2.version() {
        return Err(format!(
            "Version mismatch: {:?} vs {:?}",
            ical1.version(),
            ical2.version()
        ));
    }

    let events1 = extract_events(&ical1);
    let events2 = extract_events(&ical2);
    if events1 != events2 {
        return Err(format!("Event mismatch: {events1:?} vs {events2:?}"));
    }

    Ok(())
}

#[test]
fn round_trip_channel_feed() {
    round_trip(CHANNEL_FEED).unwrap();
}

#[test]
fn round_trip_timed_feed() {
    round_trip(TIMED_FEED).unwrap();
}

#[test]
fn channel_feed_unfolds_description() {
    let ical = parse(CHANNEL_FEED).unwrap();
    let events = extract_events(&ical);

    assert_eq!(events.len(), 2);
    let description = events[0].description.as_deref().unwrap();
    assert!(description.contains("reservations/details/HMABCDEF"));
    assert!(description.contains("\nPhone Number"));
    assert_eq!(events[1].summary.as_deref(), Some("Not available"));
}

#[test]
fn timed_feed_keeps_timezone_component() {
    let ical = parse(TIMED_FEED).unwrap();
    assert_eq!(ical.root.children_of_kind(ComponentKind::Timezone).count(), 1);

    let serialized = serialize(&ical);
    let tz = serialized.find("BEGIN:VTIMEZONE").unwrap();
    let ev = serialized.find("BEGIN:VEVENT").unwrap();
    assert!(tz < ev);
    assert!(serialized.contains("SUMMARY:Direct booking\\, deposit paid\r\n"));
}
