//! Extraction of bookings from parsed feeds.

use stayline_core::types::CalendarEvent;

use super::core::{Component, ICalendar, names};
use super::parse::parse;
use crate::error::RfcResult;

/// ## Summary
/// Converts the VEVENTs of a calendar into bookings.
///
/// Events without a usable DTSTART and DTEND are skipped, as are events
/// whose STATUS is CANCELLED. Date-times contribute their calendar day only;
/// DTEND is kept exclusive.
#[must_use]
pub fn extract_events(ical: &ICalendar) -> Vec<CalendarEvent> {
    ical.events()
        .into_iter()
        .filter_map(event_from_component)
        .collect()
}

fn event_from_component(component: &Component) -> Option<CalendarEvent> {
    if component
        .status()
        .is_some_and(|s| s.trim().eq_ignore_ascii_case("CANCELLED"))
    {
        tracing::trace!(uid = ?component.uid(), "Skipping cancelled event");
        return None;
    }

    let start = component
        .get_property(names::DTSTART)
        .and_then(|p| p.as_calendar_day());
    let end = component
        .get_property(names::DTEND)
        .and_then(|p| p.as_calendar_day());

    let (Some(start), Some(end)) = (start, end) else {
        tracing::debug!(uid = ?component.uid(), "Skipping event without usable DTSTART/DTEND");
        return None;
    };

    Some(CalendarEvent {
        uid: non_empty(component.uid()),
        start,
        end,
        summary: non_empty(component.summary()),
        description: non_empty(component.description()),
    })
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// ## Summary
/// Parses an iCalendar feed body into bookings.
///
/// ## Errors
/// Returns an error if the body is not an iCalendar document.
#[tracing::instrument(skip(body), fields(body_len = body.len()))]
pub fn parse_feed(body: &str) -> RfcResult<Vec<CalendarEvent>> {
    let ical = parse(body)?;
    let events = extract_events(&ical);
    tracing::debug!(count = events.len(), "Extracted events from feed");
    Ok(events)
}
