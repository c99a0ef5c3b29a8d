//! iCalendar (RFC 5545) as booking feeds use it.
//!
//! `parse` turns a document into a component tree, `events` reads bookings
//! out of that tree, and `build` writes a tree back out with escaping and
//! folding.
//!
//! ```rust
//! use chrono::NaiveDate;
//! use stayline_rfc::rfc::ical::{Component, ICalendar, Property, parse_feed, serialize};
//!
//! let mut ical = ICalendar::new("-//Example//Bookings//EN");
//! let mut event = Component::event();
//! event.add_property(Property::text("UID", "booking-1"));
//! event.add_property(Property::date("DTSTART", NaiveDate::from_ymd_opt(2025, 1, 10).unwrap()));
//! event.add_property(Property::date("DTEND", NaiveDate::from_ymd_opt(2025, 1, 12).unwrap()));
//! ical.add_event(event);
//!
//! let bookings = parse_feed(&serialize(&ical)).unwrap();
//! assert_eq!(bookings[0].occupied_days().len(), 2);
//! ```

pub mod build;
pub mod core;
pub mod events;
pub mod parse;

#[cfg(test)]
mod tests;

pub use build::serialize;
pub use core::{Component, ComponentKind, ICalendar, Parameter, Property};
pub use events::{extract_events, parse_feed};
pub use parse::{ParseError, ParseResult, parse};
