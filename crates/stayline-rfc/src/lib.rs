//! Calendar wire formats used by the engine.
//!
//! Only iCalendar (RFC 5545) is implemented: inbound feeds are parsed into
//! [`stayline_core::types::CalendarEvent`] values and the outbound feed is
//! serialized from the same component model.

pub mod error;
pub mod rfc;
