//! Parsing and serialization tests for iCalendar.

mod round_trip;
