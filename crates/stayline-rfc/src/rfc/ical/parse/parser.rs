//! iCalendar document parser (RFC 5545).
//!
//! Parses complete iCalendar documents into the component tree. Structure
//! errors (unbalanced BEGIN/END) fail the document; malformed content lines
//! and unparseable values do not, because booking feeds in the wild are
//! rarely strict.

use super::error::{ParseError, ParseErrorKind, ParseResult};
use super::lexer::{parse_content_line, split_lines};
use super::values::{parse_date, parse_datetime, parse_integer, unescape_text};
use crate::rfc::ical::core::{Component, ComponentKind, ContentLine, ICalendar, Property, Value};

/// ## Summary
/// Parses a document into its component tree.
///
/// Lines after the closing `END:VCALENDAR` are ignored.
///
/// ## Errors
/// Returns an error if the document does not start with
/// `BEGIN:VCALENDAR` or its BEGIN/END lines do not nest.
#[tracing::instrument(skip(input), fields(input_len = input.len()))]
pub fn parse(input: &str) -> ParseResult<ICalendar> {
    let mut lines = split_lines(input)
        .into_iter()
        .filter_map(|(line_num, line)| match parse_content_line(&line, line_num) {
            Ok(cl) => Some((line_num, cl)),
            Err(error) => {
                tracing::debug!(%error, "Skipping malformed content line");
                None
            }
        });

    let Some((line_num, begin)) = lines.next() else {
        tracing::warn!("No content lines in calendar input");
        return Err(ParseError::new(ParseErrorKind::MissingBegin, 1, 1));
    };
    if begin.name != "BEGIN" || !begin.raw_value.trim().eq_ignore_ascii_case("VCALENDAR") {
        tracing::warn!(first_line = %begin.name, "Root component is not VCALENDAR");
        return Err(ParseError::new(ParseErrorKind::MissingBegin, line_num, 1)
            .with_context("expected BEGIN:VCALENDAR"));
    }

    // Components still waiting for their END line, innermost last.
    let mut open: Vec<(usize, Component)> = vec![(line_num, Component::named("VCALENDAR"))];

    for (line_num, cl) in lines {
        match cl.name.as_str() {
            "BEGIN" => open.push((line_num, Component::named(cl.raw_value.trim()))),
            "END" => {
                let Some((_, component)) = open.pop() else {
                    break;
                };
                let end_name = cl.raw_value.trim().to_ascii_uppercase();
                if end_name != component.name {
                    return Err(
                        ParseError::new(ParseErrorKind::MismatchedComponent, line_num, 1)
                            .with_context(format!(
                                "expected END:{}, got END:{end_name}",
                                component.name
                            )),
                    );
                }
                match open.last_mut() {
                    Some((_, parent)) => parent.children.push(component),
                    None => {
                        tracing::debug!(
                            events = component.children_of_kind(ComponentKind::Event).count(),
                            "Calendar document parsed"
                        );
                        return Ok(ICalendar { root: component });
                    }
                }
            }
            _ => {
                if let Some((_, current)) = open.last_mut() {
                    current.properties.push(parse_property(cl, line_num));
                }
            }
        }
    }

    let (begin_line, unclosed) = open.pop().map_or((line_num, "VCALENDAR".to_string()), |(l, c)| (l, c.name));
    Err(ParseError::new(ParseErrorKind::MissingEnd, begin_line, 1)
        .with_context(format!("missing END:{unclosed}")))
}

/// Parses a property from a content line, resolving the value type.
///
/// A value that does not match its type is kept as [`Value::Unknown`].
fn parse_property(cl: ContentLine, line_num: usize) -> Property {
    let value_type = determine_value_type(&cl);

    let parsed = match value_type {
        ValueType::Text => Ok(Value::Text(unescape_text(&cl.raw_value))),
        ValueType::Date => parse_date(cl.raw_value.trim(), line_num, 1).map(Value::Date),
        ValueType::DateTime => {
            parse_datetime(cl.raw_value.trim(), cl.tzid(), line_num, 1).map(Value::DateTime)
        }
        ValueType::Integer => parse_integer(&cl.raw_value, line_num, 1).map(Value::Integer),
        ValueType::Unknown => Ok(Value::Unknown(cl.raw_value.clone())),
    };

    let value = parsed.unwrap_or_else(|error| {
        tracing::debug!(property = %cl.name, %error, "Keeping unparseable value verbatim");
        Value::Unknown(cl.raw_value.clone())
    });

    Property {
        name: cl.name,
        params: cl.params,
        value,
        raw_value: cl.raw_value,
    }
}

/// Determines the value type for a property.
fn determine_value_type(cl: &ContentLine) -> ValueType {
    if let Some(value_type) = cl.value_type() {
        return ValueType::from_param(value_type);
    }

    match cl.name.as_str() {
        "DTSTART" | "DTEND" | "DTSTAMP" | "CREATED" | "LAST-MODIFIED" | "RECURRENCE-ID" => {
            // Date-only values without VALUE=DATE are common in booking feeds.
            if cl.raw_value.trim().len() == 8 {
                ValueType::Date
            } else {
                ValueType::DateTime
            }
        }

        "PRIORITY" | "SEQUENCE" => ValueType::Integer,

        "CATEGORIES" | "CLASS" | "COMMENT" | "DESCRIPTION" | "LOCATION" | "METHOD" | "PRODID"
        | "STATUS" | "SUMMARY" | "TRANSP" | "UID" | "VERSION" | "CALSCALE" | "X-WR-CALNAME" => {
            ValueType::Text
        }

        name if name.starts_with("X-") => ValueType::Text,

        _ => ValueType::Unknown,
    }
}

/// Value types the engine resolves; the rest stay verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ValueType {
    Date,
    DateTime,
    Integer,
    Text,
    Unknown,
}

impl ValueType {
    fn from_param(s: &str) -> Self {
        match s.to_ascii_uppercase().as_str() {
            "DATE" => Self::Date,
            "DATE-TIME" => Self::DateTime,
            "INTEGER" => Self::Integer,
            "TEXT" => Self::Text,
            _ => Self::Unknown,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    #[test]
    fn parse_minimal_calendar() {
        let input = "BEGIN:VCALENDAR\r\nVERSION:2.0\r\nPRODID:-//Test//EN\r\nEND:VCALENDAR\r\n";
        let ical = parse(input).unwrap();
        assert_eq!(ical.version(), Some("2.0"));
        assert_eq!(ical.prodid(), Some("-//Test//EN"));
        assert!(ical.events().is_empty());
    }

    #[test]
    fn parse_resolves_date_values() {
        let input = "BEGIN:VCALENDAR\r\n\
BEGIN:VEVENT\r\n\
UID:abc\r\n\
DTSTART;VALUE=DATE:20250110\r\n\
DTEND:20250112\r\n\
DTSTAMP:20250101T000000Z\r\n\
SEQUENCE:2\r\n\
END:VEVENT\r\n\
END:VCALENDAR\r\n";
        let ical = parse(input).unwrap();
        let events = ical.events();
        let event = events[0];
        assert_eq!(
            event.get_property("DTSTART").unwrap().value,
            Value::Date(NaiveDate::from_ymd_opt(2025, 1, 10).unwrap())
        );
        assert_eq!(
            event.get_property("DTEND").unwrap().as_calendar_day(),
            NaiveDate::from_ymd_opt(2025, 1, 12)
        );
        assert!(event.get_property("DTSTAMP").unwrap().value.as_datetime().is_some());
        assert_eq!(event.get_property("SEQUENCE").unwrap().as_integer(), Some(2));
    }

    #[test]
    fn parse_keeps_bad_values_as_unknown() {
        let input = "BEGIN:VCALENDAR\nBEGIN:VEVENT\nDTSTART:2025-01-10\nEND:VEVENT\nEND:VCALENDAR\n";
        let ical = parse(input).unwrap();
        let events = ical.events();
        assert_eq!(
            events[0].get_property("DTSTART").unwrap().value,
            Value::Unknown("2025-01-10".to_string())
        );
    }

    #[test]
    fn parse_skips_malformed_lines() {
        let input = "BEGIN:VCALENDAR\nBROKEN LINE:x\nBEGIN:VEVENT\nUID:1\nEND:VEVENT\nEND:VCALENDAR\n";
        let ical = parse(input).unwrap();
        assert_eq!(ical.events().len(), 1);
    }

    #[test]
    fn parse_rejects_non_calendar_root() {
        let err = parse("BEGIN:VCARD\nEND:VCARD\n").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::MissingBegin);
        assert!(parse("").is_err());
        assert!(parse("<html>not a feed</html>").is_err());
    }

    #[test]
    fn parse_rejects_unbalanced_components() {
        let err = parse("BEGIN:VCALENDAR\nBEGIN:VEVENT\nEND:VCALENDAR\n").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::MismatchedComponent);

        let err = parse("BEGIN:VCALENDAR\nBEGIN:VEVENT\nUID:1\n").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::MissingEnd);
    }
}
