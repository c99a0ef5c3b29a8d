//! Typed readers for the value forms booking feeds use.

use chrono::{NaiveDate, NaiveTime};

use super::error::{ParseError, ParseErrorKind, ParseResult};
use crate::rfc::ical::core::{DateTime, DateTimeForm};

/// Splits a run of ASCII digits into fields of the given widths.
fn digit_fields<const N: usize>(s: &str, widths: [usize; N]) -> Option<[u32; N]> {
    if s.len() != widths.iter().sum::<usize>() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let mut fields = [0; N];
    let mut offset = 0;
    for (field, width) in fields.iter_mut().zip(widths) {
        *field = s[offset..offset + width].parse().ok()?;
        offset += width;
    }
    Some(fields)
}

/// ## Summary
/// Reads a `YYYYMMDD` date.
///
/// ## Errors
/// Returns `InvalidDate` unless the value is eight digits naming a real day.
pub fn parse_date(s: &str, line: usize, col: usize) -> ParseResult<NaiveDate> {
    let invalid = || ParseError::new(ParseErrorKind::InvalidDate, line, col).with_context(s);
    let [year, month, day] = digit_fields(s, [4, 2, 2]).ok_or_else(invalid)?;
    let year = i32::try_from(year).map_err(|e| invalid().with_context(e.to_string()))?;
    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(invalid)
}

/// Reads `HHMMSS[Z]`, reporting whether the time was UTC. A leap second
/// reads as second 59.
fn parse_time(s: &str, line: usize, col: usize) -> ParseResult<(NaiveTime, bool)> {
    let (digits, is_utc) = s.strip_suffix('Z').map_or((s, false), |d| (d, true));
    let invalid = || ParseError::new(ParseErrorKind::InvalidTime, line, col);

    let [hour, minute, second] = digit_fields(digits, [2, 2, 2]).ok_or_else(invalid)?;
    let time = NaiveTime::from_hms_opt(hour, minute, second.min(59)).ok_or_else(invalid)?;
    Ok((time, is_utc))
}

/// ## Summary
/// Reads `YYYYMMDDTHHMMSS[Z]`. A trailing `Z` makes the value UTC even when
/// a `TZID` is present; otherwise a `TZID` makes it zoned.
///
/// ## Errors
/// Returns `InvalidDateTime` without a `T` separator, or the error of the
/// malformed half.
pub fn parse_datetime(
    s: &str,
    tzid: Option<&str>,
    line: usize,
    col: usize,
) -> ParseResult<DateTime> {
    let Some((date_part, time_part)) = s.split_once(['T', 't']) else {
        return Err(ParseError::new(ParseErrorKind::InvalidDateTime, line, col));
    };

    let date = parse_date(date_part, line, col)?;
    let (time, is_utc) = parse_time(time_part, line, col + date_part.len() + 1)?;

    let form = match (is_utc, tzid) {
        (true, _) => DateTimeForm::Utc,
        (false, Some(tzid)) => DateTimeForm::Zoned {
            tzid: tzid.to_string(),
        },
        (false, None) => DateTimeForm::Floating,
    };

    Ok(DateTime::new(date, time, form))
}

/// ## Errors
/// Returns `InvalidInteger` if the trimmed value is not an `i32`.
pub fn parse_integer(s: &str, line: usize, col: usize) -> ParseResult<i32> {
    s.trim().parse().map_err(|e: std::num::ParseIntError| {
        ParseError::new(ParseErrorKind::InvalidInteger, line, col).with_context(e.to_string())
    })
}

/// Unescapes text values (RFC 5545 §3.3.11).
///
/// Escape sequences: \\ \, \; \n \N
#[must_use]
pub fn unescape_text(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars();

    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some('n' | 'N') => result.push('\n'),
                Some(',') => result.push(','),
                Some(';') => result.push(';'),
                Some('\\') | None => result.push('\\'),
                Some(other) => {
                    result.push('\\');
                    result.push(other);
                }
            }
        } else {
            result.push(c);
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_date_basic() {
        let date = parse_date("20260123", 1, 1).unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2026, 1, 23).unwrap());
    }

    #[test]
    fn parse_date_rejects_impossible_dates() {
        assert!(parse_date("20250230", 1, 1).is_err());
        assert!(parse_date("2025011", 1, 1).is_err());
        assert!(parse_date("2025-1-10", 1, 1).is_err());
    }

    #[test]
    fn parse_datetime_forms() {
        let utc = parse_datetime("20250110T140000Z", None, 1, 1).unwrap();
        assert_eq!(utc.form, DateTimeForm::Utc);
        assert_eq!(utc.time, NaiveTime::from_hms_opt(14, 0, 0).unwrap());

        let zoned = parse_datetime("20250110T140000", Some("Asia/Bangkok"), 1, 1).unwrap();
        assert_eq!(
            zoned.form,
            DateTimeForm::Zoned {
                tzid: "Asia/Bangkok".to_string()
            }
        );

        let floating = parse_datetime("20250110T140000", None, 1, 1).unwrap();
        assert_eq!(floating.form, DateTimeForm::Floating);
    }

    #[test]
    fn parse_datetime_rejects_missing_time() {
        assert_eq!(
            parse_datetime("20250110", None, 2, 1).unwrap_err().kind,
            ParseErrorKind::InvalidDateTime
        );
        assert_eq!(
            parse_datetime("20250110T2500", None, 2, 1).unwrap_err().kind,
            ParseErrorKind::InvalidTime
        );
    }

    #[test]
    fn unescape_text_sequences() {
        assert_eq!(unescape_text("a\\, b\\; c\\nd\\\\e"), "a, b; c\nd\\e");
        assert_eq!(unescape_text("keep\\x"), "keep\\x");
    }

    #[test]
    fn parse_integer_trims() {
        assert_eq!(parse_integer(" 3", 1, 1).unwrap(), 3);
        assert!(parse_integer("three", 1, 1).is_err());
    }
}
