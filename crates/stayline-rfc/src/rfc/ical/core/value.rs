//! iCalendar value types (RFC 5545 §3.3).

use std::fmt;

use chrono::{NaiveDate, NaiveTime};

/// How a DATE-TIME value is anchored (RFC 5545 §3.3.5).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DateTimeForm {
    /// Local time without zone information.
    Floating,
    /// UTC time (trailing `Z`).
    Utc,
    /// Local time in the zone named by a `TZID` parameter.
    Zoned { tzid: String },
}

/// DATE-TIME value (RFC 5545 §3.3.5).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DateTime {
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub form: DateTimeForm,
}

impl DateTime {
    #[must_use]
    pub const fn new(date: NaiveDate, time: NaiveTime, form: DateTimeForm) -> Self {
        Self { date, time, form }
    }

    /// Creates a UTC date-time.
    #[must_use]
    pub const fn utc(date: NaiveDate, time: NaiveTime) -> Self {
        Self::new(date, time, DateTimeForm::Utc)
    }
}

impl fmt::Display for DateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}T{}",
            self.date.format("%Y%m%d"),
            self.time.format("%H%M%S")
        )?;
        if self.form == DateTimeForm::Utc {
            f.write_str("Z")?;
        }
        Ok(())
    }
}

/// Parsed property value.
///
/// The raw string is preserved separately on the property for round-trip
/// fidelity; value types the engine never interprets stay `Unknown`.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// DATE value.
    Date(NaiveDate),
    /// DATE-TIME value.
    DateTime(DateTime),
    /// INTEGER value.
    Integer(i32),
    /// TEXT value (unescaped).
    Text(String),
    /// Any other value, kept verbatim.
    Unknown(String),
}

impl Value {
    /// Returns the value as text if it is a text value.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the value as an integer if it is an integer value.
    #[must_use]
    pub const fn as_integer(&self) -> Option<i32> {
        match self {
            Self::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Returns the value as a date if it is a date value.
    #[must_use]
    pub const fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Self::Date(d) => Some(*d),
            _ => None,
        }
    }

    /// Returns the value as a datetime if it is a datetime value.
    #[must_use]
    pub const fn as_datetime(&self) -> Option<&DateTime> {
        match self {
            Self::DateTime(dt) => Some(dt),
            _ => None,
        }
    }

    /// Returns the calendar day of a DATE or DATE-TIME value.
    #[must_use]
    pub const fn calendar_day(&self) -> Option<NaiveDate> {
        match self {
            Self::Date(d) => Some(*d),
            Self::DateTime(dt) => Some(dt.date),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn utc_datetime_display() {
        let dt = DateTime::utc(
            NaiveDate::from_ymd_opt(2025, 1, 10).unwrap(),
            NaiveTime::from_hms_opt(14, 30, 0).unwrap(),
        );
        assert_eq!(dt.to_string(), "20250110T143000Z");
    }

    #[test]
    fn calendar_day_of_both_forms() {
        let day = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        assert_eq!(Value::Date(day).calendar_day(), Some(day));

        let dt = DateTime::new(
            day,
            NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            DateTimeForm::Zoned {
                tzid: "Asia/Bangkok".to_string(),
            },
        );
        assert_eq!(Value::DateTime(dt).calendar_day(), Some(day));
        assert_eq!(Value::Text("x".to_string()).calendar_day(), None);
    }
}
