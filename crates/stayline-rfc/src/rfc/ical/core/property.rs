//! Content lines and typed properties.

use chrono::NaiveDate;

use super::{DateTime, DateTimeForm, Parameter, Value};

fn find_param<'a>(params: &'a [Parameter], name: &str) -> Option<&'a str> {
    params
        .iter()
        .find(|p| p.name.eq_ignore_ascii_case(name))?
        .value()
}

/// One unfolded line of a document: upper-cased name, parameters and the
/// still-escaped value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentLine {
    pub name: String,
    pub params: Vec<Parameter>,
    pub raw_value: String,
}

impl ContentLine {
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into().to_ascii_uppercase(),
            params: Vec::new(),
            raw_value: value.into(),
        }
    }

    #[must_use]
    pub fn get_param_value(&self, name: &str) -> Option<&str> {
        find_param(&self.params, name)
    }

    /// The `VALUE` parameter, which overrides the default value type.
    #[must_use]
    pub fn value_type(&self) -> Option<&str> {
        self.get_param_value("VALUE")
    }

    #[must_use]
    pub fn tzid(&self) -> Option<&str> {
        self.get_param_value("TZID")
    }
}

/// A property with its value resolved. `raw_value` keeps the text as read so
/// values the engine does not interpret are written back unchanged.
#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    pub name: String,
    pub params: Vec<Parameter>,
    pub value: Value,
    pub raw_value: String,
}

impl Property {
    fn build(name: impl Into<String>, params: Vec<Parameter>, value: Value, raw: String) -> Self {
        Self {
            name: name.into().to_ascii_uppercase(),
            params,
            value,
            raw_value: raw,
        }
    }

    #[must_use]
    pub fn text(name: impl Into<String>, value: impl Into<String>) -> Self {
        let text = value.into();
        Self::build(name, Vec::new(), Value::Text(text.clone()), text)
    }

    /// ## Summary
    /// A DATE-TIME property. Zoned values carry their `TZID` parameter.
    #[must_use]
    pub fn datetime(name: impl Into<String>, dt: DateTime) -> Self {
        let params = match &dt.form {
            DateTimeForm::Zoned { tzid } => vec![Parameter::tzid(tzid.clone())],
            DateTimeForm::Floating | DateTimeForm::Utc => Vec::new(),
        };
        let raw = dt.to_string();
        Self::build(name, params, Value::DateTime(dt), raw)
    }

    /// ## Summary
    /// An all-day property written as `NAME;VALUE=DATE:YYYYMMDD`.
    #[must_use]
    pub fn date(name: impl Into<String>, day: NaiveDate) -> Self {
        let raw = day.format("%Y%m%d").to_string();
        Self::build(
            name,
            vec![Parameter::value_type("DATE")],
            Value::Date(day),
            raw,
        )
    }

    /// Keeps a line whose value could not be typed.
    #[must_use]
    pub fn from_content_line(cl: ContentLine) -> Self {
        let value = Value::Unknown(cl.raw_value.clone());
        Self::build(cl.name, cl.params, value, cl.raw_value)
    }

    #[must_use]
    pub fn get_param_value(&self, name: &str) -> Option<&str> {
        find_param(&self.params, name)
    }

    pub fn add_param(&mut self, param: Parameter) {
        self.params.push(param);
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        self.value.as_text()
    }

    #[must_use]
    pub fn as_integer(&self) -> Option<i32> {
        self.value.as_integer()
    }

    /// The day a DATE or DATE-TIME value falls on.
    #[must_use]
    pub fn as_calendar_day(&self) -> Option<NaiveDate> {
        self.value.calendar_day()
    }
}

/// Property names the engine reads or writes.
pub mod names {
    pub const CALSCALE: &str = "CALSCALE";
    pub const METHOD: &str = "METHOD";
    pub const PRODID: &str = "PRODID";
    pub const VERSION: &str = "VERSION";
    pub const CALNAME: &str = "X-WR-CALNAME";

    pub const DESCRIPTION: &str = "DESCRIPTION";
    pub const STATUS: &str = "STATUS";
    pub const SUMMARY: &str = "SUMMARY";

    pub const DTEND: &str = "DTEND";
    pub const DTSTART: &str = "DTSTART";
    pub const DTSTAMP: &str = "DTSTAMP";
    pub const TRANSP: &str = "TRANSP";

    pub const UID: &str = "UID";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_line_reads_params_ignoring_case() {
        let mut cl = ContentLine::new("dtstart", "20260123T120000");
        cl.params.push(Parameter::tzid("Asia/Bangkok"));

        assert_eq!(cl.name, "DTSTART");
        assert_eq!(cl.tzid(), Some("Asia/Bangkok"));
        assert_eq!(cl.get_param_value("tzid"), Some("Asia/Bangkok"));
        assert_eq!(cl.value_type(), None);
    }

    #[test]
    fn date_property_carries_value_param() {
        let prop = Property::date("dtstart", NaiveDate::from_ymd_opt(2025, 1, 10).unwrap());
        assert_eq!(prop.name, "DTSTART");
        assert_eq!(prop.get_param_value("VALUE"), Some("DATE"));
        assert_eq!(prop.raw_value, "20250110");
        assert_eq!(prop.as_calendar_day(), NaiveDate::from_ymd_opt(2025, 1, 10));
    }
}
