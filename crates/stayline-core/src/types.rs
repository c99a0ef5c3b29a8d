//! Calendar value types shared by the tariff, calendar and feed layers.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

/// A day of the year without a year (`MM-DD`).
///
/// Ordering is month first, then day, which matches calendar order within a
/// single year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MonthDay {
    month: u32,
    day: u32,
}

impl MonthDay {
    /// ## Summary
    /// Creates a month-day pair, accepting February 29.
    ///
    /// ## Errors
    /// Returns an error if the month is outside `1..=12` or the day does not
    /// exist in that month of a leap year.
    pub fn new(month: u32, day: u32) -> CoreResult<Self> {
        let max_day = match month {
            1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
            4 | 6 | 9 | 11 => 30,
            2 => 29,
            _ => {
                return Err(CoreError::InvalidInput(format!(
                    "month {month} is outside 1..=12"
                )));
            }
        };
        if day == 0 || day > max_day {
            return Err(CoreError::InvalidInput(format!(
                "day {day} does not exist in month {month}"
            )));
        }
        Ok(Self { month, day })
    }

    /// Month-day of a calendar date.
    #[must_use]
    pub fn of(date: NaiveDate) -> Self {
        Self {
            month: date.month(),
            day: date.day(),
        }
    }

    #[must_use]
    pub const fn month(self) -> u32 {
        self.month
    }

    #[must_use]
    pub const fn day(self) -> u32 {
        self.day
    }
}

impl fmt::Display for MonthDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}-{:02}", self.month, self.day)
    }
}

impl FromStr for MonthDay {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (month, day) = s
            .trim()
            .split_once('-')
            .ok_or_else(|| CoreError::ParseError(format!("expected MM-DD, got '{s}'")))?;
        let month = month
            .parse::<u32>()
            .map_err(|e| CoreError::ParseError(format!("invalid month in '{s}': {e}")))?;
        let day = day
            .parse::<u32>()
            .map_err(|e| CoreError::ParseError(format!("invalid day in '{s}': {e}")))?;
        Self::new(month, day)
    }
}

impl TryFrom<String> for MonthDay {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<MonthDay> for String {
    fn from(value: MonthDay) -> Self {
        value.to_string()
    }
}

/// An annually recurring, inclusive month-day range.
///
/// A range whose end precedes its start wraps across the year boundary, so
/// `12-01..02-28` covers December, January and February.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MonthDayRange {
    pub start: MonthDay,
    pub end: MonthDay,
}

impl MonthDayRange {
    #[must_use]
    pub const fn new(start: MonthDay, end: MonthDay) -> Self {
        Self { start, end }
    }

    /// Whether the range crosses December 31.
    #[must_use]
    pub fn wraps(&self) -> bool {
        self.end < self.start
    }

    /// ## Summary
    /// Whether `date` falls inside the range, ignoring its year.
    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        let value = MonthDay::of(date);
        if self.wraps() {
            value >= self.start || value <= self.end
        } else {
            self.start <= value && value <= self.end
        }
    }
}

impl fmt::Display for MonthDayRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// A requested stay: guests arrive on `check_in` and leave on `check_out`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StayRange {
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
}

impl StayRange {
    #[must_use]
    pub const fn new(check_in: NaiveDate, check_out: NaiveDate) -> Self {
        Self {
            check_in,
            check_out,
        }
    }

    /// Number of nights; zero or negative for an empty or inverted range.
    #[must_use]
    pub fn nights(&self) -> i64 {
        (self.check_out - self.check_in).num_days()
    }

    /// Nights of the stay, as the calendar day each one starts on.
    pub fn nights_iter(&self) -> impl Iterator<Item = NaiveDate> + use<> {
        days_between(self.check_in, self.check_out)
    }
}

/// ## Summary
/// Iterates the days in `[start, end)`.
pub fn days_between(start: NaiveDate, end: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    start.iter_days().take_while(move |day| *day < end)
}

/// ## Summary
/// Iterates the days in `[start, end]`.
pub fn days_through(start: NaiveDate, end: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    start.iter_days().take_while(move |day| *day <= end)
}

/// A booking read from an external calendar feed.
///
/// `end` follows the iCalendar convention and is exclusive: a guest staying
/// the nights of the 10th and 11th has `start = 10`, `end = 12`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarEvent {
    pub uid: Option<String>,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub summary: Option<String>,
    pub description: Option<String>,
}

impl CalendarEvent {
    /// ## Summary
    /// Days the event occupies. An event whose end does not follow its start
    /// still occupies its start day.
    #[must_use]
    pub fn occupied_days(&self) -> Vec<NaiveDate> {
        if self.end <= self.start {
            vec![self.start]
        } else {
            days_between(self.start, self.end).collect()
        }
    }
}
