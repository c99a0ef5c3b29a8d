//! Tariff tables of a property and the gap-filling rules applied before
//! pricing.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use stayline_core::error::{CoreError, CoreResult};
use stayline_core::types::{MonthDay, MonthDayRange};
use stayline_db::model::tariff as rows;

/// Days a monthly price is spread over.
pub const DAYS_PER_MONTH: f64 = 30.0;

/// Days a yearly price is spread over.
pub const DAYS_PER_YEAR: f64 = 365.0;

/// Nightly rate over an annually recurring month-day range.
///
/// A price of zero means the season is quoted on request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonalRate {
    pub label: String,
    pub range: MonthDayRange,
    pub price_per_night: f64,
    pub min_nights: Option<u32>,
}

impl SeasonalRate {
    #[must_use]
    pub fn new(label: impl Into<String>, range: MonthDayRange, price_per_night: f64) -> Self {
        Self {
            label: label.into(),
            range,
            price_per_night,
            min_nights: None,
        }
    }

    #[must_use]
    pub fn is_price_on_request(&self) -> bool {
        self.price_per_night <= 0.0
    }
}

impl TryFrom<&rows::SeasonalRate> for SeasonalRate {
    type Error = CoreError;

    fn try_from(row: &rows::SeasonalRate) -> CoreResult<Self> {
        let start = MonthDay::new(to_u32(row.start_month)?, to_u32(row.start_day)?)?;
        let end = MonthDay::new(to_u32(row.end_month)?, to_u32(row.end_day)?)?;
        Ok(Self {
            label: row.season_label.clone(),
            range: MonthDayRange::new(start, end),
            price_per_night: row.price_per_night,
            min_nights: row.min_nights.and_then(|n| u32::try_from(n).ok()),
        })
    }
}

/// Price of a whole calendar month, spread over [`DAYS_PER_MONTH`] days.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MonthlyRate {
    /// Calendar month, `1..=12`.
    pub month: u32,
    pub price_per_month: f64,
    pub min_days: Option<u32>,
}

impl MonthlyRate {
    #[must_use]
    pub const fn new(month: u32, price_per_month: f64) -> Self {
        Self {
            month,
            price_per_month,
            min_days: None,
        }
    }

    #[must_use]
    pub fn daily_rate(&self) -> f64 {
        self.price_per_month / DAYS_PER_MONTH
    }
}

impl TryFrom<&rows::MonthlyRate> for MonthlyRate {
    type Error = CoreError;

    fn try_from(row: &rows::MonthlyRate) -> CoreResult<Self> {
        let month = to_u32(row.month_number)?;
        if !(1..=12).contains(&month) {
            return Err(CoreError::InvalidInput(format!(
                "month_number {month} is outside 1..=12"
            )));
        }
        Ok(Self {
            month,
            price_per_month: row.price_per_month,
            min_days: row.min_days.and_then(|n| u32::try_from(n).ok()),
        })
    }
}

fn to_u32(value: i32) -> CoreResult<u32> {
    u32::try_from(value).map_err(|e| CoreError::InvalidInput(format!("{value}: {e}")))
}

/// Monthly rates resolved for each calendar month, January first.
pub type MonthlySchedule = [Option<MonthlyRate>; 12];

/// All price sources of one property.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TariffTables {
    pub year_price: Option<f64>,
    /// Seasonal rates in table order; the first match for a night wins.
    pub seasonal: Vec<SeasonalRate>,
    pub monthly: Vec<MonthlyRate>,
}

impl TariffTables {
    /// ## Summary
    /// Builds the tables from stored rows, skipping rows whose month or day
    /// cannot exist.
    #[must_use]
    pub fn from_rows(
        year_price: Option<f64>,
        seasonal: &[rows::SeasonalRate],
        monthly: &[rows::MonthlyRate],
    ) -> Self {
        let seasonal = seasonal
            .iter()
            .filter_map(|row| match SeasonalRate::try_from(row) {
                Ok(rate) => Some(rate),
                Err(e) => {
                    tracing::warn!(rate_id = %row.id, error = %e, "Skipping invalid seasonal rate");
                    None
                }
            })
            .collect();
        let monthly = monthly
            .iter()
            .filter_map(|row| match MonthlyRate::try_from(row) {
                Ok(rate) => Some(rate),
                Err(e) => {
                    tracing::warn!(rate_id = %row.id, error = %e, "Skipping invalid monthly rate");
                    None
                }
            })
            .collect();

        Self {
            year_price,
            seasonal: fill_seasonal_gaps(seasonal),
            monthly,
        }
    }

    /// Seasonal rate applying to the night starting on `date`.
    #[must_use]
    pub fn seasonal_rate_for(&self, date: NaiveDate) -> Option<&SeasonalRate> {
        self.seasonal.iter().find(|rate| rate.range.contains(date))
    }

    /// Explicit yearly price, if it is usable.
    #[must_use]
    pub fn yearly_price(&self) -> Option<f64> {
        self.year_price.filter(|price| *price > 0.0)
    }

    /// Cheapest positive monthly price.
    #[must_use]
    pub fn cheapest_monthly_price(&self) -> Option<f64> {
        self.monthly
            .iter()
            .map(|rate| rate.price_per_month)
            .filter(|price| *price > 0.0)
            .min_by(f64::total_cmp)
    }

    #[must_use]
    pub fn monthly_schedule(&self) -> MonthlySchedule {
        fill_monthly_gaps(&self.monthly)
    }
}

/// ## Summary
/// Resolves a rate for every calendar month.
///
/// A month without its own positive rate takes the nearest earlier month
/// that has one. Months before the first priced month stay unresolved; the
/// walk does not wrap from December back to January. When a month appears
/// twice the later entry wins.
#[must_use]
pub fn fill_monthly_gaps(rates: &[MonthlyRate]) -> MonthlySchedule {
    let mut own: MonthlySchedule = [None; 12];
    for rate in rates.iter().filter(|rate| rate.price_per_month > 0.0) {
        if let Some(slot) = month_index(rate.month).and_then(|i| own.get_mut(i)) {
            *slot = Some(*rate);
        }
    }

    let mut schedule: MonthlySchedule = [None; 12];
    let mut carried = None;
    for (slot, rate) in schedule.iter_mut().zip(own) {
        if rate.is_some() {
            carried = rate;
        }
        *slot = carried;
    }
    schedule
}

/// ## Summary
/// Cleans the seasonal table before lookups.
///
/// Seasons already cover their own ranges, so nothing is synthesised; rates
/// with a negative or non-finite price are dropped and table order is kept.
#[must_use]
pub fn fill_seasonal_gaps(rates: Vec<SeasonalRate>) -> Vec<SeasonalRate> {
    rates
        .into_iter()
        .filter(|rate| {
            let usable = rate.price_per_night.is_finite() && rate.price_per_night >= 0.0;
            if !usable {
                tracing::warn!(label = %rate.label, "Dropping seasonal rate with unusable price");
            }
            usable
        })
        .collect()
}

/// Schedule slot of a calendar month.
#[must_use]
pub fn month_index(month: u32) -> Option<usize> {
    usize::try_from(month)
        .ok()
        .filter(|m| (1..=12).contains(m))
        .map(|m| m - 1)
}

/// Rate resolved for the month `date` falls in.
#[must_use]
pub fn scheduled_rate(schedule: &MonthlySchedule, date: NaiveDate) -> Option<MonthlyRate> {
    month_index(date.month())
        .and_then(|i| schedule.get(i))
        .copied()
        .flatten()
}
