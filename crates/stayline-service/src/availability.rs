//! Availability checks and flexible-date searches.
//!
//! A stay `[check_in, check_out]` is free when no blocked date falls inside
//! it, both ends included. Window and period searches apply the same rule
//! to each candidate, so every result also passes the point check.

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::{Datelike, Days, NaiveDate, Utc};
use serde::Serialize;
use uuid::Uuid;

use stayline_core::types::{StayRange, days_through};

use crate::aggregator::CalendarAggregator;
use crate::error::{ServiceError, ServiceResult};
use crate::pricing::{CalculatedPrice, PricingResolver, quote};
use crate::tariff::TariffTables;

/// Probe positions tried by [`AvailabilityService::find_windows`].
pub const MAX_WINDOW_PROBES: usize = 100;

/// Start dates tried by [`AvailabilityService::find_available_periods`].
pub const MAX_PERIOD_CANDIDATES: usize = 100;

/// Periods returned by [`AvailabilityService::find_available_periods`].
pub const MAX_PERIOD_RESULTS: usize = 20;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AvailabilityResult {
    pub available: bool,
    /// `false` when the property has no blocked dates at all; callers should
    /// confirm such stays manually.
    pub has_calendar: bool,
    pub blocked_dates: Vec<NaiveDate>,
}

/// A free, priced stay found by a search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Window {
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub price: CalculatedPrice,
}

/// ## Summary
/// Cheapest window with a real price.
#[must_use]
pub fn cheapest_window(windows: &[Window]) -> Option<&Window> {
    windows
        .iter()
        .filter(|w| !w.price.is_price_on_request())
        .min_by_key(|w| (w.price.total_price, w.check_in))
}

#[derive(Clone)]
pub struct AvailabilityService {
    aggregator: CalendarAggregator,
    pricing: PricingResolver,
}

impl AvailabilityService {
    #[must_use]
    pub const fn new(aggregator: CalendarAggregator, pricing: PricingResolver) -> Self {
        Self {
            aggregator,
            pricing,
        }
    }

    /// ## Summary
    /// Checks a fixed stay, widened by `tolerance_days` on both sides.
    ///
    /// A property without any blocked dates is reported available with
    /// `has_calendar = false`.
    ///
    /// ## Errors
    /// Returns `ValidationError` for an empty or inverted stay and
    /// `NotFound` for an unknown property.
    #[tracing::instrument(skip(self), fields(%property_id, %check_in, %check_out, tolerance_days))]
    pub async fn check_availability(
        &self,
        property_id: Uuid,
        check_in: NaiveDate,
        check_out: NaiveDate,
        tolerance_days: u32,
    ) -> ServiceResult<AvailabilityResult> {
        if check_out <= check_in {
            return Err(ServiceError::ValidationError(
                "check_out must be after check_in".to_string(),
            ));
        }
        self.require_tables(property_id).await?;

        let range = self
            .aggregator
            .blocked_around(property_id, check_in, check_out, tolerance_days)
            .await?;

        if !range.has_calendar {
            tracing::debug!("No calendar data, reporting available for manual confirmation");
        }

        Ok(AvailabilityResult {
            available: range.blocked.is_empty(),
            has_calendar: range.has_calendar,
            blocked_dates: range.blocked,
        })
    }

    /// ## Summary
    /// Slides a `duration`-night probe one day at a time from
    /// `window_start` and returns every free, priceable position.
    ///
    /// At most [`MAX_WINDOW_PROBES`] positions are tried; the search stops
    /// early once a probe's check-out would pass `window_end`.
    ///
    /// ## Errors
    /// Returns `ValidationError` for a zero duration and `NotFound` for an
    /// unknown property.
    #[tracing::instrument(skip(self), fields(%property_id, duration, %window_start, %window_end))]
    pub async fn find_windows(
        &self,
        property_id: Uuid,
        duration: u32,
        window_start: NaiveDate,
        window_end: NaiveDate,
    ) -> ServiceResult<Vec<Window>> {
        if duration == 0 {
            return Err(ServiceError::ValidationError(
                "duration must be at least one night".to_string(),
            ));
        }
        let tables = self.require_tables(property_id).await?;
        if window_end < window_start {
            return Ok(Vec::new());
        }

        let blocked = self
            .aggregator
            .blocked_days(property_id, window_start, window_end)
            .await?;

        let mut windows = Vec::new();
        for check_in in window_start.iter_days().take(MAX_WINDOW_PROBES) {
            let Some(check_out) = check_in.checked_add_days(Days::new(u64::from(duration))) else {
                break;
            };
            if check_out > window_end {
                break;
            }
            if let Some(window) = self.probe(&tables, &blocked, check_in, check_out) {
                windows.push(window);
            }
        }

        tracing::debug!(found = windows.len(), "Window search finished");
        Ok(windows)
    }

    /// ## Summary
    /// Finds free `nights`-night stays, cheapest first.
    ///
    /// Candidate check-ins are the days of `month` (in `year`, default the
    /// current year), else the days of `year`, else the days from today;
    /// past days are skipped. At most [`MAX_PERIOD_CANDIDATES`] candidates
    /// are checked and [`MAX_PERIOD_RESULTS`] returned, price-on-request
    /// stays last.
    ///
    /// ## Errors
    /// Returns `ValidationError` for zero nights or an invalid month, and
    /// `NotFound` for an unknown property.
    pub async fn find_available_periods(
        &self,
        property_id: Uuid,
        nights: u32,
        month: Option<u32>,
        year: Option<i32>,
    ) -> ServiceResult<Vec<Window>> {
        self.find_available_periods_from(Utc::now().date_naive(), property_id, nights, month, year)
            .await
    }

    /// ## Summary
    /// [`Self::find_available_periods`] relative to a given `today`.
    ///
    /// ## Errors
    /// See [`Self::find_available_periods`].
    #[tracing::instrument(skip(self), fields(%today, %property_id, nights, ?month, ?year))]
    pub async fn find_available_periods_from(
        &self,
        today: NaiveDate,
        property_id: Uuid,
        nights: u32,
        month: Option<u32>,
        year: Option<i32>,
    ) -> ServiceResult<Vec<Window>> {
        if nights == 0 {
            return Err(ServiceError::ValidationError(
                "nights must be at least one".to_string(),
            ));
        }
        let tables = self.require_tables(property_id).await?;

        let candidates = candidate_check_ins(today, month, year)?;
        let (Some(first), Some(last)) = (candidates.first(), candidates.last()) else {
            return Ok(Vec::new());
        };
        let stay_length = Days::new(u64::from(nights));
        let horizon = last.checked_add_days(stay_length).unwrap_or(NaiveDate::MAX);
        let blocked = self
            .aggregator
            .blocked_days(property_id, *first, horizon)
            .await?;

        let mut periods: Vec<Window> = candidates
            .iter()
            .filter_map(|check_in| {
                let check_out = check_in.checked_add_days(stay_length)?;
                self.probe(&tables, &blocked, *check_in, check_out)
            })
            .collect();

        periods.sort_by_key(|p| (p.price.is_price_on_request(), p.price.total_price, p.check_in));
        periods.truncate(MAX_PERIOD_RESULTS);

        tracing::debug!(
            candidates = candidates.len(),
            found = periods.len(),
            "Period search finished"
        );
        Ok(periods)
    }

    fn probe(
        &self,
        tables: &TariffTables,
        blocked: &BTreeSet<NaiveDate>,
        check_in: NaiveDate,
        check_out: NaiveDate,
    ) -> Option<Window> {
        if blocked.range(check_in..=check_out).next().is_some() {
            return None;
        }
        let price = quote(
            tables,
            StayRange::new(check_in, check_out),
            self.pricing.currency(),
        )?;
        Some(Window {
            check_in,
            check_out,
            price,
        })
    }

    async fn require_tables(&self, property_id: Uuid) -> ServiceResult<TariffTables> {
        self.pricing
            .tables(property_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("property {property_id}")))
    }
}

/// ## Summary
/// Candidate check-in days for a period search, never before `today` and at
/// most [`MAX_PERIOD_CANDIDATES`] of them.
///
/// ## Errors
/// Returns `ValidationError` for a month outside `1..=12` or a year chrono
/// cannot represent.
pub fn candidate_check_ins(
    today: NaiveDate,
    month: Option<u32>,
    year: Option<i32>,
) -> ServiceResult<Vec<NaiveDate>> {
    let invalid = || ServiceError::ValidationError(format!("invalid month {month:?} / year {year:?}"));

    let (first, last) = match (month, year) {
        (Some(month), year) => {
            let year = year.unwrap_or_else(|| today.year());
            let first = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(invalid)?;
            let last = first
                .checked_add_months(chrono::Months::new(1))
                .and_then(|next| next.pred_opt())
                .ok_or_else(invalid)?;
            (first, last)
        }
        (None, Some(year)) => (
            NaiveDate::from_ymd_opt(year, 1, 1).ok_or_else(invalid)?,
            NaiveDate::from_ymd_opt(year, 12, 31).ok_or_else(invalid)?,
        ),
        (None, None) => (today, NaiveDate::MAX),
    };

    Ok(days_through(first.max(today), last)
        .take(MAX_PERIOD_CANDIDATES)
        .collect())
}

#[cfg(test)]
#[path = "availability_tests.rs"]
mod tests;
