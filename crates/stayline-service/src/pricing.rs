//! Stay pricing.
//!
//! A quote picks its price source from the length of the stay:
//!
//! - 365 nights or more: the yearly price, else twelve times the cheapest
//!   monthly price, else the average of the seasonal nightly rates the stay
//!   covers, each spread over 365 days.
//! - 28 nights or more: the monthly schedule, falling back to the yearly
//!   price and then to the seasonal table.
//! - Shorter stays: the seasonal table, falling back to the monthly schedule.
//!
//! A night inside a zero-priced season turns the whole quote into a price on
//! request. Money is accumulated unrounded and rounded once when the quote is
//! built.

use std::sync::Arc;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use stayline_core::types::StayRange;

use crate::error::ServiceResult;
use crate::store::EngineStore;
use crate::tariff::{DAYS_PER_MONTH, DAYS_PER_YEAR, TariffTables, scheduled_rate};

/// Stays of at least this many nights are priced from the monthly schedule.
pub const MONTHLY_MIN_NIGHTS: i64 = 28;

/// Stays of at least this many nights are priced from the yearly price.
pub const YEARLY_MIN_NIGHTS: i64 = 365;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PricingMethod {
    Seasonal,
    Monthly,
    Yearly,
    YearlyFromMonthly,
    YearlyFromSeasonal,
    PriceOnRequest,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BreakdownKind {
    Season,
    Month,
    Year,
    PriceOnRequest,
}

/// One run of consecutive nights charged at the same rate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceBreakdown {
    pub kind: BreakdownKind,
    pub label: String,
    /// First night of the run.
    pub from: NaiveDate,
    /// Day after the last night of the run.
    pub to: NaiveDate,
    pub nights: i64,
    pub nightly_rate: i64,
    pub subtotal: i64,
}

/// Price of a stay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalculatedPrice {
    pub total_price: i64,
    pub currency: String,
    pub nights: i64,
    pub daily_average: i64,
    /// Daily average over a 30-day month.
    pub monthly_equivalent: i64,
    pub pricing_method: PricingMethod,
    pub breakdown: Vec<PriceBreakdown>,
}

impl CalculatedPrice {
    #[must_use]
    pub fn is_price_on_request(&self) -> bool {
        self.pricing_method == PricingMethod::PriceOnRequest
    }
}

/// Unrounded run of nights.
#[derive(Debug, Clone)]
struct Segment {
    kind: BreakdownKind,
    label: String,
    from: NaiveDate,
    to: NaiveDate,
    nights: i64,
    rate: f64,
}

impl Segment {
    fn subtotal(&self) -> f64 {
        self.rate * as_f64(self.nights)
    }
}

enum Walk {
    Priced(Vec<Segment>),
    OnRequest { label: String },
}

/// ## Summary
/// Prices a stay against a property's tariff tables.
///
/// Returns `None` for an empty or inverted stay, or when no price source
/// covers it.
#[must_use]
pub fn quote(tables: &TariffTables, stay: StayRange, currency: &str) -> Option<CalculatedPrice> {
    let nights = stay.nights();
    if nights <= 0 {
        return None;
    }

    let (method, walk) = if nights >= YEARLY_MIN_NIGHTS {
        yearly(tables, stay).or_else(|| seasonal(tables, stay).map(|w| (PricingMethod::Seasonal, w)))?
    } else if nights >= MONTHLY_MIN_NIGHTS {
        monthly(tables, stay)
            .map(|w| (PricingMethod::Monthly, w))
            .or_else(|| explicit_yearly(tables, stay))
            .or_else(|| seasonal(tables, stay).map(|w| (PricingMethod::Seasonal, w)))?
    } else {
        seasonal(tables, stay)
            .map(|w| (PricingMethod::Seasonal, w))
            .or_else(|| monthly(tables, stay).map(|w| (PricingMethod::Monthly, w)))?
    };

    Some(match walk {
        Walk::Priced(segments) => finish(&segments, nights, method, currency),
        Walk::OnRequest { label } => on_request(stay, label, currency),
    })
}

fn seasonal(tables: &TariffTables, stay: StayRange) -> Option<Walk> {
    let mut segments: Vec<Segment> = Vec::new();

    for night in stay.nights_iter() {
        let rate = tables.seasonal_rate_for(night)?;
        if rate.is_price_on_request() {
            return Some(Walk::OnRequest {
                label: rate.label.clone(),
            });
        }
        push_night(
            &mut segments,
            BreakdownKind::Season,
            &rate.label,
            night,
            rate.price_per_night,
        );
    }

    Some(Walk::Priced(segments))
}

fn monthly(tables: &TariffTables, stay: StayRange) -> Option<Walk> {
    let schedule = tables.monthly_schedule();
    let mut segments: Vec<Segment> = Vec::new();

    for night in stay.nights_iter() {
        let rate = scheduled_rate(&schedule, night)?;
        let label = format!("{:04}-{:02}", night.year(), night.month());
        push_night(
            &mut segments,
            BreakdownKind::Month,
            &label,
            night,
            rate.daily_rate(),
        );
    }

    Some(Walk::Priced(segments))
}

fn yearly(tables: &TariffTables, stay: StayRange) -> Option<(PricingMethod, Walk)> {
    explicit_yearly(tables, stay)
        .or_else(|| {
            let year_price = tables.cheapest_monthly_price()? * 12.0;
            Some((
                PricingMethod::YearlyFromMonthly,
                year_walk(stay, "Yearly rate (from monthly)", year_price),
            ))
        })
        .or_else(|| {
            let year_price = seasonal_average(tables, stay)? * DAYS_PER_YEAR;
            Some((
                PricingMethod::YearlyFromSeasonal,
                year_walk(stay, "Yearly rate (from seasonal)", year_price),
            ))
        })
}

fn explicit_yearly(tables: &TariffTables, stay: StayRange) -> Option<(PricingMethod, Walk)> {
    let year_price = tables.yearly_price()?;
    Some((PricingMethod::Yearly, year_walk(stay, "Yearly rate", year_price)))
}

fn year_walk(stay: StayRange, label: &str, year_price: f64) -> Walk {
    Walk::Priced(vec![Segment {
        kind: BreakdownKind::Year,
        label: label.to_string(),
        from: stay.check_in,
        to: stay.check_out,
        nights: stay.nights(),
        rate: year_price / DAYS_PER_YEAR,
    }])
}

/// Night-weighted average of the positive seasonal rates the stay covers.
fn seasonal_average(tables: &TariffTables, stay: StayRange) -> Option<f64> {
    let (sum, count) = stay
        .nights_iter()
        .filter_map(|night| tables.seasonal_rate_for(night))
        .filter(|rate| !rate.is_price_on_request())
        .fold((0.0, 0_i64), |(sum, count), rate| {
            (sum + rate.price_per_night, count + 1)
        });

    (count > 0).then(|| sum / as_f64(count))
}

fn push_night(segments: &mut Vec<Segment>, kind: BreakdownKind, label: &str, night: NaiveDate, rate: f64) {
    let next = night.succ_opt().unwrap_or(night);

    if let Some(last) = segments.last_mut()
        && last.kind == kind
        && last.label == label
        && last.to == night
        && last.rate.total_cmp(&rate).is_eq()
    {
        last.to = next;
        last.nights += 1;
        return;
    }

    segments.push(Segment {
        kind,
        label: label.to_string(),
        from: night,
        to: next,
        nights: 1,
        rate,
    });
}

fn finish(segments: &[Segment], nights: i64, method: PricingMethod, currency: &str) -> CalculatedPrice {
    let total: f64 = segments.iter().map(Segment::subtotal).sum();
    let daily_average = total / as_f64(nights);

    CalculatedPrice {
        total_price: round_money(total),
        currency: currency.to_string(),
        nights,
        daily_average: round_money(daily_average),
        monthly_equivalent: round_money(daily_average * DAYS_PER_MONTH),
        pricing_method: method,
        breakdown: segments
            .iter()
            .map(|segment| PriceBreakdown {
                kind: segment.kind,
                label: segment.label.clone(),
                from: segment.from,
                to: segment.to,
                nights: segment.nights,
                nightly_rate: round_money(segment.rate),
                subtotal: round_money(segment.subtotal()),
            })
            .collect(),
    }
}

fn on_request(stay: StayRange, label: String, currency: &str) -> CalculatedPrice {
    CalculatedPrice {
        total_price: 0,
        currency: currency.to_string(),
        nights: stay.nights(),
        daily_average: 0,
        monthly_equivalent: 0,
        pricing_method: PricingMethod::PriceOnRequest,
        breakdown: vec![PriceBreakdown {
            kind: BreakdownKind::PriceOnRequest,
            label,
            from: stay.check_in,
            to: stay.check_out,
            nights: stay.nights(),
            nightly_rate: 0,
            subtotal: 0,
        }],
    }
}

#[expect(
    clippy::cast_possible_truncation,
    reason = "Tariff amounts are far below i64::MAX"
)]
fn round_money(value: f64) -> i64 {
    value.round() as i64
}

#[expect(
    clippy::cast_precision_loss,
    reason = "Night counts are far below 2^52"
)]
fn as_f64(nights: i64) -> f64 {
    nights as f64
}

/// Prices stays of stored properties.
#[derive(Clone)]
pub struct PricingResolver {
    store: Arc<dyn EngineStore>,
    currency: String,
}

impl PricingResolver {
    #[must_use]
    pub fn new(store: Arc<dyn EngineStore>, currency: impl Into<String>) -> Self {
        Self {
            store,
            currency: currency.into(),
        }
    }

    #[must_use]
    pub fn currency(&self) -> &str {
        &self.currency
    }

    /// ## Summary
    /// Loads the property's tariffs and prices the stay.
    ///
    /// An unknown property is logged and yields `None`, as does a stay no
    /// price source covers.
    ///
    /// ## Errors
    /// Returns an error if the tariffs cannot be loaded.
    #[tracing::instrument(skip(self), fields(%property_id, %check_in, %check_out))]
    pub async fn calculate_price(
        &self,
        property_id: uuid::Uuid,
        check_in: NaiveDate,
        check_out: NaiveDate,
    ) -> ServiceResult<Option<CalculatedPrice>> {
        let Some(tables) = self.tables(property_id).await? else {
            tracing::warn!("Property not found, price not calculated");
            return Ok(None);
        };

        let price = quote(&tables, StayRange::new(check_in, check_out), &self.currency);
        tracing::debug!(
            method = ?price.as_ref().map(|p| p.pricing_method),
            total = ?price.as_ref().map(|p| p.total_price),
            "Price calculated"
        );
        Ok(price)
    }

    /// ## Summary
    /// Loads the tariff tables of a property, `None` if it does not exist.
    ///
    /// ## Errors
    /// Returns an error if the store fails.
    pub async fn tables(&self, property_id: uuid::Uuid) -> ServiceResult<Option<TariffTables>> {
        let Some(property) = self.store.property(property_id).await? else {
            return Ok(None);
        };
        Ok(Some(self.store.tariffs(&property).await?))
    }
}

#[cfg(test)]
#[path = "pricing_tests.rs"]
mod tests;
