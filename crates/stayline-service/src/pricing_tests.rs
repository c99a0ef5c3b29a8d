//! Tests for stay pricing.

use std::sync::Arc;

use stayline_core::types::{MonthDay, MonthDayRange};

use super::*;
use crate::store::memory::MemoryStore;
use crate::tariff::{MonthlyRate, SeasonalRate};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn season(label: &str, start: &str, end: &str, price: f64) -> SeasonalRate {
    let start: MonthDay = start.parse().unwrap();
    let end: MonthDay = end.parse().unwrap();
    SeasonalRate::new(label, MonthDayRange::new(start, end), price)
}

fn stay(check_in: NaiveDate, check_out: NaiveDate) -> StayRange {
    StayRange::new(check_in, check_out)
}

#[test]
fn short_stay_uses_wrapping_season() {
    let tables = TariffTables {
        seasonal: vec![season("High", "12-15", "02-28", 80_000.0)],
        ..TariffTables::default()
    };

    let price = quote(&tables, stay(date(2024, 12, 20), date(2024, 12, 25)), "THB").unwrap();

    assert_eq!(price.pricing_method, PricingMethod::Seasonal);
    assert_eq!(price.nights, 5);
    assert_eq!(price.total_price, 400_000);
    assert_eq!(price.daily_average, 80_000);
    assert_eq!(price.monthly_equivalent, 2_400_000);
    assert_eq!(price.currency, "THB");
    assert_eq!(price.breakdown.len(), 1);
    assert_eq!(price.breakdown[0].label, "High");
    assert_eq!(price.breakdown[0].to, date(2024, 12, 25));
}

#[test]
fn short_stay_without_season_carries_january_into_february() {
    let tables = TariffTables {
        monthly: vec![MonthlyRate::new(1, 45_000.0)],
        ..TariffTables::default()
    };

    let price = quote(&tables, stay(date(2025, 1, 25), date(2025, 2, 5)), "THB").unwrap();

    assert_eq!(price.pricing_method, PricingMethod::Monthly);
    assert_eq!(price.nights, 11);
    assert_eq!(price.total_price, 16_500);
    assert_eq!(price.breakdown.len(), 2);
    assert_eq!(price.breakdown[0].label, "2025-01");
    assert_eq!(price.breakdown[0].nights, 7);
    assert_eq!(price.breakdown[1].label, "2025-02");
    assert_eq!(price.breakdown[1].nights, 4);
    assert_eq!(price.breakdown[1].nightly_rate, 1_500);
}

#[test]
fn partially_covered_short_stay_falls_back_to_months() {
    let tables = TariffTables {
        seasonal: vec![season("Peak", "12-24", "12-26", 9_000.0)],
        monthly: vec![MonthlyRate::new(12, 60_000.0)],
        ..TariffTables::default()
    };

    let price = quote(&tables, stay(date(2024, 12, 22), date(2024, 12, 25)), "THB").unwrap();

    assert_eq!(price.pricing_method, PricingMethod::Monthly);
    assert_eq!(price.total_price, 6_000);
}

#[test]
fn month_long_stay_carries_previous_month_rate() {
    let tables = TariffTables {
        seasonal: vec![season("All year", "01-01", "12-31", 5_000.0)],
        monthly: vec![MonthlyRate::new(1, 30_000.0), MonthlyRate::new(2, 60_000.0)],
        ..TariffTables::default()
    };

    let price = quote(&tables, stay(date(2025, 3, 1), date(2025, 3, 31)), "THB").unwrap();

    assert_eq!(price.pricing_method, PricingMethod::Monthly);
    assert_eq!(price.nights, 30);
    assert_eq!(price.total_price, 60_000);
    assert_eq!(price.monthly_equivalent, 60_000);
}

#[test]
fn month_long_stay_before_first_priced_month_uses_yearly_then_seasons() {
    let with_year = TariffTables {
        year_price: Some(365_000.0),
        seasonal: vec![season("All year", "01-01", "12-31", 5_000.0)],
        monthly: vec![MonthlyRate::new(3, 30_000.0)],
    };
    let price = quote(&with_year, stay(date(2025, 1, 1), date(2025, 1, 31)), "THB").unwrap();
    assert_eq!(price.pricing_method, PricingMethod::Yearly);
    assert_eq!(price.total_price, 30_000);

    let without_year = TariffTables {
        year_price: None,
        ..with_year
    };
    let price = quote(&without_year, stay(date(2025, 1, 1), date(2025, 1, 31)), "THB").unwrap();
    assert_eq!(price.pricing_method, PricingMethod::Seasonal);
    assert_eq!(price.total_price, 150_000);
}

#[test]
fn zero_priced_season_is_price_on_request() {
    let tables = TariffTables {
        seasonal: vec![
            season("Low", "05-01", "09-30", 3_000.0),
            season("Festival", "10-01", "10-31", 0.0),
        ],
        ..TariffTables::default()
    };

    let price = quote(&tables, stay(date(2025, 9, 28), date(2025, 10, 3)), "THB").unwrap();

    assert!(price.is_price_on_request());
    assert_eq!(price.total_price, 0);
    assert_eq!(price.daily_average, 0);
    assert_eq!(price.breakdown.len(), 1);
    assert_eq!(price.breakdown[0].kind, BreakdownKind::PriceOnRequest);
    assert_eq!(price.breakdown[0].label, "Festival");
    assert_eq!(price.breakdown[0].nights, 5);
}

#[test]
fn year_long_stay_prefers_explicit_yearly_price() {
    let tables = TariffTables {
        year_price: Some(730_000.0),
        monthly: vec![MonthlyRate::new(1, 10_000.0)],
        ..TariffTables::default()
    };

    let price = quote(&tables, stay(date(2025, 1, 1), date(2026, 1, 1)), "THB").unwrap();

    assert_eq!(price.pricing_method, PricingMethod::Yearly);
    assert_eq!(price.nights, 365);
    assert_eq!(price.total_price, 730_000);
    assert_eq!(price.daily_average, 2_000);
    assert_eq!(price.breakdown[0].kind, BreakdownKind::Year);
}

#[test]
fn year_long_stay_derives_from_cheapest_month() {
    let tables = TariffTables {
        monthly: vec![MonthlyRate::new(1, 45_000.0), MonthlyRate::new(6, 30_000.0)],
        ..TariffTables::default()
    };

    let price = quote(&tables, stay(date(2025, 1, 1), date(2026, 1, 1)), "THB").unwrap();

    assert_eq!(price.pricing_method, PricingMethod::YearlyFromMonthly);
    assert_eq!(price.total_price, 360_000);
}

#[test]
fn year_long_stay_derives_from_seasonal_average() {
    let tables = TariffTables {
        seasonal: vec![
            season("High", "11-01", "04-30", 2_000.0),
            season("Low", "05-01", "10-31", 1_000.0),
        ],
        ..TariffTables::default()
    };

    let one_year = stay(date(2025, 1, 1), date(2026, 1, 1));
    let price = quote(&tables, one_year, "THB").unwrap();

    // 181 high nights in 2025 (Jan-Apr, Nov-Dec), 184 low nights.
    let expected = (181.0 * 2_000.0 + 184.0 * 1_000.0_f64).round();
    assert_eq!(price.pricing_method, PricingMethod::YearlyFromSeasonal);
    assert_eq!(price.total_price, round_money(expected));
}

#[test]
fn rounding_happens_once_at_output() {
    let tables = TariffTables {
        seasonal: vec![season("Odd", "01-01", "12-31", 1_000.4)],
        ..TariffTables::default()
    };

    let price = quote(&tables, stay(date(2025, 1, 1), date(2025, 1, 4)), "THB").unwrap();

    assert_eq!(price.total_price, 3_001);
    assert_eq!(price.breakdown[0].nightly_rate, 1_000);
    assert_eq!(price.breakdown[0].subtotal, 3_001);
}

#[test]
fn unpriceable_or_empty_stays_have_no_quote() {
    let empty = TariffTables::default();
    assert!(quote(&empty, stay(date(2025, 1, 1), date(2025, 1, 5)), "THB").is_none());

    let tables = TariffTables {
        seasonal: vec![season("All year", "01-01", "12-31", 1_000.0)],
        ..TariffTables::default()
    };
    assert!(quote(&tables, stay(date(2025, 1, 5), date(2025, 1, 5)), "THB").is_none());
    assert!(quote(&tables, stay(date(2025, 1, 5), date(2025, 1, 1)), "THB").is_none());
}

#[test]
fn method_serializes_snake_case() {
    let json = serde_json::to_string(&PricingMethod::YearlyFromSeasonal).unwrap();
    assert_eq!(json, "\"yearly_from_seasonal\"");
}

#[test_log::test(tokio::test)]
async fn resolver_prices_stored_property() {
    let store = MemoryStore::new();
    let property = store.add_property("VL-1", "Villa One", None).await;
    store
        .add_seasonal_rate(property.id, season("High", "12-15", "02-28", 80_000.0))
        .await;
    let resolver = PricingResolver::new(Arc::new(store), "THB");

    let price = resolver
        .calculate_price(property.id, date(2024, 12, 20), date(2024, 12, 25))
        .await
        .unwrap()
        .unwrap();

    assert_eq!(price.total_price, 400_000);
}

#[test_log::test(tokio::test)]
async fn resolver_returns_none_for_unknown_property() {
    let resolver = PricingResolver::new(Arc::new(MemoryStore::new()), "THB");

    let price = resolver
        .calculate_price(uuid::Uuid::new_v4(), date(2025, 1, 1), date(2025, 1, 5))
        .await
        .unwrap();

    assert!(price.is_none());
}
