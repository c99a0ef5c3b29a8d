use diesel::{pg::Pg, prelude::*};

use crate::db::schema;

/// Seasonal nightly rate over a recurring month-day range.
#[derive(Debug, Clone, PartialEq, Queryable, Selectable, Identifiable)]
#[diesel(table_name = schema::seasonal_rate)]
#[diesel(check_for_backend(Pg))]
pub struct SeasonalRate {
    pub id: uuid::Uuid,
    pub property_id: uuid::Uuid,
    pub season_label: String,
    pub start_month: i32,
    pub start_day: i32,
    pub end_month: i32,
    pub end_day: i32,
    pub price_per_night: f64,
    pub min_nights: Option<i32>,
    pub sort_order: i32,
}

/// Monthly rate for one calendar month.
#[derive(Debug, Clone, PartialEq, Queryable, Selectable, Identifiable)]
#[diesel(table_name = schema::monthly_rate)]
#[diesel(check_for_backend(Pg))]
pub struct MonthlyRate {
    pub id: uuid::Uuid,
    pub property_id: uuid::Uuid,
    pub month_number: i32,
    pub price_per_month: f64,
    pub min_days: Option<i32>,
}
