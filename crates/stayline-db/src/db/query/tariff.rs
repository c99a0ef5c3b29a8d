//! Query functions for seasonal and monthly rates.

use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::db::connection::DbConnection;
use crate::db::schema::{monthly_rate, seasonal_rate};
use crate::model::tariff::{MonthlyRate, SeasonalRate};

/// ## Summary
/// Returns a query for the seasonal rates of a property in table order.
///
/// Table order is `sort_order`, then ID, so the first matching season is
/// deterministic.
#[must_use]
pub fn seasonal_by_property(
    property_id: uuid::Uuid,
) -> seasonal_rate::BoxedQuery<'static, diesel::pg::Pg> {
    seasonal_rate::table
        .filter(seasonal_rate::property_id.eq(property_id))
        .order((seasonal_rate::sort_order.asc(), seasonal_rate::id.asc()))
        .into_boxed()
}

/// ## Summary
/// Returns a query for the monthly rates of a property ordered by month.
#[must_use]
pub fn monthly_by_property(
    property_id: uuid::Uuid,
) -> monthly_rate::BoxedQuery<'static, diesel::pg::Pg> {
    monthly_rate::table
        .filter(monthly_rate::property_id.eq(property_id))
        .order(monthly_rate::month_number.asc())
        .into_boxed()
}

/// ## Summary
/// Loads the seasonal rates of a property in table order.
///
/// ## Errors
/// Returns a database error if the query fails.
pub async fn load_seasonal(
    conn: &mut DbConnection<'_>,
    property_id: uuid::Uuid,
) -> QueryResult<Vec<SeasonalRate>> {
    seasonal_by_property(property_id)
        .select(SeasonalRate::as_select())
        .load(conn)
        .await
}

/// ## Summary
/// Loads the monthly rates of a property.
///
/// ## Errors
/// Returns a database error if the query fails.
pub async fn load_monthly(
    conn: &mut DbConnection<'_>,
    property_id: uuid::Uuid,
) -> QueryResult<Vec<MonthlyRate>> {
    monthly_by_property(property_id)
        .select(MonthlyRate::as_select())
        .load(conn)
        .await
}

#[cfg(test)]
mod tests {
    use diesel::debug_query;
    use diesel::pg::Pg;

    use super::*;

    #[test]
    fn seasonal_rates_follow_table_order() {
        let sql = debug_query::<Pg, _>(&seasonal_by_property(uuid::Uuid::nil())).to_string();
        assert!(sql.contains(
            "ORDER BY \"seasonal_rate\".\"sort_order\" ASC, \"seasonal_rate\".\"id\" ASC"
        ));
    }

    #[test]
    fn monthly_rates_are_month_ordered() {
        let sql = debug_query::<Pg, _>(&monthly_by_property(uuid::Uuid::nil())).to_string();
        assert!(sql.contains("ORDER BY \"monthly_rate\".\"month_number\" ASC"));
    }
}
