//! Query functions for properties.

use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::db::connection::DbConnection;
use crate::db::schema::{external_calendar, property};
use crate::model::property::Property;

/// ## Summary
/// Returns a query to select all properties.
#[must_use]
pub fn all() -> property::BoxedQuery<'static, diesel::pg::Pg> {
    property::table.into_boxed()
}

/// ## Summary
/// Returns a query to find a property by ID.
#[must_use]
pub fn by_id(id: uuid::Uuid) -> property::BoxedQuery<'static, diesel::pg::Pg> {
    all().filter(property::id.eq(id))
}

/// ## Summary
/// Retrieves a property by ID.
///
/// ## Errors
/// Returns a database error if the query fails.
pub async fn get_property(
    conn: &mut DbConnection<'_>,
    id: uuid::Uuid,
) -> QueryResult<Option<Property>> {
    by_id(id)
        .select(Property::as_select())
        .first::<Property>(conn)
        .await
        .optional()
}

/// ## Summary
/// Lists the IDs of properties that have at least one enabled external
/// calendar, in a stable order.
///
/// ## Errors
/// Returns a database error if the query fails.
pub async fn ids_with_enabled_calendars(
    conn: &mut DbConnection<'_>,
) -> QueryResult<Vec<uuid::Uuid>> {
    external_calendar::table
        .filter(external_calendar::enabled.eq(true))
        .select(external_calendar::property_id)
        .distinct()
        .order(external_calendar::property_id.asc())
        .load::<uuid::Uuid>(conn)
        .await
}
