//! Query functions for `blocked_date`.

use chrono::NaiveDate;
use diesel::prelude::*;
use diesel::upsert::excluded;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::db::connection::DbConnection;
use crate::db::schema::blocked_date;
use crate::model::blocked_date::{BlockedDate, NewBlockedDate};

/// Rows per INSERT statement, well below the Postgres bind parameter limit.
const UPSERT_CHUNK: usize = 1000;

/// ## Summary
/// Returns a query for the blocked dates of a property in date order.
#[must_use]
pub fn by_property(property_id: Uuid) -> blocked_date::BoxedQuery<'static, diesel::pg::Pg> {
    blocked_date::table
        .filter(blocked_date::property_id.eq(property_id))
        .order(blocked_date::date.asc())
        .into_boxed()
}

/// ## Summary
/// Whether the property has any blocked-date row at all.
///
/// ## Errors
/// Returns a database error if the query fails.
pub async fn exists_for_property(conn: &mut DbConnection<'_>, property_id: Uuid) -> QueryResult<bool> {
    diesel::select(diesel::dsl::exists(
        blocked_date::table.filter(blocked_date::property_id.eq(property_id)),
    ))
    .get_result(conn)
    .await
}

/// ## Summary
/// Lists every blocked date of a property.
///
/// ## Errors
/// Returns a database error if the query fails.
pub async fn list_for_property(
    conn: &mut DbConnection<'_>,
    property_id: Uuid,
) -> QueryResult<Vec<BlockedDate>> {
    by_property(property_id)
        .select(BlockedDate::as_select())
        .load(conn)
        .await
}

/// ## Summary
/// Lists the blocked dates of a property inside `[start, end]`.
///
/// ## Errors
/// Returns a database error if the query fails.
pub async fn list_between(
    conn: &mut DbConnection<'_>,
    property_id: Uuid,
    start: NaiveDate,
    end: NaiveDate,
) -> QueryResult<Vec<BlockedDate>> {
    by_property(property_id)
        .filter(blocked_date::date.between(start, end))
        .select(BlockedDate::as_select())
        .load(conn)
        .await
}

/// ## Summary
/// Deletes every row owned by an external calendar.
///
/// ## Errors
/// Returns a database error if the delete fails.
pub async fn delete_for_calendar(
    conn: &mut DbConnection<'_>,
    property_id: Uuid,
    calendar_id: Uuid,
) -> QueryResult<usize> {
    diesel::delete(
        blocked_date::table
            .filter(blocked_date::property_id.eq(property_id))
            .filter(blocked_date::source_calendar_id.eq(calendar_id)),
    )
    .execute(conn)
    .await
}

/// ## Summary
/// Deletes manual blocks on the given dates. Synced rows are left alone.
///
/// ## Errors
/// Returns a database error if the delete fails.
pub async fn delete_manual(
    conn: &mut DbConnection<'_>,
    property_id: Uuid,
    dates: &[NaiveDate],
) -> QueryResult<usize> {
    if dates.is_empty() {
        return Ok(0);
    }

    diesel::delete(
        blocked_date::table
            .filter(blocked_date::property_id.eq(property_id))
            .filter(blocked_date::source_calendar_id.is_null())
            .filter(blocked_date::date.eq_any(dates)),
    )
    .execute(conn)
    .await
}

/// ## Summary
/// Inserts rows, overwriting reason, source and flags of any existing row
/// on the same `(property_id, date)`.
///
/// Rows must be unique per key; Postgres rejects a statement that touches
/// the same key twice.
///
/// ## Errors
/// Returns a database error if an insert fails.
pub async fn upsert_batch(conn: &mut DbConnection<'_>, rows: &[NewBlockedDate]) -> QueryResult<usize> {
    let mut written = 0;

    for chunk in rows.chunks(UPSERT_CHUNK) {
        written += diesel::insert_into(blocked_date::table)
            .values(chunk)
            .on_conflict((blocked_date::property_id, blocked_date::date))
            .do_update()
            .set((
                blocked_date::reason.eq(excluded(blocked_date::reason)),
                blocked_date::source_calendar_id.eq(excluded(blocked_date::source_calendar_id)),
                blocked_date::event_uid.eq(excluded(blocked_date::event_uid)),
                blocked_date::is_check_in.eq(excluded(blocked_date::is_check_in)),
                blocked_date::is_check_out.eq(excluded(blocked_date::is_check_out)),
                blocked_date::updated_at.eq(diesel::dsl::now),
            ))
            .execute(conn)
            .await?;
    }

    Ok(written)
}

#[cfg(test)]
mod tests {
    use diesel::debug_query;
    use diesel::pg::Pg;

    use super::*;

    #[test]
    fn by_property_is_date_ordered() {
        let sql = debug_query::<Pg, _>(&by_property(Uuid::nil())).to_string();
        assert!(sql.contains("\"blocked_date\".\"property_id\" = $1"));
        assert!(sql.contains("ORDER BY \"blocked_date\".\"date\" ASC"));
    }

    #[test]
    fn range_filter_is_inclusive() {
        let start = NaiveDate::from_ymd_opt(2025, 3, 9).unwrap();
        let end = NaiveDate::from_ymd_opt(2025, 3, 18).unwrap();
        let query = by_property(Uuid::nil()).filter(blocked_date::date.between(start, end));
        let sql = debug_query::<Pg, _>(&query).to_string();
        assert!(sql.contains("BETWEEN"));
    }
}
