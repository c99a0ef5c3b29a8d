//! Query functions for published calendar feeds.

use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::db::connection::DbConnection;
use crate::db::schema::calendar_feed;
use crate::model::feed::{CalendarFeed, NewCalendarFeed};

/// ## Summary
/// Inserts or replaces the feed record of a property.
///
/// ## Errors
/// Returns a database error if the upsert fails.
pub async fn upsert_feed(
    conn: &mut DbConnection<'_>,
    feed: &NewCalendarFeed<'_>,
) -> QueryResult<CalendarFeed> {
    diesel::insert_into(calendar_feed::table)
        .values(feed)
        .on_conflict(calendar_feed::property_id)
        .do_update()
        .set(feed)
        .returning(CalendarFeed::as_returning())
        .get_result(conn)
        .await
}

/// ## Summary
/// Retrieves a feed by its published filename.
///
/// ## Errors
/// Returns a database error if the query fails.
pub async fn get_by_filename(
    conn: &mut DbConnection<'_>,
    filename: &str,
) -> QueryResult<Option<CalendarFeed>> {
    calendar_feed::table
        .filter(calendar_feed::filename.eq(filename))
        .select(CalendarFeed::as_select())
        .get_result(conn)
        .await
        .optional()
}

/// ## Summary
/// Retrieves the feed record of a property.
///
/// ## Errors
/// Returns a database error if the query fails.
pub async fn get_for_property(
    conn: &mut DbConnection<'_>,
    property_id: uuid::Uuid,
) -> QueryResult<Option<CalendarFeed>> {
    calendar_feed::table
        .filter(calendar_feed::property_id.eq(property_id))
        .select(CalendarFeed::as_select())
        .get_result(conn)
        .await
        .optional()
}
