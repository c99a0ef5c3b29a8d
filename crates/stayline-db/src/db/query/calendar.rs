//! Query functions for external calendars.

use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::db::connection::DbConnection;
use crate::db::schema::external_calendar;
use crate::model::calendar::{CalendarSyncUpdate, ExternalCalendar, NewExternalCalendar};

/// ## Summary
/// Returns a query for the calendars of a property, oldest first.
#[must_use]
pub fn by_property(
    property_id: uuid::Uuid,
) -> external_calendar::BoxedQuery<'static, diesel::pg::Pg> {
    external_calendar::table
        .filter(external_calendar::property_id.eq(property_id))
        .order((
            external_calendar::created_at.asc(),
            external_calendar::id.asc(),
        ))
        .into_boxed()
}

/// One calendar, addressed through the property that owns it.
pub type Owned = diesel::dsl::Filter<
    diesel::dsl::Filter<external_calendar::table, diesel::dsl::Eq<external_calendar::id, uuid::Uuid>>,
    diesel::dsl::Eq<external_calendar::property_id, uuid::Uuid>,
>;

/// ## Summary
/// Returns the target of updates and deletes of one calendar. A calendar of
/// another property never matches.
#[must_use]
pub fn owned(property_id: uuid::Uuid, calendar_id: uuid::Uuid) -> Owned {
    external_calendar::table
        .filter(external_calendar::id.eq(calendar_id))
        .filter(external_calendar::property_id.eq(property_id))
}

/// ## Summary
/// Lists the calendars of a property.
///
/// ## Errors
/// Returns a database error if the query fails.
pub async fn list_for_property(
    conn: &mut DbConnection<'_>,
    property_id: uuid::Uuid,
) -> QueryResult<Vec<ExternalCalendar>> {
    by_property(property_id)
        .select(ExternalCalendar::as_select())
        .load(conn)
        .await
}

/// ## Summary
/// Retrieves one calendar of a property.
///
/// ## Errors
/// Returns a database error if the query fails.
pub async fn get_calendar(
    conn: &mut DbConnection<'_>,
    property_id: uuid::Uuid,
    calendar_id: uuid::Uuid,
) -> QueryResult<Option<ExternalCalendar>> {
    by_property(property_id)
        .filter(external_calendar::id.eq(calendar_id))
        .select(ExternalCalendar::as_select())
        .first(conn)
        .await
        .optional()
}

/// ## Summary
/// Inserts a new calendar and returns the inserted record.
///
/// ## Errors
/// Returns a database error if the insert fails.
pub async fn create_calendar(
    conn: &mut DbConnection<'_>,
    new_calendar: &NewExternalCalendar<'_>,
) -> QueryResult<ExternalCalendar> {
    diesel::insert_into(external_calendar::table)
        .values(new_calendar)
        .returning(ExternalCalendar::as_returning())
        .get_result(conn)
        .await
}

/// ## Summary
/// Sets the enabled flag of a calendar.
///
/// ## Errors
/// Returns a database error if the update fails.
pub async fn set_enabled(
    conn: &mut DbConnection<'_>,
    property_id: uuid::Uuid,
    calendar_id: uuid::Uuid,
    enabled: bool,
) -> QueryResult<Option<ExternalCalendar>> {
    diesel::update(owned(property_id, calendar_id))
        .set(external_calendar::enabled.eq(enabled))
        .returning(ExternalCalendar::as_returning())
        .get_result(conn)
        .await
        .optional()
}

/// ## Summary
/// Writes the outcome of a sync attempt of a calendar of the property.
/// Returns the number of updated rows, zero when the calendar belongs to
/// another property.
///
/// ## Errors
/// Returns a database error if the update fails.
pub async fn record_sync(
    conn: &mut DbConnection<'_>,
    property_id: uuid::Uuid,
    calendar_id: uuid::Uuid,
    update: &CalendarSyncUpdate<'_>,
    total_events: Option<i32>,
) -> QueryResult<usize> {
    let target = owned(property_id, calendar_id);

    match total_events {
        Some(total) => {
            diesel::update(target)
                .set((update, external_calendar::total_events.eq(total)))
                .execute(conn)
                .await
        }
        None => diesel::update(target).set(update).execute(conn).await,
    }
}

/// ## Summary
/// Deletes a calendar. Blocked dates it owned are detached by the foreign
/// key and survive as manual blocks.
///
/// ## Errors
/// Returns a database error if the delete fails.
pub async fn delete_calendar(
    conn: &mut DbConnection<'_>,
    property_id: uuid::Uuid,
    calendar_id: uuid::Uuid,
) -> QueryResult<usize> {
    diesel::delete(owned(property_id, calendar_id))
        .execute(conn)
        .await
}

#[cfg(test)]
mod tests {
    use diesel::debug_query;
    use diesel::pg::Pg;

    use super::*;

    #[test]
    fn owned_calendar_is_scoped_by_property() {
        let query = owned(uuid::Uuid::nil(), uuid::Uuid::max());
        let sql = debug_query::<Pg, _>(&query).to_string();
        assert!(sql.contains("\"external_calendar\".\"id\" = $1"));
        assert!(sql.contains("\"external_calendar\".\"property_id\" = $2"));
    }

    #[test]
    fn sync_update_only_touches_the_owned_calendar() {
        let update = CalendarSyncUpdate {
            last_sync_at: None,
            last_sync_status: crate::db::enums::SyncStatus::Error,
            sync_error: Some("timeout"),
        };
        let statement = diesel::update(owned(uuid::Uuid::nil(), uuid::Uuid::max())).set(&update);
        let sql = debug_query::<Pg, _>(&statement).to_string();
        assert!(sql.starts_with("UPDATE \"external_calendar\" SET"));
        assert!(sql.contains(" WHERE "));
        assert!(sql.contains("\"external_calendar\".\"id\" = $"));
        assert!(sql.contains("\"external_calendar\".\"property_id\" = $"));
    }
}
