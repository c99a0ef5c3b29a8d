use diesel::{pg::Pg, prelude::*};

use crate::db::{enums::SyncStatus, schema};

/// Remote calendar feed polled for bookings of one property.
#[derive(Debug, Clone, PartialEq, Eq, Queryable, Selectable, Identifiable)]
#[diesel(table_name = schema::external_calendar)]
#[diesel(check_for_backend(Pg))]
pub struct ExternalCalendar {
    pub id: uuid::Uuid,
    pub property_id: uuid::Uuid,
    pub name: String,
    pub feed_url: String,
    pub enabled: bool,
    pub last_sync_at: Option<chrono::DateTime<chrono::Utc>>,
    pub last_sync_status: SyncStatus,
    pub sync_error: Option<String>,
    pub total_events: i32,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Insert struct for registering external calendars
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = schema::external_calendar)]
pub struct NewExternalCalendar<'a> {
    pub id: uuid::Uuid,
    pub property_id: uuid::Uuid,
    pub name: &'a str,
    pub feed_url: &'a str,
    pub enabled: bool,
}

/// Sync bookkeeping written after each attempt.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = schema::external_calendar)]
#[diesel(treat_none_as_null = true)]
pub struct CalendarSyncUpdate<'a> {
    pub last_sync_at: Option<chrono::DateTime<chrono::Utc>>,
    pub last_sync_status: SyncStatus,
    pub sync_error: Option<&'a str>,
}
