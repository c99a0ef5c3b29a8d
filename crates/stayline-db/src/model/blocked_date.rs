use diesel::{pg::Pg, prelude::*};

use crate::db::schema;

/// A single blocked night of a property.
///
/// `source_calendar_id` is `None` for manual blocks.
#[derive(Debug, Clone, PartialEq, Eq, Queryable, Selectable)]
#[diesel(table_name = schema::blocked_date)]
#[diesel(check_for_backend(Pg))]
pub struct BlockedDate {
    pub property_id: uuid::Uuid,
    pub date: chrono::NaiveDate,
    pub reason: Option<String>,
    pub source_calendar_id: Option<uuid::Uuid>,
    pub event_uid: Option<String>,
    pub is_check_in: bool,
    pub is_check_out: bool,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Insertable)]
#[diesel(table_name = schema::blocked_date)]
pub struct NewBlockedDate {
    pub property_id: uuid::Uuid,
    pub date: chrono::NaiveDate,
    pub reason: Option<String>,
    pub source_calendar_id: Option<uuid::Uuid>,
    pub event_uid: Option<String>,
    pub is_check_in: bool,
    pub is_check_out: bool,
}
