use diesel::{pg::Pg, prelude::*};

use crate::db::schema;

/// Metadata and body of a property's published calendar feed.
#[derive(Debug, Clone, PartialEq, Eq, Queryable, Selectable)]
#[diesel(table_name = schema::calendar_feed)]
#[diesel(check_for_backend(Pg))]
pub struct CalendarFeed {
    pub property_id: uuid::Uuid,
    pub filename: String,
    pub path: String,
    pub feed_url: String,
    pub blocked_day_count: i32,
    pub body: String,
    pub generated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = schema::calendar_feed)]
pub struct NewCalendarFeed<'a> {
    pub property_id: uuid::Uuid,
    pub filename: &'a str,
    pub path: &'a str,
    pub feed_url: &'a str,
    pub blocked_day_count: i32,
    pub body: &'a str,
    pub generated_at: chrono::DateTime<chrono::Utc>,
}
