//! Persistence seam of the engine.
//!
//! Reads are plain lookups. Every write goes through
//! [`EngineStore::apply_changes`], which applies a batch of [`BlockChange`]s,
//! regenerates the property's outbound feed from the resulting blocked dates
//! and stores the feed record, all in one transaction.

pub mod memory;
pub mod pg;

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use stayline_db::model::blocked_date::{BlockedDate, NewBlockedDate};
use stayline_db::model::calendar::ExternalCalendar;
use stayline_db::model::feed::CalendarFeed;
use stayline_db::model::property::Property;

use crate::error::ServiceResult;
use crate::tariff::TariffTables;

/// One mutation of a property's calendars or blocked dates.
#[derive(Debug, Clone, PartialEq)]
pub enum BlockChange {
    /// Registers an enabled external calendar.
    CreateCalendar {
        calendar_id: Uuid,
        name: String,
        feed_url: String,
    },
    /// Replaces every row a calendar owns and records a successful sync.
    ReplaceCalendarBlocks {
        calendar_id: Uuid,
        rows: Vec<NewBlockedDate>,
        synced_at: DateTime<Utc>,
        total_events: i32,
    },
    /// Records a failed sync; the calendar's rows are kept.
    RecordCalendarError {
        calendar_id: Uuid,
        error: String,
        at: DateTime<Utc>,
    },
    SetCalendarEnabled {
        calendar_id: Uuid,
        enabled: bool,
    },
    /// Deletes a calendar. Its rows are deleted too when `delete_blocks` is
    /// set, otherwise they are kept as manual blocks.
    DeleteCalendar {
        calendar_id: Uuid,
        delete_blocks: bool,
    },
    /// Inserts or overwrites manual blocks.
    UpsertManual { rows: Vec<NewBlockedDate> },
    /// Deletes manual blocks on the given dates.
    RemoveManual { dates: Vec<NaiveDate> },
}

/// Feed content produced from a property's blocked dates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedFeed {
    pub filename: String,
    pub path: String,
    pub feed_url: String,
    pub body: String,
    pub blocked_day_count: i32,
    pub generated_at: DateTime<Utc>,
}

/// Renders the feed of a property from all of its blocked dates.
pub type FeedRender<'a> = &'a (dyn Fn(&[BlockedDate]) -> RenderedFeed + Send + Sync);

#[async_trait::async_trait]
pub trait EngineStore: Send + Sync + 'static {
    async fn property(&self, property_id: Uuid) -> ServiceResult<Option<Property>>;

    async fn tariffs(&self, property: &Property) -> ServiceResult<TariffTables>;

    /// Whether the property has any blocked date, synced or manual.
    async fn has_blocked_dates(&self, property_id: Uuid) -> ServiceResult<bool>;

    /// Blocked dates of a property in date order.
    async fn blocked_dates(&self, property_id: Uuid) -> ServiceResult<Vec<BlockedDate>>;

    /// Blocked dates inside `[start, end]`, in date order.
    async fn blocked_dates_between(
        &self,
        property_id: Uuid,
        start: NaiveDate,
        end: NaiveDate,
    ) -> ServiceResult<Vec<BlockedDate>>;

    async fn calendars(&self, property_id: Uuid) -> ServiceResult<Vec<ExternalCalendar>>;

    async fn calendar(
        &self,
        property_id: Uuid,
        calendar_id: Uuid,
    ) -> ServiceResult<Option<ExternalCalendar>>;

    /// Properties with at least one enabled external calendar.
    async fn properties_with_enabled_calendars(&self) -> ServiceResult<Vec<Uuid>>;

    async fn feed_by_filename(&self, filename: &str) -> ServiceResult<Option<CalendarFeed>>;

    async fn feed_for_property(&self, property_id: Uuid) -> ServiceResult<Option<CalendarFeed>>;

    /// ## Summary
    /// Applies `changes` in order, renders the feed from the resulting rows
    /// and stores it. Nothing is written if any step fails.
    ///
    /// ## Errors
    /// Returns an error if a change or the feed upsert fails.
    async fn apply_changes(
        &self,
        property_id: Uuid,
        changes: Vec<BlockChange>,
        render: FeedRender<'_>,
    ) -> ServiceResult<CalendarFeed>;
}

/// ## Summary
/// Keeps one row per date; a later row replaces an earlier one.
#[must_use]
pub fn dedup_by_date(rows: Vec<NewBlockedDate>) -> Vec<NewBlockedDate> {
    let mut by_date = BTreeMap::new();
    for row in rows {
        by_date.insert(row.date, row);
    }
    by_date.into_values().collect()
}
