//! Read model over a property's blocked dates.

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::{Days, NaiveDate};
use serde::Serialize;
use uuid::Uuid;

use stayline_db::model::blocked_date::BlockedDate;
use stayline_db::model::calendar::ExternalCalendar;
use stayline_db::model::feed::CalendarFeed;

use crate::error::ServiceResult;
use crate::store::EngineStore;

/// Blocked dates of a property inside a queried range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlockedRange {
    /// `false` when the property has no blocked dates at all, which means
    /// nobody manages its calendar rather than that it is free.
    pub has_calendar: bool,
    pub blocked: Vec<NaiveDate>,
}

/// Everything an operator sees on a property's calendar page.
#[derive(Debug, Clone)]
pub struct CalendarOverview {
    pub calendars: Vec<ExternalCalendar>,
    pub blocked: Vec<BlockedDate>,
    pub feed: Option<CalendarFeed>,
}

#[derive(Clone)]
pub struct CalendarAggregator {
    store: Arc<dyn EngineStore>,
}

impl CalendarAggregator {
    #[must_use]
    pub fn new(store: Arc<dyn EngineStore>) -> Self {
        Self { store }
    }

    /// ## Summary
    /// Whether the property has any blocked-date rows.
    ///
    /// ## Errors
    /// Returns an error if the store fails.
    pub async fn has_calendar(&self, property_id: Uuid) -> ServiceResult<bool> {
        self.store.has_blocked_dates(property_id).await
    }

    /// ## Summary
    /// Blocked dates inside `[start - tolerance, end + tolerance]`.
    ///
    /// ## Errors
    /// Returns an error if the store fails.
    #[tracing::instrument(skip(self), fields(%property_id, %start, %end))]
    pub async fn blocked_around(
        &self,
        property_id: Uuid,
        start: NaiveDate,
        end: NaiveDate,
        tolerance_days: u32,
    ) -> ServiceResult<BlockedRange> {
        let has_calendar = self.has_calendar(property_id).await?;
        if !has_calendar {
            return Ok(BlockedRange {
                has_calendar,
                blocked: Vec::new(),
            });
        }

        let (from, to) = widen(start, end, tolerance_days);
        let blocked = self.blocked_days(property_id, from, to).await?;
        tracing::trace!(%from, %to, blocked = blocked.len(), "Blocked dates in range");

        Ok(BlockedRange {
            has_calendar,
            blocked: blocked.into_iter().collect(),
        })
    }

    /// ## Summary
    /// Set of blocked days inside `[start, end]`.
    ///
    /// ## Errors
    /// Returns an error if the store fails.
    pub async fn blocked_days(
        &self,
        property_id: Uuid,
        start: NaiveDate,
        end: NaiveDate,
    ) -> ServiceResult<BTreeSet<NaiveDate>> {
        Ok(self
            .store
            .blocked_dates_between(property_id, start, end)
            .await?
            .into_iter()
            .map(|row| row.date)
            .collect())
    }

    /// ## Summary
    /// Calendars, blocked dates and feed record of a property.
    ///
    /// ## Errors
    /// Returns an error if the store fails.
    pub async fn overview(&self, property_id: Uuid) -> ServiceResult<CalendarOverview> {
        Ok(CalendarOverview {
            calendars: self.store.calendars(property_id).await?,
            blocked: self.store.blocked_dates(property_id).await?,
            feed: self.store.feed_for_property(property_id).await?,
        })
    }
}

/// ## Summary
/// Expands `[start, end]` by `tolerance_days` on both sides, saturating at
/// the calendar limits.
#[must_use]
pub fn widen(start: NaiveDate, end: NaiveDate, tolerance_days: u32) -> (NaiveDate, NaiveDate) {
    let days = Days::new(u64::from(tolerance_days));
    (
        start.checked_sub_days(days).unwrap_or(NaiveDate::MIN),
        end.checked_add_days(days).unwrap_or(NaiveDate::MAX),
    )
}
