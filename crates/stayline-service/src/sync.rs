//! External calendar synchronisation.
//!
//! Each sync replaces every row a calendar owns with the days of its current
//! events, so bookings removed upstream disappear. A property sync fetches
//! its enabled calendars one after another and commits all of them together
//! with the regenerated feed. A calendar whose feed fails keeps its previous
//! rows and gets the error recorded instead.

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use uuid::Uuid;

use stayline_core::types::CalendarEvent;
use stayline_db::model::blocked_date::NewBlockedDate;
use stayline_db::model::calendar::ExternalCalendar;
use stayline_db::model::property::Property;

use crate::error::{ServiceError, ServiceResult};
use crate::fetcher::{FeedError, FeedFetcher, fetch_events};
use crate::publisher::FeedPublisher;
use crate::store::{BlockChange, EngineStore};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CalendarSyncError {
    pub calendar_id: Uuid,
    pub calendar_name: String,
    pub error: String,
}

/// Outcome of syncing every enabled calendar of a property.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    pub property_id: Uuid,
    /// The sync pass and feed regeneration were committed. Individual
    /// calendar failures are listed in `errors` and do not clear this flag.
    pub success: bool,
    pub synced_count: usize,
    pub total_events: usize,
    pub errors: Vec<CalendarSyncError>,
    pub feed_url: String,
    pub blocked_day_count: i32,
}

/// ## Summary
/// Expands events into one row per occupied day, owned by `calendar`.
///
/// The first and last occupied day of each event carry the check-in and
/// check-out flags. Overlapping events produce duplicate dates; the store
/// keeps the later one.
#[must_use]
pub fn expand_events(calendar: &ExternalCalendar, events: &[CalendarEvent]) -> Vec<NewBlockedDate> {
    let mut rows = Vec::new();

    for event in events {
        let days = event.occupied_days();
        let last = days.len().saturating_sub(1);
        let reason = event
            .summary
            .clone()
            .unwrap_or_else(|| calendar.name.clone());

        rows.extend(days.into_iter().enumerate().map(|(i, date)| NewBlockedDate {
            property_id: calendar.property_id,
            date,
            reason: Some(reason.clone()),
            source_calendar_id: Some(calendar.id),
            event_uid: event.uid.clone(),
            is_check_in: i == 0,
            is_check_out: i == last,
        }));
    }

    rows
}

/// ## Summary
/// Change recording a successful fetch of `events` for `calendar`.
#[must_use]
pub fn replace_change(calendar: &ExternalCalendar, events: &[CalendarEvent]) -> BlockChange {
    BlockChange::ReplaceCalendarBlocks {
        calendar_id: calendar.id,
        rows: expand_events(calendar, events),
        synced_at: Utc::now(),
        total_events: i32::try_from(events.len()).unwrap_or(i32::MAX),
    }
}

#[derive(Clone)]
pub struct CalendarSyncer {
    store: Arc<dyn EngineStore>,
    fetcher: Arc<dyn FeedFetcher>,
    publisher: FeedPublisher,
}

impl CalendarSyncer {
    #[must_use]
    pub fn new(
        store: Arc<dyn EngineStore>,
        fetcher: Arc<dyn FeedFetcher>,
        publisher: FeedPublisher,
    ) -> Self {
        Self {
            store,
            fetcher,
            publisher,
        }
    }

    /// ## Summary
    /// Syncs one calendar and regenerates the property feed.
    ///
    /// A failed fetch is recorded on the calendar, the feed is still
    /// regenerated, and the fetch error is returned.
    ///
    /// ## Errors
    /// Returns `NotFound` for an unknown property or calendar, `FeedError`
    /// if the feed could not be loaded, or a store error.
    #[tracing::instrument(skip(self), fields(%property_id, %calendar_id))]
    pub async fn sync_calendar(&self, property_id: Uuid, calendar_id: Uuid) -> ServiceResult<usize> {
        let property = self.property(property_id).await?;
        let calendar = self
            .store
            .calendar(property_id, calendar_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("calendar {calendar_id}")))?;

        let (change, outcome) = self.fetch(&calendar).await;
        self.publisher.commit(&property, vec![change]).await?;

        Ok(outcome?)
    }

    /// ## Summary
    /// Syncs every enabled calendar of a property in one commit and
    /// regenerates its feed, even when no calendar could be fetched.
    ///
    /// ## Errors
    /// Returns `NotFound` for an unknown property, or a store error if the
    /// commit fails.
    #[tracing::instrument(skip(self), fields(%property_id))]
    pub async fn sync_property_calendars(&self, property_id: Uuid) -> ServiceResult<SyncReport> {
        let property = self.property(property_id).await?;
        let calendars: Vec<ExternalCalendar> = self
            .store
            .calendars(property_id)
            .await?
            .into_iter()
            .filter(|c| c.enabled)
            .collect();

        let mut changes = Vec::with_capacity(calendars.len());
        let mut synced_count = 0;
        let mut total_events = 0;
        let mut errors = Vec::new();

        for calendar in &calendars {
            let (change, outcome) = self.fetch(calendar).await;
            changes.push(change);
            match outcome {
                Ok(count) => {
                    synced_count += 1;
                    total_events += count;
                }
                Err(error) => errors.push(CalendarSyncError {
                    calendar_id: calendar.id,
                    calendar_name: calendar.name.clone(),
                    error: error.to_string(),
                }),
            }
        }

        let feed = self.publisher.commit(&property, changes).await?;

        tracing::info!(
            calendars = calendars.len(),
            synced_count,
            total_events,
            failed = errors.len(),
            "Property calendars synced"
        );

        Ok(SyncReport {
            property_id,
            success: true,
            synced_count,
            total_events,
            errors,
            feed_url: feed.feed_url,
            blocked_day_count: feed.blocked_day_count,
        })
    }

    /// Fetches a calendar and turns the outcome into the change to commit.
    async fn fetch(&self, calendar: &ExternalCalendar) -> (BlockChange, Result<usize, FeedError>) {
        match fetch_events(self.fetcher.as_ref(), &calendar.feed_url).await {
            Ok(events) => {
                tracing::debug!(calendar_id = %calendar.id, events = events.len(), "Calendar fetched");
                (replace_change(calendar, &events), Ok(events.len()))
            }
            Err(error) => {
                tracing::warn!(calendar_id = %calendar.id, %error, "Calendar sync failed");
                (
                    BlockChange::RecordCalendarError {
                        calendar_id: calendar.id,
                        error: error.to_string(),
                        at: Utc::now(),
                    },
                    Err(error),
                )
            }
        }
    }

    async fn property(&self, property_id: Uuid) -> ServiceResult<Property> {
        self.store.property(property_id).await?.ok_or_else(|| {
            tracing::warn!(%property_id, "Property not found");
            ServiceError::NotFound(format!("property {property_id}"))
        })
    }
}

#[cfg(test)]
#[path = "sync_tests.rs"]
mod tests;
