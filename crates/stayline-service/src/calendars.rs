//! Registration and removal of external calendars.

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use stayline_db::db::enums::SyncStatus;
use stayline_db::model::calendar::ExternalCalendar;
use stayline_db::model::feed::CalendarFeed;
use stayline_db::model::property::Property;

use crate::error::{ServiceError, ServiceResult};
use crate::fetcher::{FeedFetcher, fetch_events, normalize_feed_url};
use crate::publisher::FeedPublisher;
use crate::store::{BlockChange, EngineStore};
use crate::sync::replace_change;

/// A calendar that was validated, created and synced.
#[derive(Debug, Clone)]
pub struct AddedCalendar {
    pub calendar: ExternalCalendar,
    pub event_count: usize,
    pub feed: CalendarFeed,
}

#[derive(Clone)]
pub struct CalendarManager {
    store: Arc<dyn EngineStore>,
    fetcher: Arc<dyn FeedFetcher>,
    publisher: FeedPublisher,
}

impl CalendarManager {
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
    /// Validates a feed, registers it and imports its bookings in one
    /// commit.
    ///
    /// The feed must be reachable and contain at least one event; otherwise
    /// nothing is created and the reason is returned.
    ///
    /// ## Errors
    /// Returns `ValidationError` for an empty name, an unsupported URL or a
    /// feed that fails validation, `NotFound` for an unknown property, or a
    /// store error.
    #[tracing::instrument(skip(self), fields(%property_id))]
    pub async fn add_calendar(
        &self,
        property_id: Uuid,
        name: &str,
        feed_url: &str,
    ) -> ServiceResult<AddedCalendar> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ServiceError::ValidationError(
                "calendar name is required".to_string(),
            ));
        }
        let property = self.property(property_id).await?;
        let feed_url = normalize_feed_url(feed_url)
            .map_err(|e| ServiceError::ValidationError(e.to_string()))?;

        let events = fetch_events(self.fetcher.as_ref(), &feed_url)
            .await
            .map_err(|e| {
                tracing::warn!(%feed_url, error = %e, "Calendar feed rejected");
                ServiceError::ValidationError(format!("feed could not be loaded: {e}"))
            })?;
        if events.is_empty() {
            return Err(ServiceError::ValidationError(
                "feed contains no events".to_string(),
            ));
        }

        let draft = ExternalCalendar {
            id: Uuid::now_v7(),
            property_id,
            name: name.to_string(),
            feed_url: feed_url.clone(),
            enabled: true,
            last_sync_at: None,
            last_sync_status: SyncStatus::Never,
            sync_error: None,
            total_events: 0,
            created_at: Utc::now(),
        };
        let changes = vec![
            BlockChange::CreateCalendar {
                calendar_id: draft.id,
                name: draft.name.clone(),
                feed_url,
            },
            replace_change(&draft, &events),
        ];
        let feed = self.publisher.commit(&property, changes).await?;

        let calendar = self
            .store
            .calendar(property_id, draft.id)
            .await?
            .ok_or(ServiceError::InvariantViolation(
                "created calendar is missing after commit",
            ))?;

        tracing::info!(calendar_id = %calendar.id, events = events.len(), "Calendar added");
        Ok(AddedCalendar {
            calendar,
            event_count: events.len(),
            feed,
        })
    }

    /// ## Summary
    /// Deletes a calendar. With `delete_blocks` its rows go too, otherwise
    /// they stay as manual blocks.
    ///
    /// ## Errors
    /// Returns `NotFound` for an unknown property or calendar, or a store
    /// error.
    #[tracing::instrument(skip(self), fields(%property_id, %calendar_id))]
    pub async fn remove_calendar(
        &self,
        property_id: Uuid,
        calendar_id: Uuid,
        delete_blocks: bool,
    ) -> ServiceResult<CalendarFeed> {
        let property = self.property(property_id).await?;
        self.calendar(property_id, calendar_id).await?;

        self.publisher
            .commit(
                &property,
                vec![BlockChange::DeleteCalendar {
                    calendar_id,
                    delete_blocks,
                }],
            )
            .await
    }

    /// ## Summary
    /// Flips whether a calendar takes part in syncs. Its rows are kept.
    ///
    /// ## Errors
    /// Returns `NotFound` for an unknown property or calendar, or a store
    /// error.
    #[tracing::instrument(skip(self), fields(%property_id, %calendar_id))]
    pub async fn toggle_calendar(
        &self,
        property_id: Uuid,
        calendar_id: Uuid,
    ) -> ServiceResult<ExternalCalendar> {
        let property = self.property(property_id).await?;
        let calendar = self.calendar(property_id, calendar_id).await?;

        self.publisher
            .commit(
                &property,
                vec![BlockChange::SetCalendarEnabled {
                    calendar_id,
                    enabled: !calendar.enabled,
                }],
            )
            .await?;

        Ok(ExternalCalendar {
            enabled: !calendar.enabled,
            ..calendar
        })
    }

    async fn property(&self, property_id: Uuid) -> ServiceResult<Property> {
        self.store.property(property_id).await?.ok_or_else(|| {
            tracing::warn!(%property_id, "Property not found");
            ServiceError::NotFound(format!("property {property_id}"))
        })
    }

    async fn calendar(&self, property_id: Uuid, calendar_id: Uuid) -> ServiceResult<ExternalCalendar> {
        self.store
            .calendar(property_id, calendar_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("calendar {calendar_id}")))
    }
}
