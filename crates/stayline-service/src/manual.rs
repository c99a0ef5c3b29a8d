//! Manually entered blocks.

use std::sync::Arc;

use chrono::NaiveDate;
use uuid::Uuid;

use stayline_db::model::blocked_date::NewBlockedDate;
use stayline_db::model::feed::CalendarFeed;
use stayline_db::model::property::Property;

use crate::error::{ServiceError, ServiceResult};
use crate::publisher::FeedPublisher;
use crate::store::{BlockChange, EngineStore};

#[derive(Clone)]
pub struct ManualBlockService {
    store: Arc<dyn EngineStore>,
    publisher: FeedPublisher,
}

impl ManualBlockService {
    #[must_use]
    pub fn new(store: Arc<dyn EngineStore>, publisher: FeedPublisher) -> Self {
        Self { store, publisher }
    }

    /// ## Summary
    /// Blocks `dates` by hand and regenerates the feed.
    ///
    /// Existing rows on those dates, synced ones included, are overwritten
    /// and become manual blocks.
    ///
    /// ## Errors
    /// Returns `ValidationError` for an empty date list, `NotFound` for an
    /// unknown property, or a store error.
    #[tracing::instrument(skip(self, dates), fields(%property_id, count = dates.len()))]
    pub async fn block_dates(
        &self,
        property_id: Uuid,
        dates: &[NaiveDate],
        reason: Option<String>,
    ) -> ServiceResult<CalendarFeed> {
        let property = self.checked(property_id, dates).await?;
        let reason = reason.filter(|r| !r.trim().is_empty());

        let rows = dates
            .iter()
            .map(|date| NewBlockedDate {
                property_id,
                date: *date,
                reason: reason.clone(),
                source_calendar_id: None,
                event_uid: None,
                is_check_in: false,
                is_check_out: false,
            })
            .collect();

        self.publisher
            .commit(&property, vec![BlockChange::UpsertManual { rows }])
            .await
    }

    /// ## Summary
    /// Removes manual blocks on `dates` and regenerates the feed. Rows owned
    /// by an external calendar are left alone.
    ///
    /// ## Errors
    /// Returns `ValidationError` for an empty date list, `NotFound` for an
    /// unknown property, or a store error.
    #[tracing::instrument(skip(self, dates), fields(%property_id, count = dates.len()))]
    pub async fn unblock_dates(
        &self,
        property_id: Uuid,
        dates: &[NaiveDate],
    ) -> ServiceResult<CalendarFeed> {
        let property = self.checked(property_id, dates).await?;

        self.publisher
            .commit(
                &property,
                vec![BlockChange::RemoveManual {
                    dates: dates.to_vec(),
                }],
            )
            .await
    }

    async fn checked(&self, property_id: Uuid, dates: &[NaiveDate]) -> ServiceResult<Property> {
        if dates.is_empty() {
            return Err(ServiceError::ValidationError(
                "at least one date is required".to_string(),
            ));
        }
        self.store.property(property_id).await?.ok_or_else(|| {
            tracing::warn!(%property_id, "Property not found");
            ServiceError::NotFound(format!("property {property_id}"))
        })
    }
}
