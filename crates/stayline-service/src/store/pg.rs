//! Postgres-backed [`EngineStore`].

use anyhow::Context;
use chrono::NaiveDate;
use diesel_async::scoped_futures::ScopedFutureExt;
use uuid::Uuid;

use stayline_db::db::DbProvider;
use stayline_db::db::connection::{DbConnection, DbPool};
use stayline_db::db::enums::SyncStatus;
use stayline_db::db::query::{blocked_date, calendar, feed, property, tariff};
use stayline_db::db::transaction::with_transaction;
use stayline_db::model::blocked_date::BlockedDate;
use stayline_db::model::calendar::{CalendarSyncUpdate, ExternalCalendar, NewExternalCalendar};
use stayline_db::model::feed::{CalendarFeed, NewCalendarFeed};
use stayline_db::model::property::Property;

use super::{BlockChange, EngineStore, FeedRender, dedup_by_date};
use crate::error::ServiceResult;
use crate::tariff::TariffTables;

#[derive(Clone)]
pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    #[must_use]
    pub const fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    async fn conn(&self) -> ServiceResult<DbConnection<'_>> {
        Ok(self.pool.get_connection().await?)
    }
}

#[async_trait::async_trait]
impl EngineStore for PgStore {
    async fn property(&self, property_id: Uuid) -> ServiceResult<Option<Property>> {
        let mut conn = self.conn().await?;
        Ok(property::get_property(&mut conn, property_id).await?)
    }

    async fn tariffs(&self, property: &Property) -> ServiceResult<TariffTables> {
        let mut conn = self.conn().await?;
        let seasonal = tariff::load_seasonal(&mut conn, property.id).await?;
        let monthly = tariff::load_monthly(&mut conn, property.id).await?;
        Ok(TariffTables::from_rows(property.year_price, &seasonal, &monthly))
    }

    async fn has_blocked_dates(&self, property_id: Uuid) -> ServiceResult<bool> {
        let mut conn = self.conn().await?;
        Ok(blocked_date::exists_for_property(&mut conn, property_id).await?)
    }

    async fn blocked_dates(&self, property_id: Uuid) -> ServiceResult<Vec<BlockedDate>> {
        let mut conn = self.conn().await?;
        Ok(blocked_date::list_for_property(&mut conn, property_id).await?)
    }

    async fn blocked_dates_between(
        &self,
        property_id: Uuid,
        start: NaiveDate,
        end: NaiveDate,
    ) -> ServiceResult<Vec<BlockedDate>> {
        let mut conn = self.conn().await?;
        Ok(blocked_date::list_between(&mut conn, property_id, start, end).await?)
    }

    async fn calendars(&self, property_id: Uuid) -> ServiceResult<Vec<ExternalCalendar>> {
        let mut conn = self.conn().await?;
        Ok(calendar::list_for_property(&mut conn, property_id).await?)
    }

    async fn calendar(
        &self,
        property_id: Uuid,
        calendar_id: Uuid,
    ) -> ServiceResult<Option<ExternalCalendar>> {
        let mut conn = self.conn().await?;
        Ok(calendar::get_calendar(&mut conn, property_id, calendar_id).await?)
    }

    async fn properties_with_enabled_calendars(&self) -> ServiceResult<Vec<Uuid>> {
        let mut conn = self.conn().await?;
        Ok(property::ids_with_enabled_calendars(&mut conn).await?)
    }

    async fn feed_by_filename(&self, filename: &str) -> ServiceResult<Option<CalendarFeed>> {
        let mut conn = self.conn().await?;
        Ok(feed::get_by_filename(&mut conn, filename).await?)
    }

    async fn feed_for_property(&self, property_id: Uuid) -> ServiceResult<Option<CalendarFeed>> {
        let mut conn = self.conn().await?;
        Ok(feed::get_for_property(&mut conn, property_id).await?)
    }

    #[tracing::instrument(skip(self, changes, render), fields(%property_id, change_count = changes.len()))]
    async fn apply_changes(
        &self,
        property_id: Uuid,
        changes: Vec<BlockChange>,
        render: FeedRender<'_>,
    ) -> ServiceResult<CalendarFeed> {
        let mut conn = self.conn().await?;

        let record = with_transaction(&mut conn, |tx| {
            async move {
                for change in changes {
                    apply_change(tx, property_id, change).await?;
                }

                let rows = blocked_date::list_for_property(tx, property_id)
                    .await
                    .context("failed to reload blocked dates")?;
                let rendered = render(&rows);

                let record = feed::upsert_feed(
                    tx,
                    &NewCalendarFeed {
                        property_id,
                        filename: &rendered.filename,
                        path: &rendered.path,
                        feed_url: &rendered.feed_url,
                        blocked_day_count: rendered.blocked_day_count,
                        body: &rendered.body,
                        generated_at: rendered.generated_at,
                    },
                )
                .await
                .context("failed to store feed record")?;

                Ok(record)
            }
            .scope_boxed()
        })
        .await?;

        tracing::debug!(blocked_days = record.blocked_day_count, "Changes committed");
        Ok(record)
    }
}

async fn apply_change(
    tx: &mut DbConnection<'_>,
    property_id: Uuid,
    change: BlockChange,
) -> anyhow::Result<()> {
    match change {
        BlockChange::CreateCalendar {
            calendar_id,
            name,
            feed_url,
        } => {
            calendar::create_calendar(
                tx,
                &NewExternalCalendar {
                    id: calendar_id,
                    property_id,
                    name: &name,
                    feed_url: &feed_url,
                    enabled: true,
                },
            )
            .await
            .context("failed to create calendar")?;
        }
        BlockChange::ReplaceCalendarBlocks {
            calendar_id,
            rows,
            synced_at,
            total_events,
        } => {
            let removed = blocked_date::delete_for_calendar(tx, property_id, calendar_id)
                .await
                .context("failed to clear calendar rows")?;
            let written = blocked_date::upsert_batch(tx, &dedup_by_date(rows))
                .await
                .context("failed to write calendar rows")?;
            let updated = calendar::record_sync(
                tx,
                property_id,
                calendar_id,
                &CalendarSyncUpdate {
                    last_sync_at: Some(synced_at),
                    last_sync_status: SyncStatus::Ok,
                    sync_error: None,
                },
                Some(total_events),
            )
            .await
            .context("failed to record sync")?;
            anyhow::ensure!(updated == 1, "calendar {calendar_id} not found");
            tracing::debug!(%calendar_id, removed, written, "Calendar rows replaced");
        }
        BlockChange::RecordCalendarError {
            calendar_id,
            error,
            at,
        } => {
            let updated = calendar::record_sync(
                tx,
                property_id,
                calendar_id,
                &CalendarSyncUpdate {
                    last_sync_at: Some(at),
                    last_sync_status: SyncStatus::Error,
                    sync_error: Some(&error),
                },
                None,
            )
            .await
            .context("failed to record sync error")?;
            anyhow::ensure!(updated == 1, "calendar {calendar_id} not found");
        }
        BlockChange::SetCalendarEnabled {
            calendar_id,
            enabled,
        } => {
            calendar::set_enabled(tx, property_id, calendar_id, enabled)
                .await
                .context("failed to update calendar")?
                .with_context(|| format!("calendar {calendar_id} not found"))?;
        }
        BlockChange::DeleteCalendar {
            calendar_id,
            delete_blocks,
        } => {
            if delete_blocks {
                blocked_date::delete_for_calendar(tx, property_id, calendar_id)
                    .await
                    .context("failed to delete calendar rows")?;
            }
            calendar::delete_calendar(tx, property_id, calendar_id)
                .await
                .context("failed to delete calendar")?;
        }
        BlockChange::UpsertManual { rows } => {
            blocked_date::upsert_batch(tx, &dedup_by_date(rows))
                .await
                .context("failed to write manual blocks")?;
        }
        BlockChange::RemoveManual { dates } => {
            blocked_date::delete_manual(tx, property_id, &dates)
                .await
                .context("failed to remove manual blocks")?;
        }
    }

    Ok(())
}
