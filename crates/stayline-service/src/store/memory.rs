//! In-memory [`EngineStore`] used by tests and local demos.
//!
//! `apply_changes` works on a copy of the state and swaps it in only after
//! every change and the feed render succeeded, which gives the same
//! all-or-nothing behaviour as the Postgres transaction.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use tokio::sync::Mutex;
use uuid::Uuid;

use stayline_db::db::enums::SyncStatus;
use stayline_db::model::blocked_date::{BlockedDate, NewBlockedDate};
use stayline_db::model::calendar::ExternalCalendar;
use stayline_db::model::feed::CalendarFeed;
use stayline_db::model::property::Property;

use super::{BlockChange, EngineStore, FeedRender, dedup_by_date};
use crate::error::{ServiceError, ServiceResult};
use crate::tariff::{MonthlyRate, SeasonalRate, TariffTables, fill_seasonal_gaps};

#[derive(Debug, Clone, Default)]
struct MemoryState {
    properties: BTreeMap<Uuid, Property>,
    seasonal: HashMap<Uuid, Vec<SeasonalRate>>,
    monthly: HashMap<Uuid, Vec<MonthlyRate>>,
    calendars: Vec<ExternalCalendar>,
    blocked: BTreeMap<(Uuid, NaiveDate), BlockedDate>,
    feeds: BTreeMap<Uuid, CalendarFeed>,
    fail_next_write: bool,
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add_property(
        &self,
        property_number: &str,
        name: &str,
        year_price: Option<f64>,
    ) -> Property {
        let now = Utc::now();
        let property = Property {
            id: Uuid::now_v7(),
            property_number: property_number.to_string(),
            name: name.to_string(),
            year_price,
            created_at: now,
            updated_at: now,
        };
        self.state
            .lock()
            .await
            .properties
            .insert(property.id, property.clone());
        property
    }

    /// Appends a seasonal rate; earlier rates take precedence on overlap.
    pub async fn add_seasonal_rate(&self, property_id: Uuid, rate: SeasonalRate) {
        self.state
            .lock()
            .await
            .seasonal
            .entry(property_id)
            .or_default()
            .push(rate);
    }

    /// Sets the rate of one month, replacing any previous rate for it.
    pub async fn set_monthly_rate(&self, property_id: Uuid, rate: MonthlyRate) {
        let mut state = self.state.lock().await;
        let rates = state.monthly.entry(property_id).or_default();
        rates.retain(|existing| existing.month != rate.month);
        rates.push(rate);
        rates.sort_by_key(|r| r.month);
    }

    pub async fn add_calendar(
        &self,
        property_id: Uuid,
        name: &str,
        feed_url: &str,
        enabled: bool,
    ) -> ExternalCalendar {
        let mut calendar = new_calendar(property_id, Uuid::now_v7(), name, feed_url);
        calendar.enabled = enabled;
        self.state.lock().await.calendars.push(calendar.clone());
        calendar
    }

    /// Writes a blocked date directly, bypassing feed regeneration.
    pub async fn insert_blocked_date(&self, row: NewBlockedDate) {
        let mut state = self.state.lock().await;
        state
            .blocked
            .insert((row.property_id, row.date), materialize(row));
    }

    /// Makes the next `apply_changes` fail after applying its changes, so
    /// nothing of that batch becomes visible.
    pub async fn fail_next_write(&self) {
        self.state.lock().await.fail_next_write = true;
    }
}

fn new_calendar(property_id: Uuid, id: Uuid, name: &str, feed_url: &str) -> ExternalCalendar {
    ExternalCalendar {
        id,
        property_id,
        name: name.to_string(),
        feed_url: feed_url.to_string(),
        enabled: true,
        last_sync_at: None,
        last_sync_status: SyncStatus::Never,
        sync_error: None,
        total_events: 0,
        created_at: Utc::now(),
    }
}

fn materialize(row: NewBlockedDate) -> BlockedDate {
    BlockedDate {
        property_id: row.property_id,
        date: row.date,
        reason: row.reason,
        source_calendar_id: row.source_calendar_id,
        event_uid: row.event_uid,
        is_check_in: row.is_check_in,
        is_check_out: row.is_check_out,
        updated_at: Utc::now(),
    }
}

impl MemoryState {
    fn calendar_mut(
        &mut self,
        property_id: Uuid,
        calendar_id: Uuid,
    ) -> ServiceResult<&mut ExternalCalendar> {
        self.calendars
            .iter_mut()
            .find(|c| c.id == calendar_id && c.property_id == property_id)
            .ok_or_else(|| ServiceError::NotFound(format!("calendar {calendar_id}")))
    }

    fn rows_of(&self, property_id: Uuid) -> Vec<BlockedDate> {
        self.blocked
            .range((property_id, NaiveDate::MIN)..=(property_id, NaiveDate::MAX))
            .map(|(_, row)| row.clone())
            .collect()
    }

    fn apply(&mut self, property_id: Uuid, change: BlockChange) -> ServiceResult<()> {
        match change {
            BlockChange::CreateCalendar {
                calendar_id,
                name,
                feed_url,
            } => {
                self.calendars
                    .push(new_calendar(property_id, calendar_id, &name, &feed_url));
            }
            BlockChange::ReplaceCalendarBlocks {
                calendar_id,
                rows,
                synced_at,
                total_events,
            } => {
                self.blocked.retain(|(pid, _), row| {
                    !(*pid == property_id && row.source_calendar_id == Some(calendar_id))
                });
                for row in dedup_by_date(rows) {
                    self.blocked.insert((row.property_id, row.date), materialize(row));
                }
                let calendar = self.calendar_mut(property_id, calendar_id)?;
                calendar.last_sync_at = Some(synced_at);
                calendar.last_sync_status = SyncStatus::Ok;
                calendar.sync_error = None;
                calendar.total_events = total_events;
            }
            BlockChange::RecordCalendarError {
                calendar_id,
                error,
                at,
            } => {
                let calendar = self.calendar_mut(property_id, calendar_id)?;
                calendar.last_sync_at = Some(at);
                calendar.last_sync_status = SyncStatus::Error;
                calendar.sync_error = Some(error);
            }
            BlockChange::SetCalendarEnabled {
                calendar_id,
                enabled,
            } => {
                self.calendar_mut(property_id, calendar_id)?.enabled = enabled;
            }
            BlockChange::DeleteCalendar {
                calendar_id,
                delete_blocks,
            } => {
                if delete_blocks {
                    self.blocked
                        .retain(|_, row| row.source_calendar_id != Some(calendar_id));
                } else {
                    for row in self.blocked.values_mut() {
                        if row.source_calendar_id == Some(calendar_id) {
                            row.source_calendar_id = None;
                        }
                    }
                }
                self.calendars
                    .retain(|c| !(c.id == calendar_id && c.property_id == property_id));
            }
            BlockChange::UpsertManual { rows } => {
                for row in dedup_by_date(rows) {
                    self.blocked.insert((row.property_id, row.date), materialize(row));
                }
            }
            BlockChange::RemoveManual { dates } => {
                for date in dates {
                    if self
                        .blocked
                        .get(&(property_id, date))
                        .is_some_and(|row| row.source_calendar_id.is_none())
                    {
                        self.blocked.remove(&(property_id, date));
                    }
                }
            }
        }

        Ok(())
    }
}

#[async_trait::async_trait]
impl EngineStore for MemoryStore {
    async fn property(&self, property_id: Uuid) -> ServiceResult<Option<Property>> {
        Ok(self.state.lock().await.properties.get(&property_id).cloned())
    }

    async fn tariffs(&self, property: &Property) -> ServiceResult<TariffTables> {
        let state = self.state.lock().await;
        Ok(TariffTables {
            year_price: property.year_price,
            seasonal: fill_seasonal_gaps(
                state.seasonal.get(&property.id).cloned().unwrap_or_default(),
            ),
            monthly: state.monthly.get(&property.id).cloned().unwrap_or_default(),
        })
    }

    async fn has_blocked_dates(&self, property_id: Uuid) -> ServiceResult<bool> {
        let state = self.state.lock().await;
        Ok(state
            .blocked
            .range((property_id, NaiveDate::MIN)..=(property_id, NaiveDate::MAX))
            .next()
            .is_some())
    }

    async fn blocked_dates(&self, property_id: Uuid) -> ServiceResult<Vec<BlockedDate>> {
        Ok(self.state.lock().await.rows_of(property_id))
    }

    async fn blocked_dates_between(
        &self,
        property_id: Uuid,
        start: NaiveDate,
        end: NaiveDate,
    ) -> ServiceResult<Vec<BlockedDate>> {
        if end < start {
            return Ok(Vec::new());
        }
        let state = self.state.lock().await;
        Ok(state
            .blocked
            .range((property_id, start)..=(property_id, end))
            .map(|(_, row)| row.clone())
            .collect())
    }

    async fn calendars(&self, property_id: Uuid) -> ServiceResult<Vec<ExternalCalendar>> {
        let state = self.state.lock().await;
        Ok(state
            .calendars
            .iter()
            .filter(|c| c.property_id == property_id)
            .cloned()
            .collect())
    }

    async fn calendar(
        &self,
        property_id: Uuid,
        calendar_id: Uuid,
    ) -> ServiceResult<Option<ExternalCalendar>> {
        let state = self.state.lock().await;
        Ok(state
            .calendars
            .iter()
            .find(|c| c.id == calendar_id && c.property_id == property_id)
            .cloned())
    }

    async fn properties_with_enabled_calendars(&self) -> ServiceResult<Vec<Uuid>> {
        let state = self.state.lock().await;
        let mut ids: Vec<Uuid> = state
            .calendars
            .iter()
            .filter(|c| c.enabled)
            .map(|c| c.property_id)
            .collect();
        ids.sort_unstable();
        ids.dedup();
        Ok(ids)
    }

    async fn feed_by_filename(&self, filename: &str) -> ServiceResult<Option<CalendarFeed>> {
        let state = self.state.lock().await;
        Ok(state
            .feeds
            .values()
            .find(|feed| feed.filename == filename)
            .cloned())
    }

    async fn feed_for_property(&self, property_id: Uuid) -> ServiceResult<Option<CalendarFeed>> {
        Ok(self.state.lock().await.feeds.get(&property_id).cloned())
    }

    async fn apply_changes(
        &self,
        property_id: Uuid,
        changes: Vec<BlockChange>,
        render: FeedRender<'_>,
    ) -> ServiceResult<CalendarFeed> {
        let mut state = self.state.lock().await;
        let mut next = state.clone();

        for change in changes {
            next.apply(property_id, change)?;
        }

        let rendered = render(&next.rows_of(property_id));
        let record = CalendarFeed {
            property_id,
            filename: rendered.filename,
            path: rendered.path,
            feed_url: rendered.feed_url,
            blocked_day_count: rendered.blocked_day_count,
            body: rendered.body,
            generated_at: rendered.generated_at,
        };
        next.feeds.insert(property_id, record.clone());

        if state.fail_next_write {
            state.fail_next_write = false;
            return Err(ServiceError::Other(anyhow::anyhow!("injected write failure")));
        }

        *state = next;
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::RenderedFeed;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn counting_render(rows: &[BlockedDate]) -> RenderedFeed {
        RenderedFeed {
            filename: "property-t.ics".to_string(),
            path: "feeds/property-t.ics".to_string(),
            feed_url: "http://localhost/feeds/property-t.ics".to_string(),
            body: String::new(),
            blocked_day_count: i32::try_from(rows.len()).unwrap(),
            generated_at: Utc::now(),
        }
    }

    fn synced(property_id: Uuid, calendar_id: Uuid, day: NaiveDate) -> NewBlockedDate {
        NewBlockedDate {
            property_id,
            date: day,
            reason: Some("Booked".to_string()),
            source_calendar_id: Some(calendar_id),
            event_uid: None,
            is_check_in: false,
            is_check_out: false,
        }
    }

    #[test_log::test(tokio::test)]
    async fn replace_drops_old_rows_of_calendar_only() {
        let store = MemoryStore::new();
        let property = store.add_property("T", "Test", None).await;
        let calendar = store.add_calendar(property.id, "Airbnb", "https://a", true).await;
        store
            .insert_blocked_date(synced(property.id, calendar.id, date(2025, 3, 1)))
            .await;
        store
            .insert_blocked_date(NewBlockedDate {
                source_calendar_id: None,
                ..synced(property.id, calendar.id, date(2025, 3, 2))
            })
            .await;

        let feed = store
            .apply_changes(
                property.id,
                vec![BlockChange::ReplaceCalendarBlocks {
                    calendar_id: calendar.id,
                    rows: vec![synced(property.id, calendar.id, date(2025, 3, 5))],
                    synced_at: Utc::now(),
                    total_events: 1,
                }],
                &counting_render,
            )
            .await
            .unwrap();

        let dates: Vec<_> = store
            .blocked_dates(property.id)
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.date)
            .collect();
        assert_eq!(dates, vec![date(2025, 3, 2), date(2025, 3, 5)]);
        assert_eq!(feed.blocked_day_count, 2);

        let calendar = store.calendar(property.id, calendar.id).await.unwrap().unwrap();
        assert_eq!(calendar.last_sync_status, SyncStatus::Ok);
        assert_eq!(calendar.total_events, 1);
    }

    #[test_log::test(tokio::test)]
    async fn sync_outcome_of_foreign_calendar_is_rejected() {
        let store = MemoryStore::new();
        let owner = store.add_property("A", "Owner", None).await;
        let other = store.add_property("B", "Other", None).await;
        let calendar = store.add_calendar(owner.id, "Airbnb", "https://a", true).await;

        let result = store
            .apply_changes(
                other.id,
                vec![BlockChange::RecordCalendarError {
                    calendar_id: calendar.id,
                    error: "timeout".to_string(),
                    at: Utc::now(),
                }],
                &counting_render,
            )
            .await;

        assert!(matches!(result, Err(ServiceError::NotFound(_))));
        let calendar = store.calendar(owner.id, calendar.id).await.unwrap().unwrap();
        assert_eq!(calendar.last_sync_status, SyncStatus::Never);
        assert_eq!(calendar.sync_error, None);
    }

    #[test_log::test(tokio::test)]
    async fn failed_write_leaves_state_untouched() {
        let store = MemoryStore::new();
        let property = store.add_property("T", "Test", None).await;
        store.fail_next_write().await;

        let result = store
            .apply_changes(
                property.id,
                vec![BlockChange::UpsertManual {
                    rows: vec![NewBlockedDate {
                        source_calendar_id: None,
                        ..synced(property.id, Uuid::nil(), date(2025, 3, 2))
                    }],
                }],
                &counting_render,
            )
            .await;

        assert!(result.is_err());
        assert!(!store.has_blocked_dates(property.id).await.unwrap());
        assert!(store.feed_for_property(property.id).await.unwrap().is_none());
    }

    #[test_log::test(tokio::test)]
    async fn deleting_calendar_can_keep_rows_as_manual() {
        let store = MemoryStore::new();
        let property = store.add_property("T", "Test", None).await;
        let calendar = store.add_calendar(property.id, "Airbnb", "https://a", true).await;
        store
            .insert_blocked_date(synced(property.id, calendar.id, date(2025, 3, 1)))
            .await;

        store
            .apply_changes(
                property.id,
                vec![BlockChange::DeleteCalendar {
                    calendar_id: calendar.id,
                    delete_blocks: false,
                }],
                &counting_render,
            )
            .await
            .unwrap();

        let rows = store.blocked_dates(property.id).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert!(rows[0].source_calendar_id.is_none());
        assert!(store.calendars(property.id).await.unwrap().is_empty());
    }

    #[test_log::test(tokio::test)]
    async fn unknown_calendar_fails_the_batch() {
        let store = MemoryStore::new();
        let property = store.add_property("T", "Test", None).await;

        let result = store
            .apply_changes(
                property.id,
                vec![BlockChange::SetCalendarEnabled {
                    calendar_id: Uuid::new_v4(),
                    enabled: false,
                }],
                &counting_render,
            )
            .await;

        assert!(matches!(result, Err(ServiceError::NotFound(_))));
    }
}
