//! Periodic sync of every property with an enabled calendar.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval, sleep};
use uuid::Uuid;

use stayline_core::config::SyncConfig;

use crate::error::ServiceResult;
use crate::store::EngineStore;
use crate::sync::{CalendarSyncer, SyncReport};

/// A property whose sync pass failed as a whole.
#[derive(Debug, Clone)]
pub struct SweepFailure {
    pub property_id: Uuid,
    pub error: String,
}

#[derive(Debug, Clone, Default)]
pub struct SweepReport {
    pub reports: Vec<SyncReport>,
    pub failures: Vec<SweepFailure>,
}

impl SweepReport {
    #[must_use]
    pub fn calendar_errors(&self) -> usize {
        self.reports.iter().map(|r| r.errors.len()).sum()
    }
}

#[derive(Clone)]
pub struct SyncScheduler {
    store: Arc<dyn EngineStore>,
    syncer: CalendarSyncer,
    config: SyncConfig,
}

impl SyncScheduler {
    #[must_use]
    pub fn new(store: Arc<dyn EngineStore>, syncer: CalendarSyncer, config: SyncConfig) -> Self {
        Self {
            store,
            syncer,
            config,
        }
    }

    /// ## Summary
    /// Syncs every property with an enabled calendar, one after another with
    /// the configured pause in between. A failing property is recorded and
    /// the sweep moves on.
    ///
    /// ## Errors
    /// Returns an error only if the list of properties cannot be loaded.
    #[tracing::instrument(skip(self))]
    pub async fn run_sweep(&self) -> ServiceResult<SweepReport> {
        let property_ids = self.store.properties_with_enabled_calendars().await?;
        tracing::info!(properties = property_ids.len(), "Calendar sweep started");

        let mut sweep = SweepReport::default();
        for (index, property_id) in property_ids.iter().copied().enumerate() {
            if index > 0 && !self.config.property_delay().is_zero() {
                sleep(self.config.property_delay()).await;
            }

            match self.syncer.sync_property_calendars(property_id).await {
                Ok(report) => sweep.reports.push(report),
                Err(error) => {
                    tracing::error!(%property_id, %error, "Property sync failed");
                    sweep.failures.push(SweepFailure {
                        property_id,
                        error: error.to_string(),
                    });
                }
            }
        }

        tracing::info!(
            synced = sweep.reports.len(),
            failed = sweep.failures.len(),
            calendar_errors = sweep.calendar_errors(),
            "Calendar sweep finished"
        );
        Ok(sweep)
    }

    /// ## Summary
    /// Runs sweeps forever on a background task: once after the initial
    /// delay, then every interval. A slow sweep delays the next one instead
    /// of stacking runs.
    #[must_use]
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(async move {
            sleep(self.config.initial_delay()).await;

            let mut ticker = interval(self.config.interval());
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;
                if let Err(error) = self.run_sweep().await {
                    tracing::error!(%error, "Calendar sweep aborted");
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetcher::FeedError;
    use crate::test_support::{Harness, date, ics};

    fn scheduler(harness: &Harness) -> SyncScheduler {
        SyncScheduler::new(
            harness.shared.clone(),
            CalendarSyncer::new(harness.shared.clone(), harness.fetcher(), harness.publisher.clone()),
            SyncConfig {
                initial_delay_secs: 0,
                property_delay_ms: 0,
                ..SyncConfig::default()
            },
        )
    }

    #[test_log::test(tokio::test)]
    async fn sweep_covers_properties_with_enabled_calendars() {
        let harness = Harness::new();
        let first = harness.store.add_property("VL-1", "Villa One", None).await;
        let second = harness.store.add_property("VL-2", "Villa Two", None).await;
        let idle = harness.store.add_property("VL-3", "Villa Three", None).await;
        harness
            .store
            .add_calendar(first.id, "Airbnb", "https://airbnb/1.ics", true)
            .await;
        harness
            .store
            .add_calendar(second.id, "Booking", "https://booking/2.ics", true)
            .await;
        harness
            .store
            .add_calendar(idle.id, "Paused", "https://paused/3.ics", false)
            .await;
        harness
            .fetcher
            .serve(
                "https://airbnb/1.ics",
                ics(&[("a", date(2025, 1, 10), date(2025, 1, 12), "Reserved")]),
            )
            .await;
        harness
            .fetcher
            .fail("https://booking/2.ics", FeedError::Status(500))
            .await;

        let sweep = scheduler(&harness).run_sweep().await.unwrap();

        assert_eq!(sweep.reports.len(), 2);
        assert!(sweep.failures.is_empty());
        assert_eq!(sweep.calendar_errors(), 1);
        assert!(sweep.reports.iter().all(|r| r.property_id != idle.id));
        assert_eq!(harness.fetcher.request_count(), 2);
    }

    #[test_log::test(tokio::test)]
    async fn spawned_scheduler_runs_first_sweep() {
        let harness = Harness::new();
        let property = harness.store.add_property("VL-1", "Villa One", None).await;
        harness
            .store
            .add_calendar(property.id, "Airbnb", "https://airbnb/1.ics", true)
            .await;
        harness
            .fetcher
            .serve(
                "https://airbnb/1.ics",
                ics(&[("a", date(2025, 1, 10), date(2025, 1, 12), "Reserved")]),
            )
            .await;

        let handle = scheduler(&harness).spawn();
        for _ in 0..50 {
            if harness.store.feed_for_property(property.id).await.unwrap().is_some() {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        }
        handle.abort();

        assert_eq!(harness.store.blocked_dates(property.id).await.unwrap().len(), 2);
    }

    #[test_log::test(tokio::test)]
    async fn zero_interval_keeps_the_sweep_task_alive() {
        let harness = Harness::new();
        let syncer =
            CalendarSyncer::new(harness.shared.clone(), harness.fetcher(), harness.publisher.clone());
        let scheduler = SyncScheduler::new(
            harness.shared.clone(),
            syncer,
            SyncConfig {
                interval_secs: 0,
                initial_delay_secs: 0,
                property_delay_ms: 0,
                ..SyncConfig::default()
            },
        );

        let handle = scheduler.spawn();
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;

        assert!(!handle.is_finished());
        handle.abort();
    }
}
