//! Double-booking detection across external calendars.
//!
//! Works on live feed contents rather than stored rows, so it also catches
//! overlaps the last-writer-wins upsert would hide.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;
use uuid::Uuid;

use crate::error::ServiceResult;
use crate::fetcher::{FeedFetcher, fetch_events};
use crate::store::EngineStore;

/// One calendar's booking on a conflicting date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConflictEntry {
    pub calendar_id: Uuid,
    pub calendar_name: String,
    pub summary: Option<String>,
    pub event_start: NaiveDate,
    /// Exclusive end of the event.
    pub event_end: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DateConflict {
    pub date: NaiveDate,
    pub entries: Vec<ConflictEntry>,
}

/// A requested calendar that could not be analysed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConflictSkip {
    pub calendar_id: Uuid,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConflictReport {
    /// Conflicting dates in ascending order.
    pub conflicts: Vec<DateConflict>,
    pub total_conflicts: usize,
    pub calendars_analyzed: usize,
    pub skipped: Vec<ConflictSkip>,
}

#[derive(Clone)]
pub struct ConflictAnalyzer {
    store: Arc<dyn EngineStore>,
    fetcher: Arc<dyn FeedFetcher>,
}

impl ConflictAnalyzer {
    #[must_use]
    pub fn new(store: Arc<dyn EngineStore>, fetcher: Arc<dyn FeedFetcher>) -> Self {
        Self { store, fetcher }
    }

    /// ## Summary
    /// Fetches the requested calendars and lists every date booked by two or
    /// more of them.
    ///
    /// Fewer than two distinct calendars trivially have no conflicts and
    /// are not fetched. Calendars that are unknown or whose feed fails are
    /// listed in `skipped`.
    ///
    /// ## Errors
    /// Returns an error if the store fails.
    #[tracing::instrument(skip(self, calendar_ids), fields(%property_id, requested = calendar_ids.len()))]
    pub async fn analyze_calendar_conflicts(
        &self,
        property_id: Uuid,
        calendar_ids: &[Uuid],
    ) -> ServiceResult<ConflictReport> {
        let mut seen = BTreeSet::new();
        let ids: Vec<Uuid> = calendar_ids
            .iter()
            .copied()
            .filter(|id| seen.insert(*id))
            .collect();

        if ids.len() < 2 {
            return Ok(ConflictReport {
                calendars_analyzed: ids.len(),
                ..ConflictReport::default()
            });
        }

        let mut by_date: BTreeMap<NaiveDate, Vec<ConflictEntry>> = BTreeMap::new();
        let mut analyzed = 0;
        let mut skipped = Vec::new();

        for calendar_id in ids {
            let Some(calendar) = self.store.calendar(property_id, calendar_id).await? else {
                skipped.push(ConflictSkip {
                    calendar_id,
                    reason: "calendar not found".to_string(),
                });
                continue;
            };

            let events = match fetch_events(self.fetcher.as_ref(), &calendar.feed_url).await {
                Ok(events) => events,
                Err(error) => {
                    tracing::warn!(%calendar_id, %error, "Skipping calendar in conflict analysis");
                    skipped.push(ConflictSkip {
                        calendar_id,
                        reason: error.to_string(),
                    });
                    continue;
                }
            };
            analyzed += 1;

            for event in &events {
                for day in event.occupied_days() {
                    by_date.entry(day).or_default().push(ConflictEntry {
                        calendar_id,
                        calendar_name: calendar.name.clone(),
                        summary: event.summary.clone(),
                        event_start: event.start,
                        event_end: event.end,
                    });
                }
            }
        }

        let conflicts: Vec<DateConflict> = by_date
            .into_iter()
            .filter(|(_, entries)| {
                entries
                    .iter()
                    .map(|e| e.calendar_id)
                    .collect::<BTreeSet<_>>()
                    .len()
                    >= 2
            })
            .map(|(date, entries)| DateConflict { date, entries })
            .collect();

        tracing::info!(conflicts = conflicts.len(), analyzed, "Conflict analysis finished");

        Ok(ConflictReport {
            total_conflicts: conflicts.len(),
            conflicts,
            calendars_analyzed: analyzed,
            skipped,
        })
    }
}
