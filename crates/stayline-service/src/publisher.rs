//! Outbound calendar feed of a property.
//!
//! The feed lists every blocked date of the property, consecutive days with
//! the same reason folded into one all-day event. It is regenerated inside
//! the write transaction of every change and mirrored to a file afterwards.

use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};

use stayline_core::config::FeedConfig;
use stayline_core::constants::{DEFAULT_BLOCK_REASON, FEED_PRODID};
use stayline_core::util::slug::feed_filename;
use stayline_db::model::blocked_date::BlockedDate;
use stayline_db::model::feed::CalendarFeed;
use stayline_db::model::property::Property;
use stayline_rfc::rfc::ical::core::{DateTime as IcalDateTime, names};
use stayline_rfc::rfc::ical::{Component, ICalendar, Property as IcalProperty, serialize};

use crate::error::{ServiceError, ServiceResult};
use crate::store::{BlockChange, EngineStore, RenderedFeed};

/// Consecutive blocked days published as one event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockSpan {
    pub start: NaiveDate,
    /// Day after the last blocked day.
    pub end: NaiveDate,
    pub reason: String,
}

/// ## Summary
/// Folds date-ordered rows into spans. A span breaks on a gap or on a change
/// of reason; back-to-back bookings with the same reason share one span.
#[must_use]
pub fn group_spans(rows: &[BlockedDate]) -> Vec<BlockSpan> {
    let mut spans: Vec<BlockSpan> = Vec::new();

    for row in rows {
        let reason = row.reason.as_deref().unwrap_or(DEFAULT_BLOCK_REASON);
        let next = row.date.succ_opt().unwrap_or(row.date);

        match spans.last_mut() {
            Some(span) if span.end == row.date && span.reason == reason => {
                span.end = next;
            }
            _ => spans.push(BlockSpan {
                start: row.date,
                end: next,
                reason: reason.to_string(),
            }),
        }
    }

    spans
}

/// ## Summary
/// Builds the outbound calendar of a property from its spans.
///
/// Event UIDs are `{property_number}-{index}-{YYYYMMDD}` with a one-based
/// index and the first blocked day.
#[must_use]
pub fn build_calendar(property: &Property, spans: &[BlockSpan], stamp: DateTime<Utc>) -> ICalendar {
    let mut ical = ICalendar::new(FEED_PRODID);
    ical.root.add_property(IcalProperty::text(names::CALSCALE, "GREGORIAN"));
    ical.root.add_property(IcalProperty::text(names::METHOD, "PUBLISH"));
    ical.root.add_property(IcalProperty::text(
        names::CALNAME,
        format!("{} ({})", property.name, property.property_number),
    ));

    let dtstamp = IcalDateTime::utc(stamp.date_naive(), stamp.time());
    for (index, span) in spans.iter().enumerate() {
        let mut event = Component::event();
        event.add_property(IcalProperty::text(
            names::UID,
            format!(
                "{}-{}-{}",
                property.property_number,
                index + 1,
                span.start.format("%Y%m%d")
            ),
        ));
        event.add_property(IcalProperty::datetime(names::DTSTAMP, dtstamp.clone()));
        event.add_property(IcalProperty::date(names::DTSTART, span.start));
        event.add_property(IcalProperty::date(names::DTEND, span.end));
        event.add_property(IcalProperty::text(names::SUMMARY, span.reason.clone()));
        event.add_property(IcalProperty::text(names::DESCRIPTION, span.reason.clone()));
        event.add_property(IcalProperty::text(names::STATUS, "CONFIRMED"));
        event.add_property(IcalProperty::text(names::TRANSP, "OPAQUE"));
        ical.add_event(event);
    }

    ical
}

/// Regenerates, stores and writes out property feeds.
#[derive(Clone)]
pub struct FeedPublisher {
    store: Arc<dyn EngineStore>,
    feeds: FeedConfig,
    origin: String,
}

impl FeedPublisher {
    #[must_use]
    pub fn new(store: Arc<dyn EngineStore>, feeds: FeedConfig, origin: impl Into<String>) -> Self {
        Self {
            store,
            feeds,
            origin: origin.into(),
        }
    }

    /// ## Summary
    /// Renders the feed of a property from all of its blocked dates.
    #[must_use]
    pub fn render(
        &self,
        property: &Property,
        rows: &[BlockedDate],
        generated_at: DateTime<Utc>,
    ) -> RenderedFeed {
        let filename = feed_filename(&property.property_number, property.id);
        let spans = group_spans(rows);
        let body = serialize(&build_calendar(property, &spans, generated_at));

        RenderedFeed {
            path: Path::new(&self.feeds.directory)
                .join(&filename)
                .to_string_lossy()
                .into_owned(),
            feed_url: self.feeds.public_url(&self.origin, &filename),
            filename,
            body,
            blocked_day_count: i32::try_from(rows.len()).unwrap_or(i32::MAX),
            generated_at,
        }
    }

    /// ## Summary
    /// Applies `changes` and the regenerated feed in one store transaction,
    /// then writes the feed file.
    ///
    /// A failed file write is logged; the stored feed stays authoritative.
    ///
    /// ## Errors
    /// Returns an error if the store rejects the batch.
    #[tracing::instrument(skip(self, property, changes), fields(
        property_id = %property.id,
        change_count = changes.len()
    ))]
    pub async fn commit(
        &self,
        property: &Property,
        changes: Vec<BlockChange>,
    ) -> ServiceResult<CalendarFeed> {
        let generated_at = Utc::now();
        let render = |rows: &[BlockedDate]| self.render(property, rows, generated_at);

        let feed = self
            .store
            .apply_changes(property.id, changes, &render)
            .await?;

        if let Err(error) = Self::write_file(&feed).await {
            tracing::error!(path = %feed.path, %error, "Failed to write feed file");
        }

        tracing::info!(
            feed_url = %feed.feed_url,
            blocked_days = feed.blocked_day_count,
            "Feed published"
        );
        Ok(feed)
    }

    /// ## Summary
    /// Regenerates the feed of a property without changing its blocks.
    ///
    /// ## Errors
    /// Returns `NotFound` for an unknown property, or a store error.
    pub async fn regenerate(&self, property_id: uuid::Uuid) -> ServiceResult<CalendarFeed> {
        let property = self
            .store
            .property(property_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("property {property_id}")))?;
        self.commit(&property, Vec::new()).await
    }

    /// ## Summary
    /// Writes the feed body to its path, replacing the previous file
    /// atomically.
    ///
    /// ## Errors
    /// Returns an I/O error if the directory or file cannot be written.
    pub async fn write_file(feed: &CalendarFeed) -> ServiceResult<()> {
        let path = Path::new(&feed.path);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let tmp = path.with_extension("ics.tmp");
        tokio::fs::write(&tmp, feed.body.as_bytes()).await?;
        tokio::fs::rename(&tmp, path).await?;
        Ok(())
    }
}
