//! Stayline pricing and availability engine - integration test support.
//!
//! Re-exports the workspace crates and builds a complete [`Engine`] over the
//! in-memory store and a scripted feed fetcher, so suites can drive every
//! service end to end without a database or network.

#![expect(
    clippy::expect_used,
    reason = "Fixtures are built from literals and should fail loudly"
)]

use std::path::PathBuf;
use std::sync::Arc;

use chrono::NaiveDate;

use stayline_core::config::{
    DatabaseConfig, FeedConfig, LoggingConfig, PricingConfig, ServerConfig, Settings, SyncConfig,
};
use stayline_core::types::{MonthDay, MonthDayRange};
use stayline_service::engine::Engine;
use stayline_service::fetcher::StaticFeedFetcher;
use stayline_service::store::memory::MemoryStore;
use stayline_service::tariff::SeasonalRate;

pub use stayline_core as core;
pub use stayline_db as db;
pub use stayline_rfc as rfc;
pub use stayline_service as service;

/// Public origin used for feed URLs in tests.
pub const TEST_ORIGIN: &str = "https://stays.example.com";

/// ## Summary
/// Builds a date from a literal.
///
/// ## Panics
/// Panics if the date does not exist.
#[must_use]
pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid fixture date")
}

/// ## Summary
/// Builds a seasonal rate from `MM-DD` bounds.
///
/// ## Panics
/// Panics if a bound is not a valid month-day.
#[must_use]
pub fn season(label: &str, start: &str, end: &str, price_per_night: f64) -> SeasonalRate {
    let start: MonthDay = start.parse().expect("valid start month-day");
    let end: MonthDay = end.parse().expect("valid end month-day");
    SeasonalRate::new(label, MonthDayRange::new(start, end), price_per_night)
}

/// One all-day booking of a scripted upstream feed.
#[derive(Debug, Clone)]
pub struct Booking<'a> {
    pub uid: &'a str,
    pub start: NaiveDate,
    /// Exclusive, as in `DTEND;VALUE=DATE`.
    pub end: NaiveDate,
    pub summary: Option<&'a str>,
}

impl<'a> Booking<'a> {
    #[must_use]
    pub const fn new(uid: &'a str, start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            uid,
            start,
            end,
            summary: None,
        }
    }

    #[must_use]
    pub const fn with_summary(mut self, summary: &'a str) -> Self {
        self.summary = Some(summary);
        self
    }
}

/// ## Summary
/// Renders an upstream feed the way channel managers publish them.
#[must_use]
pub fn upstream_feed(bookings: &[Booking<'_>]) -> String {
    let mut body = String::from(
        "BEGIN:VCALENDAR\r\nVERSION:2.0\r\nPRODID:-//Channel Manager//Bookings//EN\r\nCALSCALE:GREGORIAN\r\n",
    );
    for booking in bookings {
        body.push_str("BEGIN:VEVENT\r\n");
        body.push_str(&format!("UID:{}\r\n", booking.uid));
        body.push_str("DTSTAMP:20250101T000000Z\r\n");
        body.push_str(&format!(
            "DTSTART;VALUE=DATE:{}\r\n",
            booking.start.format("%Y%m%d")
        ));
        body.push_str(&format!("DTEND;VALUE=DATE:{}\r\n", booking.end.format("%Y%m%d")));
        if let Some(summary) = booking.summary {
            body.push_str(&format!("SUMMARY:{summary}\r\n"));
        }
        body.push_str("END:VEVENT\r\n");
    }
    body.push_str("END:VCALENDAR\r\n");
    body
}

/// ## Summary
/// Settings for an engine publishing feeds into `feed_directory`.
#[must_use]
pub fn test_settings(feed_directory: &std::path::Path) -> Settings {
    Settings {
        database: DatabaseConfig {
            url: "postgres://localhost/stayline_test".to_string(),
            max_connections: 1,
        },
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 8698,
            serve_origin: Some(TEST_ORIGIN.to_string()),
        },
        logging: LoggingConfig {
            level: "debug".to_string(),
        },
        sync: SyncConfig {
            initial_delay_secs: 0,
            property_delay_ms: 0,
            ..SyncConfig::default()
        },
        feeds: FeedConfig {
            directory: feed_directory.to_string_lossy().into_owned(),
            ..FeedConfig::default()
        },
        pricing: PricingConfig::default(),
    }
}

/// An engine over in-memory state, with handles to seed it.
pub struct TestEngine {
    pub engine: Engine,
    pub store: MemoryStore,
    pub fetcher: StaticFeedFetcher,
    pub feed_directory: PathBuf,
}

impl TestEngine {
    #[must_use]
    pub fn new() -> Self {
        let feed_directory = std::env::temp_dir()
            .join("stayline-test")
            .join(uuid::Uuid::new_v4().to_string());
        let store = MemoryStore::new();
        let fetcher = StaticFeedFetcher::new();
        let engine = Engine::new(
            Arc::new(store.clone()),
            Arc::new(fetcher.clone()),
            &test_settings(&feed_directory),
        );

        tracing::debug!(feed_directory = %feed_directory.display(), "Test engine created");

        Self {
            engine,
            store,
            fetcher,
            feed_directory,
        }
    }

    /// ## Summary
    /// Reads a published feed file back from disk.
    ///
    /// ## Errors
    /// Returns an error if the file does not exist.
    pub async fn read_feed_file(&self, filename: &str) -> anyhow::Result<String> {
        Ok(tokio::fs::read_to_string(self.feed_directory.join(filename)).await?)
    }
}

impl Default for TestEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for TestEngine {
    fn drop(&mut self) {
        if let Err(error) = std::fs::remove_dir_all(&self.feed_directory) {
            tracing::trace!(%error, "Feed directory not removed");
        }
    }
}
