//! Shared fixtures for unit tests.

use std::sync::Arc;

use chrono::NaiveDate;

use stayline_core::config::FeedConfig;

use crate::fetcher::StaticFeedFetcher;
use crate::publisher::FeedPublisher;
use crate::store::EngineStore;
use crate::store::memory::MemoryStore;

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Builds a feed with one all-day event per `(uid, start, end, summary)`.
pub fn ics(events: &[(&str, NaiveDate, NaiveDate, &str)]) -> String {
    let mut body = String::from("BEGIN:VCALENDAR\r\nVERSION:2.0\r\nPRODID:-//Upstream//EN\r\n");
    for (uid, start, end, summary) in events {
        body.push_str(&format!(
            "BEGIN:VEVENT\r\nUID:{uid}\r\nDTSTART;VALUE=DATE:{}\r\nDTEND;VALUE=DATE:{}\r\nSUMMARY:{summary}\r\nEND:VEVENT\r\n",
            start.format("%Y%m%d"),
            end.format("%Y%m%d"),
        ));
    }
    body.push_str("END:VCALENDAR\r\n");
    body
}

pub struct Harness {
    pub store: MemoryStore,
    pub shared: Arc<dyn EngineStore>,
    pub fetcher: StaticFeedFetcher,
    pub publisher: FeedPublisher,
}

impl Harness {
    pub fn new() -> Self {
        let store = MemoryStore::new();
        let shared: Arc<dyn EngineStore> = Arc::new(store.clone());
        let directory = std::env::temp_dir()
            .join("stayline-unit")
            .join(uuid::Uuid::new_v4().to_string());
        let publisher = FeedPublisher::new(
            shared.clone(),
            FeedConfig {
                directory: directory.to_string_lossy().into_owned(),
                public_path: "/feeds".to_string(),
            },
            "http://localhost:8698",
        );
        Self {
            store,
            shared,
            fetcher: StaticFeedFetcher::new(),
            publisher,
        }
    }

    pub fn fetcher(&self) -> Arc<dyn crate::fetcher::FeedFetcher> {
        Arc::new(self.fetcher.clone())
    }
}
