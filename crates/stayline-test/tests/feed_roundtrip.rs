//! Publishing a property's blocks and reading the feed back.

use std::collections::BTreeSet;

use chrono::NaiveDate;

use stayline_test::rfc::rfc::ical::parse_feed;
use stayline_test::service::store::EngineStore;
use stayline_test::{Booking, TestEngine, date, upstream_feed};

fn expand(events: &[stayline_test::core::types::CalendarEvent]) -> BTreeSet<NaiveDate> {
    events.iter().flat_map(|e| e.occupied_days()).collect()
}

#[test_log::test(tokio::test)]
async fn published_feed_reparses_to_blocked_set() {
    let test = TestEngine::new();
    let property = test.store.add_property("VL-5", "Villa Five", None).await;
    test.fetcher
        .serve(
            "https://airbnb/5.ics",
            upstream_feed(&[
                Booking::new("a", date(2025, 1, 10), date(2025, 1, 13)).with_summary("Reserved"),
                Booking::new("b", date(2025, 1, 13), date(2025, 1, 15)).with_summary("Reserved"),
                Booking::new("c", date(2025, 2, 27), date(2025, 3, 2)),
            ]),
        )
        .await;
    test.engine
        .calendars
        .add_calendar(property.id, "Airbnb", "https://airbnb/5.ics")
        .await
        .unwrap();
    let feed = test
        .engine
        .manual
        .block_dates(
            property.id,
            &[date(2025, 1, 20), date(2025, 1, 21), date(2025, 12, 31)],
            Some("Owner, family; New Year".to_string()),
        )
        .await
        .unwrap();

    let stored: BTreeSet<NaiveDate> = test
        .store
        .blocked_dates(property.id)
        .await
        .unwrap()
        .into_iter()
        .map(|row| row.date)
        .collect();
    let events = parse_feed(&feed.body).unwrap();

    assert_eq!(expand(&events), stored);
    assert_eq!(usize::try_from(feed.blocked_day_count).unwrap(), stored.len());
    assert!(events.iter().any(|e| e.summary.as_deref() == Some("Owner, family; New Year")));
    assert!(events.iter().any(|e| e.summary.as_deref() == Some("Airbnb")));

    let on_disk = test.read_feed_file(&feed.filename).await.unwrap();
    assert_eq!(on_disk, feed.body);
}

#[test_log::test(tokio::test)]
async fn back_to_back_bookings_publish_as_one_event() {
    let test = TestEngine::new();
    let property = test.store.add_property("VL-6", "Villa Six", None).await;
    test.fetcher
        .serve(
            "https://airbnb/6.ics",
            upstream_feed(&[
                Booking::new("a", date(2025, 1, 10), date(2025, 1, 13)).with_summary("Reserved"),
                Booking::new("b", date(2025, 1, 13), date(2025, 1, 15)).with_summary("Reserved"),
            ]),
        )
        .await;

    let added = test
        .engine
        .calendars
        .add_calendar(property.id, "Airbnb", "https://airbnb/6.ics")
        .await
        .unwrap();

    let events = parse_feed(&added.feed.body).unwrap();
    let spans: Vec<_> = events.iter().map(|e| (e.start, e.end)).collect();
    assert_eq!(spans, vec![(date(2025, 1, 10), date(2025, 1, 15))]);
    assert_eq!(events[0].uid.as_deref(), Some("VL-6-1-20250110"));
}

#[test_log::test(tokio::test)]
async fn stored_feed_is_found_by_filename() {
    let test = TestEngine::new();
    let property = test.store.add_property("VL-7", "Villa Seven", None).await;

    let feed = test.engine.publisher.regenerate(property.id).await.unwrap();

    assert_eq!(
        feed.feed_url,
        format!("https://stays.example.com/feeds/{}", feed.filename)
    );
    let found = test.store.feed_by_filename(&feed.filename).await.unwrap();
    assert_eq!(found.map(|f| f.property_id), Some(property.id));
    assert!(parse_feed(&feed.body).unwrap().is_empty());
}

#[test_log::test(tokio::test)]
async fn numbers_sharing_a_slug_get_their_own_feeds() {
    let test = TestEngine::new();
    let first = test.store.add_property("VL-7", "Villa Seven", None).await;
    let second = test.store.add_property("vl 7", "Villa Seven Annex", None).await;

    let first_feed = test
        .engine
        .manual
        .block_dates(first.id, &[date(2025, 5, 1)], None)
        .await
        .unwrap();
    let second_feed = test
        .engine
        .manual
        .block_dates(second.id, &[date(2025, 6, 1)], None)
        .await
        .unwrap();

    assert_ne!(first_feed.filename, second_feed.filename);
    for (property_id, feed) in [(first.id, &first_feed), (second.id, &second_feed)] {
        let found = test.store.feed_by_filename(&feed.filename).await.unwrap();
        assert_eq!(found.map(|f| f.property_id), Some(property_id));
        let on_disk = test.read_feed_file(&feed.filename).await.unwrap();
        assert_eq!(on_disk, feed.body);
    }
}
