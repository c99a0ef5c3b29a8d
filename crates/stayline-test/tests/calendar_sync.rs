//! External calendars feeding availability, conflicts and the sweep.

use uuid::Uuid;

use stayline_test::db::db::enums::SyncStatus;
use stayline_test::db::model::blocked_date::BlockedDate;
use stayline_test::service::error::ServiceError;
use stayline_test::service::fetcher::FeedError;
use stayline_test::service::store::EngineStore;
use stayline_test::{Booking, TestEngine, date, season, upstream_feed};

type RowKey = (chrono::NaiveDate, Option<Uuid>, Option<String>, bool, bool);

fn row_keys(rows: &[BlockedDate]) -> Vec<RowKey> {
    rows.iter()
        .map(|r| (r.date, r.source_calendar_id, r.event_uid.clone(), r.is_check_in, r.is_check_out))
        .collect()
}

#[test_log::test(tokio::test)]
async fn synced_bookings_block_availability_and_windows() {
    let test = TestEngine::new();
    let property = test.store.add_property("VL-1", "Villa One", None).await;
    test.store
        .add_seasonal_rate(property.id, season("All year", "01-01", "12-31", 2_000.0))
        .await;
    test.fetcher
        .serve(
            "https://airbnb/1.ics",
            upstream_feed(&[Booking::new("a", date(2025, 3, 5), date(2025, 3, 8))]),
        )
        .await;
    test.engine
        .calendars
        .add_calendar(property.id, "Airbnb", "https://airbnb/1.ics")
        .await
        .unwrap();

    let overlapping = test
        .engine
        .availability
        .check_availability(property.id, date(2025, 3, 7), date(2025, 3, 10), 0)
        .await
        .unwrap();
    assert!(!overlapping.available);
    assert_eq!(overlapping.blocked_dates, vec![date(2025, 3, 7)]);

    let after = test
        .engine
        .availability
        .check_availability(property.id, date(2025, 3, 9), date(2025, 3, 12), 0)
        .await
        .unwrap();
    assert!(after.available);

    let windows = test
        .engine
        .availability
        .find_windows(property.id, 2, date(2025, 3, 1), date(2025, 3, 12))
        .await
        .unwrap();
    for window in &windows {
        let check = test
            .engine
            .availability
            .check_availability(property.id, window.check_in, window.check_out, 0)
            .await
            .unwrap();
        assert!(check.available, "window {window:?} is not available");
        assert_eq!(window.price.total_price, 4_000);
    }
    let check_ins: Vec<_> = windows.iter().map(|w| w.check_in).collect();
    assert_eq!(
        check_ins,
        vec![date(2025, 3, 1), date(2025, 3, 2), date(2025, 3, 8), date(2025, 3, 9), date(2025, 3, 10)]
    );
}

#[test_log::test(tokio::test)]
async fn two_calendars_sharing_a_night_conflict_once() {
    let test = TestEngine::new();
    let property = test.store.add_property("VL-2", "Villa Two", None).await;
    test.fetcher
        .serve(
            "https://airbnb/2.ics",
            upstream_feed(&[Booking::new("a", date(2025, 1, 7), date(2025, 1, 11)).with_summary("Guest A")]),
        )
        .await;
    test.fetcher
        .serve(
            "https://booking/2.ics",
            upstream_feed(&[Booking::new("b", date(2025, 1, 10), date(2025, 1, 14)).with_summary("Guest B")]),
        )
        .await;
    let airbnb = test
        .engine
        .calendars
        .add_calendar(property.id, "Airbnb", "https://airbnb/2.ics")
        .await
        .unwrap();
    let booking = test
        .engine
        .calendars
        .add_calendar(property.id, "Booking.com", "https://booking/2.ics")
        .await
        .unwrap();

    let report = test
        .engine
        .conflicts
        .analyze_calendar_conflicts(property.id, &[airbnb.calendar.id, booking.calendar.id])
        .await
        .unwrap();

    assert_eq!(report.total_conflicts, 1);
    assert_eq!(report.conflicts[0].date, date(2025, 1, 10));
    let names: Vec<_> = report.conflicts[0]
        .entries
        .iter()
        .map(|e| e.calendar_name.as_str())
        .collect();
    assert_eq!(names, vec!["Airbnb", "Booking.com"]);

    // The later calendar owns the shared night.
    let rows = test.store.blocked_dates(property.id).await.unwrap();
    let shared = rows.iter().find(|r| r.date == date(2025, 1, 10)).unwrap();
    assert_eq!(shared.source_calendar_id, Some(booking.calendar.id));
}

#[test_log::test(tokio::test)]
async fn resync_is_stable_and_tracks_upstream_changes() {
    let test = TestEngine::new();
    let property = test.store.add_property("VL-3", "Villa Three", None).await;
    test.fetcher
        .serve(
            "https://airbnb/3.ics",
            upstream_feed(&[
                Booking::new("a", date(2025, 4, 1), date(2025, 4, 4)),
                Booking::new("b", date(2025, 5, 1), date(2025, 5, 3)),
            ]),
        )
        .await;
    let added = test
        .engine
        .calendars
        .add_calendar(property.id, "Airbnb", "https://airbnb/3.ics")
        .await
        .unwrap();
    let before = test.store.blocked_dates(property.id).await.unwrap();

    let report = test.engine.syncer.sync_property_calendars(property.id).await.unwrap();
    let after = test.store.blocked_dates(property.id).await.unwrap();

    assert!(report.success);
    assert_eq!(report.total_events, 2);
    assert_eq!(row_keys(&before), row_keys(&after));

    test.fetcher
        .serve(
            "https://airbnb/3.ics",
            upstream_feed(&[Booking::new("b", date(2025, 5, 1), date(2025, 5, 3))]),
        )
        .await;
    let report = test.engine.syncer.sync_property_calendars(property.id).await.unwrap();

    assert_eq!(report.blocked_day_count, 2);
    let calendar = test
        .store
        .calendar(property.id, added.calendar.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(calendar.total_events, 1);
    assert_eq!(calendar.last_sync_status, SyncStatus::Ok);
}

#[test_log::test(tokio::test)]
async fn sweep_isolates_failing_feeds() {
    let test = TestEngine::new();
    let healthy = test.store.add_property("VL-4", "Villa Four", None).await;
    let flaky = test.store.add_property("VL-5", "Villa Five", None).await;
    test.fetcher
        .serve(
            "https://airbnb/4.ics",
            upstream_feed(&[Booking::new("a", date(2025, 6, 1), date(2025, 6, 3))]),
        )
        .await;
    test.fetcher
        .serve(
            "https://airbnb/5.ics",
            upstream_feed(&[Booking::new("a", date(2025, 6, 10), date(2025, 6, 12))]),
        )
        .await;
    test.engine
        .calendars
        .add_calendar(healthy.id, "Airbnb", "https://airbnb/4.ics")
        .await
        .unwrap();
    let flaky_calendar = test
        .engine
        .calendars
        .add_calendar(flaky.id, "Airbnb", "https://airbnb/5.ics")
        .await
        .unwrap();
    test.fetcher.fail("https://airbnb/5.ics", FeedError::Timeout).await;

    let sweep = test.engine.scheduler.run_sweep().await.unwrap();

    assert_eq!(sweep.reports.len(), 2);
    assert!(sweep.failures.is_empty());
    assert_eq!(sweep.calendar_errors(), 1);
    let flaky_calendar = test
        .store
        .calendar(flaky.id, flaky_calendar.calendar.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(flaky_calendar.last_sync_status, SyncStatus::Error);
    assert_eq!(flaky_calendar.sync_error.as_deref(), Some("request timed out"));
    assert_eq!(test.store.blocked_dates(flaky.id).await.unwrap().len(), 2);
}

#[test_log::test(tokio::test)]
async fn failed_validation_leaves_property_untouched() {
    let test = TestEngine::new();
    let property = test.store.add_property("VL-6", "Villa Six", None).await;
    test.fetcher
        .serve("https://airbnb/6.ics", "this is not a calendar")
        .await;

    let result = test
        .engine
        .calendars
        .add_calendar(property.id, "Airbnb", "https://airbnb/6.ics")
        .await;

    assert!(matches!(result, Err(ServiceError::ValidationError(_))));
    assert!(test.store.calendars(property.id).await.unwrap().is_empty());
    assert!(test.store.feed_for_property(property.id).await.unwrap().is_none());
}
