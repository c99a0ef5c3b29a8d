//! Tests for configuration module.

use super::*;

#[test_log::test]
fn sync_defaults_match_polling_cadence() {
    tracing::debug!("Checking sync defaults");

    let sync = SyncConfig::default();

    assert_eq!(sync.interval(), Duration::from_secs(15 * 60));
    assert_eq!(sync.fetch_timeout(), Duration::from_secs(15));
    assert_eq!(sync.property_delay(), Duration::from_millis(2000));
    assert!(sync.user_agent.starts_with("Stayline-CalendarSync/"));
}

#[test]
fn zero_sync_interval_is_raised_to_one_second() {
    let sync = SyncConfig {
        interval_secs: 0,
        ..SyncConfig::default()
    };

    assert_eq!(sync.interval(), Duration::from_secs(1));
}

#[test]
fn server_origin_prefers_explicit_value() {
    let server = ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 8698,
        serve_origin: Some("https://stays.example.com/".to_string()),
    };

    assert_eq!(server.origin(), "https://stays.example.com");
}

#[test]
fn server_origin_falls_back_to_bind_address() {
    let server = ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 8698,
        serve_origin: None,
    };

    assert_eq!(server.origin(), "http://127.0.0.1:8698");
}

#[test]
fn feed_public_url_joins_segments() {
    let feeds = FeedConfig {
        directory: "/var/lib/stayline/feeds".to_string(),
        public_path: "/feeds/".to_string(),
    };

    assert_eq!(
        feeds.public_url("https://stays.example.com/", "property-vl-7.ics"),
        "https://stays.example.com/feeds/property-vl-7.ics"
    );
}

#[test]
fn settings_debug_lists_sections() {
    let settings = Settings {
        database: DatabaseConfig {
            url: "postgresql://test".to_string(),
            max_connections: 8,
        },
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 8698,
            serve_origin: None,
        },
        logging: LoggingConfig {
            level: "info".to_string(),
        },
        sync: SyncConfig::default(),
        feeds: FeedConfig::default(),
        pricing: PricingConfig::default(),
    };

    let debug_str = format!("{settings:?}");
    assert!(debug_str.contains("database"));
    assert!(debug_str.contains("sync"));
    assert_eq!(settings.pricing.currency, "THB");
}
