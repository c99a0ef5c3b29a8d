use std::sync::Arc;

use salvo::conn::TcpListener;
use salvo::{Listener, Router};
use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::reload::Handle;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{Registry, fmt, reload};

use stayline_app::app::api::routes;
use stayline_app::engine_handler::EngineHandler;
use stayline_core::config::{Settings, load_config};
use stayline_db::db::connection::create_pool;
use stayline_db::db::migrations::run_migrations;
use stayline_service::engine::Engine;
use stayline_service::fetcher::HttpFeedFetcher;
use stayline_service::store::pg::PgStore;

/// Installs the subscriber at `debug` and returns the handle used to apply
/// the configured level once settings are loaded.
fn init_tracing() -> Handle<EnvFilter, Registry> {
    let (filter_layer, filter_handle) = reload::Layer::new(EnvFilter::new("debug"));

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(
            fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true),
        )
        .init();

    filter_handle
}

fn apply_log_level(handle: &Handle<EnvFilter, Registry>, settings: &Settings) {
    match EnvFilter::try_new(settings.logging.level.as_str()) {
        Ok(filter) => {
            if let Err(error) = handle.modify(|current| *current = filter) {
                tracing::warn!(%error, "Failed to update log filter from config");
            }
        }
        Err(error) => {
            tracing::warn!(level = %settings.logging.level, %error, "Invalid log level in config, keeping debug");
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter_handle = init_tracing();
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "Starting Stayline engine");

    let settings = load_config()?;
    apply_log_level(&filter_handle, &settings);
    tracing::info!(
        server = ?settings.server,
        sync = ?settings.sync,
        feeds = ?settings.feeds,
        pricing = ?settings.pricing,
        "Configuration loaded"
    );

    run_migrations(&settings.database.url).await?;
    let pool = create_pool(&settings.database).await?;

    let engine = Engine::new(
        Arc::new(PgStore::new(pool)),
        Arc::new(HttpFeedFetcher::new(&settings.sync)?),
        &settings,
    );

    let scheduler = engine.scheduler.clone().spawn();
    tracing::info!(
        interval_secs = settings.sync.interval_secs,
        initial_delay_secs = settings.sync.initial_delay_secs,
        "Calendar sync scheduler started"
    );

    let bind_addr = format!("{}:{}", settings.server.host, settings.server.port);
    let acceptor = TcpListener::new(bind_addr.clone()).bind().await;

    let router = Router::new()
        .hoop(EngineHandler { engine })
        .push(routes(&settings.feeds.public_path));

    tracing::info!(%bind_addr, "Server listening");
    salvo::Server::new(acceptor).serve(router).await;

    scheduler.abort();
    Ok(())
}
