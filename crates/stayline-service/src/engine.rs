//! Wiring of every engine service over one store and one feed fetcher.

use std::sync::Arc;

use stayline_core::config::Settings;

use crate::aggregator::CalendarAggregator;
use crate::availability::AvailabilityService;
use crate::calendars::CalendarManager;
use crate::conflicts::ConflictAnalyzer;
use crate::fetcher::FeedFetcher;
use crate::manual::ManualBlockService;
use crate::pricing::PricingResolver;
use crate::publisher::FeedPublisher;
use crate::scheduler::SyncScheduler;
use crate::store::EngineStore;
use crate::sync::CalendarSyncer;

/// All engine services, cheap to clone and shared by request handlers.
#[derive(Clone)]
pub struct Engine {
    pub store: Arc<dyn EngineStore>,
    pub pricing: PricingResolver,
    pub aggregator: CalendarAggregator,
    pub availability: AvailabilityService,
    pub publisher: FeedPublisher,
    pub syncer: CalendarSyncer,
    pub conflicts: ConflictAnalyzer,
    pub calendars: CalendarManager,
    pub manual: ManualBlockService,
    pub scheduler: SyncScheduler,
}

impl Engine {
    #[must_use]
    pub fn new(
        store: Arc<dyn EngineStore>,
        fetcher: Arc<dyn FeedFetcher>,
        settings: &Settings,
    ) -> Self {
        let pricing = PricingResolver::new(store.clone(), settings.pricing.currency.clone());
        let aggregator = CalendarAggregator::new(store.clone());
        let publisher = FeedPublisher::new(
            store.clone(),
            settings.feeds.clone(),
            settings.server.origin(),
        );
        let syncer = CalendarSyncer::new(store.clone(), fetcher.clone(), publisher.clone());

        Self {
            availability: AvailabilityService::new(aggregator.clone(), pricing.clone()),
            conflicts: ConflictAnalyzer::new(store.clone(), fetcher.clone()),
            calendars: CalendarManager::new(store.clone(), fetcher, publisher.clone()),
            manual: ManualBlockService::new(store.clone(), publisher.clone()),
            scheduler: SyncScheduler::new(store.clone(), syncer.clone(), settings.sync.clone()),
            store,
            pricing,
            aggregator,
            publisher,
            syncer,
        }
    }
}
