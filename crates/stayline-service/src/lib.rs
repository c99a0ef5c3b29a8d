//! Pricing, availability and calendar synchronisation services.
//!
//! Every service reads and writes through an [`store::EngineStore`], so the
//! same logic runs against Postgres in production and against
//! [`store::memory::MemoryStore`] in tests.

pub mod aggregator;
pub mod availability;
pub mod calendars;
pub mod conflicts;
pub mod engine;
pub mod error;
pub mod fetcher;
pub mod manual;
pub mod pricing;
pub mod publisher;
pub mod scheduler;
pub mod store;
pub mod sync;
pub mod tariff;

#[cfg(test)]
mod test_support;
