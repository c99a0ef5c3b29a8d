mod app_specific;
mod feeds;
mod properties;

use salvo::Router;

pub use stayline_core::constants::{
    API_ROUTE_COMPONENT, API_ROUTE_PREFIX, FEED_ROUTE_PREFIX, PROPERTY_ROUTE_COMPONENT,
    PROPERTY_ROUTE_PREFIX,
};

/// ## Summary
/// Constructs the main router: the JSON API under [`API_ROUTE_PREFIX`] and
/// the published feeds under `feed_path`.
#[must_use]
pub fn routes(feed_path: &str) -> Router {
    Router::new()
        .push(
            Router::with_path(API_ROUTE_COMPONENT)
                .push(app_specific::routes())
                .push(properties::routes()),
        )
        .push(feeds::routes(feed_path))
}

#[cfg(test)]
#[path = "api_tests.rs"]
mod tests;
