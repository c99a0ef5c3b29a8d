/// Route component constants shared across crates
pub const API_ROUTE_COMPONENT: &str = "api";
pub const API_ROUTE_PREFIX: &str = const_str::concat!("/", API_ROUTE_COMPONENT);

pub const PROPERTY_ROUTE_COMPONENT: &str = "properties";
pub const PROPERTY_ROUTE_PREFIX: &str =
    const_str::concat!(API_ROUTE_PREFIX, "/", PROPERTY_ROUTE_COMPONENT);

/// Default mount point of published outbound calendar feeds.
pub const FEED_ROUTE_COMPONENT: &str = "feeds";
pub const FEED_ROUTE_PREFIX: &str = const_str::concat!("/", FEED_ROUTE_COMPONENT);

/// Currency every quote is expressed in.
pub const DEFAULT_CURRENCY: &str = "THB";

/// `PRODID` of every calendar this service publishes.
pub const FEED_PRODID: &str = "-//Stayline//Pricing and Availability Engine//EN";

/// Label used when a blocked date carries no reason.
pub const DEFAULT_BLOCK_REASON: &str = "Blocked";
