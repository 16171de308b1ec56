pub mod client;
pub mod collector;
pub mod error;
pub mod extract;
pub mod sites;

pub use client::ProxyClient;
pub use collector::{Collector, CollectorConfig};
pub use error::ScraperError;
pub use extract::extract_listings;
pub use sites::{ExtractionRule, SiteProfile};
