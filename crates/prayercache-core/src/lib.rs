//! Core library for prayercache.
//!
//! Fetches a month of prayer times from the Aladhan calendar API, keeps it
//! in a single local cache entry, and decides on every load whether today's
//! times come from that cache or from the network.

pub mod api;
pub mod cache;
pub mod config;
pub mod location;
pub mod models;
pub mod prayer;
pub mod utils;

pub use api::{ApiClient, ApiError, CalendarSource};
pub use cache::CacheManager;
pub use config::Config;
pub use location::{ConfiguredLocator, LocationError, Locator};
pub use prayer::{LoadReport, PrayerTimeClient};

/// The client wired to the real API and the configured locator.
pub type AppClient = PrayerTimeClient<ApiClient, ConfiguredLocator>;

/// Build the client from configuration.
pub fn build_client(config: &Config) -> anyhow::Result<AppClient> {
    let api = ApiClient::with_base_url(&config.api_base_url())?;
    let locator = ConfiguredLocator::from_config(config)?;
    let cache = CacheManager::new(config.cache_dir()?)?;
    tracing::debug!(locator = locator.describe(), method = config.method, "Prayer time client configured");
    Ok(PrayerTimeClient::new(api, locator, cache, config.method))
}
