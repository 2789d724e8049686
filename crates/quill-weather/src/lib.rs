//! Weather subsystem for Quill
//!
//! Fetches current conditions from WeatherAPI.com, caches the last good
//! snapshot, and degrades to stale data when the provider is unavailable.

pub mod cache;
pub mod provider;
pub mod refresh;
pub mod service;
pub mod types;

pub use cache::{
    CacheEntry, CacheLookup, Clock, ManualClock, SnapshotStore, SystemClock, WeatherCache,
};
pub use provider::WeatherProvider;
pub use refresh::{RefreshOutcome, RefreshTask};
pub use service::{WeatherService, CACHE_KEY, DEFAULT_CACHE_TTL};
pub use types::*;
