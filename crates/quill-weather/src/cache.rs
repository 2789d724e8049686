//! In-memory snapshot cache with per-entry expiry.
//!
//! Expired entries are kept rather than dropped: `get` stops returning them,
//! but `get_stale` and `lookup` still see them so callers can fall back to old
//! data when the provider is down. Entries only disappear through `evict` or
//! an overwrite.

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use crate::types::WeatherSnapshot;

/// Source of "now" for expiry checks.
pub trait Clock: Send + Sync + std::fmt::Debug {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock that only moves when told to. Used by tests.
#[derive(Debug)]
pub struct ManualClock {
    now: RwLock<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: RwLock::new(start),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.write();
        if let Some(next) = chrono::Duration::from_std(by)
            .ok()
            .and_then(|d| now.checked_add_signed(d))
        {
            *now = next;
        }
    }

    pub fn set(&self, to: DateTime<Utc>) {
        *self.now.write() = to;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new(Utc::now())
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.read()
    }
}

/// A stored snapshot and its expiry metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    pub value: WeatherSnapshot,
    pub stored_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl CacheEntry {
    /// An entry expires once `now > expires_at`.
    pub fn is_fresh_at(&self, now: DateTime<Utc>) -> bool {
        now <= self.expires_at
    }
}

/// Result of a single cache read.
#[derive(Debug, Clone, PartialEq)]
pub enum CacheLookup {
    Fresh(WeatherSnapshot),
    Stale(CacheEntry),
    Miss,
}

impl CacheLookup {
    /// The stored value regardless of freshness.
    pub fn into_value(self) -> Option<WeatherSnapshot> {
        match self {
            Self::Fresh(value) => Some(value),
            Self::Stale(entry) => Some(entry.value),
            Self::Miss => None,
        }
    }
}

/// Key-value snapshot store shared by the read path and the refresh task.
///
/// Implementations must be safe for concurrent use. Writes are whole-value
/// overwrites; the last write wins.
pub trait SnapshotStore: Send + Sync {
    /// Fresh value only; `None` once the entry has expired.
    fn get(&self, key: &str) -> Option<WeatherSnapshot> {
        match self.lookup(key) {
            CacheLookup::Fresh(value) => Some(value),
            CacheLookup::Stale(_) | CacheLookup::Miss => None,
        }
    }

    /// Whatever is stored under `key`, expired or not.
    fn get_stale(&self, key: &str) -> Option<CacheEntry>;

    /// Value plus freshness in one read.
    fn lookup(&self, key: &str) -> CacheLookup;

    /// Store `value` under `key`, replacing any previous entry.
    fn put(&self, key: &str, value: WeatherSnapshot, ttl: Duration);

    /// Remove the entry. Returns whether one existed.
    fn evict(&self, key: &str) -> bool;
}

/// `SnapshotStore` backed by a locked `HashMap`.
#[derive(Debug)]
pub struct WeatherCache {
    entries: RwLock<HashMap<String, CacheEntry>>,
    clock: Arc<dyn Clock>,
}

impl WeatherCache {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            clock,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl Default for WeatherCache {
    fn default() -> Self {
        Self::new()
    }
}

impl SnapshotStore for WeatherCache {
    fn get_stale(&self, key: &str) -> Option<CacheEntry> {
        self.entries.read().get(key).cloned()
    }

    fn lookup(&self, key: &str) -> CacheLookup {
        let now = self.clock.now();
        match self.entries.read().get(key) {
            Some(entry) if entry.is_fresh_at(now) => CacheLookup::Fresh(entry.value.clone()),
            Some(entry) => CacheLookup::Stale(entry.clone()),
            None => CacheLookup::Miss,
        }
    }

    fn put(&self, key: &str, value: WeatherSnapshot, ttl: Duration) {
        let now = self.clock.now();
        // Out-of-range TTLs saturate instead of wrapping into the past
        let expires_at = chrono::Duration::from_std(ttl)
            .ok()
            .and_then(|d| now.checked_add_signed(d))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);

        let entry = CacheEntry {
            value,
            stored_at: now,
            expires_at,
        };
        self.entries.write().insert(key.to_string(), entry);
        tracing::debug!(key, %expires_at, "Cache entry stored");
    }

    fn evict(&self, key: &str) -> bool {
        self.entries.write().remove(key).is_some()
    }
}
