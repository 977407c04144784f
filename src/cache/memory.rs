//! Memory Store Module
//!
//! In-process cache driver: a lock-guarded HashMap with lazy TTL expiry.
//! Expired entries are only removed when a read observes them.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::cache::{CacheEntry, Clock, Store, SystemClock, Value, DEFAULT_ADD_TTL, DEFAULT_DELTA};
use crate::config::StoreConfig;
use crate::error::{CacheError, Result};

/// Driver kind this store is registered under.
pub const MEMORY_DRIVER: &str = "memory";

// == Memory Store ==
/// Thread-safe in-process cache store.
pub struct MemoryStore {
    /// Key-value storage
    entries: RwLock<HashMap<String, CacheEntry>>,
    /// TTL applied to counters
    default_ttl: Duration,
    /// Namespace prefix (informational, keys are stored raw)
    prefix: String,
    clock: Arc<dyn Clock>,
}

impl MemoryStore {
    // == Constructors ==
    /// Creates a new MemoryStore with the given counter TTL and prefix.
    pub fn new(default_ttl: Duration, prefix: impl Into<String>) -> Self {
        Self::with_clock(default_ttl, prefix, Arc::new(SystemClock))
    }

    /// Creates a MemoryStore that reads time from `clock`.
    pub fn with_clock(
        default_ttl: Duration,
        prefix: impl Into<String>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            default_ttl,
            prefix: prefix.into(),
            clock,
        }
    }

    /// Builds a MemoryStore from a named store configuration.
    pub fn from_config(config: &StoreConfig) -> Self {
        Self::new(config.default_ttl(), config.prefix.clone())
    }

    /// TTL applied to counters.
    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    // == Length ==
    /// Number of entries held, including expired ones nobody has read yet.
    pub fn len(&self) -> usize {
        self.read().len()
    }

    /// Returns true if the store holds no entries.
    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    // Every critical section leaves the map consistent, so a poisoned
    // lock is still safe to use.
    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, CacheEntry>> {
        self.entries.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, CacheEntry>> {
        self.entries.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns the valid value for `key`, evicting it if it has expired.
    fn lookup(
        entries: &mut HashMap<String, CacheEntry>,
        key: &str,
        now: DateTime<Utc>,
    ) -> Option<Value> {
        match entries.get(key) {
            Some(entry) if entry.is_valid_at(now) => Some(entry.value.clone()),
            Some(_) => {
                entries.remove(key);
                debug!(key, "evicted expired entry on read");
                None
            }
            None => None,
        }
    }

    // == Counter ==
    /// Applies `delta` to the counter under a single write lock.
    fn apply_delta(&self, key: &str, delta: i64) -> i64 {
        let now = self.clock.now();
        let mut entries = self.write();

        let (current, forever) = match entries.get(key) {
            Some(entry) if entry.is_valid_at(now) => (entry.value.as_count(), entry.is_forever()),
            _ => (0, false),
        };
        let count = current.saturating_add(delta);

        let entry = if forever {
            CacheEntry::forever(Value::Int(count))
        } else {
            CacheEntry::expiring(Value::Int(count), now, self.default_ttl)
        };
        entries.insert(key.to_string(), entry);

        count
    }
}

impl std::fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryStore")
            .field("entries", &self.len())
            .field("default_ttl", &self.default_ttl)
            .field("prefix", &self.prefix)
            .finish()
    }
}

impl Store for MemoryStore {
    fn driver(&self) -> &'static str {
        MEMORY_DRIVER
    }

    // == Get ==
    fn get(&self, key: &str) -> Result<Option<Value>> {
        let now = self.clock.now();
        let mut entries = self.write();
        Ok(Self::lookup(&mut entries, key, now))
    }

    fn get_many(&self, keys: &[&str]) -> Result<Vec<Option<Value>>> {
        let now = self.clock.now();
        let mut entries = self.write();
        Ok(keys
            .iter()
            .map(|key| Self::lookup(&mut entries, key, now))
            .collect())
    }

    // == Put ==
    fn put(&self, key: &str, value: Value, ttl: Duration) -> Result<()> {
        let entry = CacheEntry::expiring(value, self.clock.now(), ttl);
        self.write().insert(key.to_string(), entry);
        Ok(())
    }

    fn put_many(&self, values: HashMap<String, Value>, ttl: Duration) -> Result<()> {
        let now = self.clock.now();
        let mut entries = self.write();
        for (key, value) in values {
            entries.insert(key, CacheEntry::expiring(value, now, ttl));
        }
        Ok(())
    }

    // == Add ==
    fn add(&self, key: &str, value: Value, ttl: Option<Duration>) -> Result<bool> {
        let now = self.clock.now();
        let mut entries = self.write();

        if entries.get(key).is_some_and(|entry| entry.is_valid_at(now)) {
            return Ok(false);
        }

        let ttl = ttl.unwrap_or(DEFAULT_ADD_TTL);
        entries.insert(key.to_string(), CacheEntry::expiring(value, now, ttl));
        Ok(true)
    }

    // == Pull ==
    fn pull(&self, key: &str, default: Option<Value>) -> Result<Option<Value>> {
        let now = self.clock.now();
        let mut entries = self.write();

        match entries.remove(key) {
            Some(entry) if entry.is_valid_at(now) => Ok(Some(entry.value)),
            _ => Ok(default),
        }
    }

    fn increment(&self, key: &str, delta: Option<i64>) -> Result<i64> {
        Ok(self.apply_delta(key, delta.unwrap_or(DEFAULT_DELTA)))
    }

    fn decrement(&self, key: &str, delta: Option<i64>) -> Result<i64> {
        let delta = delta.unwrap_or(DEFAULT_DELTA);
        Ok(self.apply_delta(key, delta.checked_neg().unwrap_or(i64::MAX)))
    }

    fn forever(&self, key: &str, value: Value) -> Result<()> {
        self.write().insert(key.to_string(), CacheEntry::forever(value));
        Ok(())
    }

    // == Forget ==
    /// An expired entry is dropped as well, but reported as `NotFound`.
    fn forget(&self, key: &str) -> Result<()> {
        let now = self.clock.now();
        match self.write().remove(key) {
            Some(entry) if entry.is_valid_at(now) => Ok(()),
            _ => Err(CacheError::NotFound(key.to_string())),
        }
    }

    fn flush(&self) -> Result<()> {
        let mut entries = self.write();
        let removed = entries.len();
        entries.clear();
        debug!(removed, "memory store flushed");
        Ok(())
    }

    fn prefix(&self) -> &str {
        &self.prefix
    }
}
