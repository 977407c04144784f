//! Store Module
//!
//! The capability set every cache driver implements.

use std::collections::HashMap;
use std::time::Duration;

use tracing::warn;

use crate::cache::Value;
use crate::error::Result;

/// TTL used by `add` when the caller does not pass one.
pub const DEFAULT_ADD_TTL: Duration = Duration::from_secs(5);

/// Delta used by `increment`/`decrement` when the caller does not pass one.
pub const DEFAULT_DELTA: i64 = 1;

// == Store Trait ==
/// A key/value cache store.
///
/// Implementations must be safe to call from many threads at once. All
/// operations are synchronous.
pub trait Store: Send + Sync {
    /// Driver name, used in logs.
    fn driver(&self) -> &'static str;

    /// Returns the value if present and valid. An expired entry is removed.
    fn get(&self, key: &str) -> Result<Option<Value>>;

    /// Looks up several keys. The result has one slot per input key, in order.
    fn get_many(&self, keys: &[&str]) -> Result<Vec<Option<Value>>>;

    /// Unconditionally writes `value`, expiring `ttl` from now.
    fn put(&self, key: &str, value: Value, ttl: Duration) -> Result<()>;

    /// Writes every pair with one shared expiry.
    fn put_many(&self, values: HashMap<String, Value>, ttl: Duration) -> Result<()>;

    /// Writes only if the key has no valid entry. Returns whether the write
    /// happened. `None` uses [`DEFAULT_ADD_TTL`].
    fn add(&self, key: &str, value: Value, ttl: Option<Duration>) -> Result<bool>;

    /// Removes and returns the value, or returns `default` when the key has
    /// no valid entry.
    fn pull(&self, key: &str, default: Option<Value>) -> Result<Option<Value>>;

    /// Adds `delta` (default 1) to the counter and returns the new count.
    fn increment(&self, key: &str, delta: Option<i64>) -> Result<i64>;

    /// Subtracts `delta` (default 1) from the counter and returns the new count.
    fn decrement(&self, key: &str, delta: Option<i64>) -> Result<i64>;

    /// Writes an entry that never expires.
    fn forever(&self, key: &str, value: Value) -> Result<()>;

    /// Removes the key. Fails with `NotFound` if there was nothing to remove.
    fn forget(&self, key: &str) -> Result<()>;

    /// Removes every entry.
    fn flush(&self) -> Result<()>;

    /// Namespace prefix this store was configured with.
    fn prefix(&self) -> &str;

    // == Remember ==
    /// Returns the cached value, or computes it with `producer` and caches
    /// it for `ttl`.
    ///
    /// The producer runs without any store lock held, so concurrent callers
    /// may each compute a value; the last write wins.
    fn remember(&self, key: &str, ttl: Duration, producer: &dyn Fn() -> Value) -> Result<Value> {
        if let Some(value) = self.get(key)? {
            return Ok(value);
        }

        let value = producer();
        if let Err(e) = self.put(key, value.clone(), ttl) {
            warn!(driver = self.driver(), key, error = %e, "remember: value put failed");
        }
        Ok(value)
    }

    /// Like [`Store::remember`] but the computed value never expires.
    fn remember_forever(&self, key: &str, producer: &dyn Fn() -> Value) -> Result<Value> {
        if let Some(value) = self.get(key)? {
            return Ok(value);
        }

        let value = producer();
        if let Err(e) = self.forever(key, value.clone()) {
            warn!(driver = self.driver(), key, error = %e, "remember_forever: value put failed");
        }
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CacheError;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Reads always miss and every write is refused.
    #[derive(Default)]
    struct ReadOnlyStore {
        writes: AtomicUsize,
    }

    impl ReadOnlyStore {
        fn refuse(&self) -> Result<()> {
            self.writes.fetch_add(1, Ordering::SeqCst);
            Err(CacheError::Remote("READONLY replica".into()))
        }
    }

    impl Store for ReadOnlyStore {
        fn driver(&self) -> &'static str {
            "read-only"
        }

        fn get(&self, _key: &str) -> Result<Option<Value>> {
            Ok(None)
        }

        fn get_many(&self, keys: &[&str]) -> Result<Vec<Option<Value>>> {
            Ok(vec![None; keys.len()])
        }

        fn put(&self, _key: &str, _value: Value, _ttl: Duration) -> Result<()> {
            self.refuse()
        }

        fn put_many(&self, _values: HashMap<String, Value>, _ttl: Duration) -> Result<()> {
            self.refuse()
        }

        fn add(&self, _key: &str, _value: Value, _ttl: Option<Duration>) -> Result<bool> {
            self.refuse().map(|_| false)
        }

        fn pull(&self, _key: &str, default: Option<Value>) -> Result<Option<Value>> {
            Ok(default)
        }

        fn increment(&self, _key: &str, _delta: Option<i64>) -> Result<i64> {
            self.refuse().map(|_| 0)
        }

        fn decrement(&self, _key: &str, _delta: Option<i64>) -> Result<i64> {
            self.refuse().map(|_| 0)
        }

        fn forever(&self, _key: &str, _value: Value) -> Result<()> {
            self.refuse()
        }

        fn forget(&self, key: &str) -> Result<()> {
            Err(CacheError::NotFound(key.to_string()))
        }

        fn flush(&self) -> Result<()> {
            self.refuse()
        }

        fn prefix(&self) -> &str {
            ""
        }
    }

    #[test]
    fn test_remember_returns_value_when_put_fails() {
        let store = ReadOnlyStore::default();

        let value = store
            .remember("k", Duration::from_secs(5), &|| Value::from("fresh"))
            .unwrap();

        assert_eq!(value, Value::from("fresh"));
        assert_eq!(store.writes.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_remember_forever_returns_value_when_write_fails() {
        let store = ReadOnlyStore::default();

        let value = store.remember_forever("k", &|| Value::Int(7)).unwrap();

        assert_eq!(value, Value::Int(7));
        assert_eq!(store.writes.load(Ordering::SeqCst), 1);
    }
}
