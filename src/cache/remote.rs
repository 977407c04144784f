//! Remote Store Module
//!
//! Cache driver that forwards every operation to an external key/value
//! service. Keys are namespaced with the configured prefix before they
//! leave the process; consistency and expiry are the service's job.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use crate::cache::{driver_fn, DriverConstructor, Store, Value, DEFAULT_ADD_TTL, DEFAULT_DELTA};
use crate::config::StoreConfig;
use crate::error::{CacheError, Result};

/// Driver kind the remote store is registered under.
pub const REMOTE_DRIVER: &str = "remote";

/// Connection name used when a store config does not name one.
pub const DEFAULT_CONNECTION: &str = "default";

// == Remote Connection ==
/// Primitives a remote key/value service must offer.
///
/// Errors from the transport are reported as `CacheError::Remote` and
/// passed to callers unchanged.
pub trait RemoteConnection: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Fetches several keys, one slot per key, in order.
    fn mget(&self, keys: &[String]) -> Result<Vec<Option<Vec<u8>>>>;

    /// Writes a value. `None` means no expiry.
    fn set(&self, key: &str, value: Vec<u8>, ttl: Option<Duration>) -> Result<()>;

    /// Writes only if the key does not exist. Returns whether it wrote.
    fn set_nx(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<bool>;

    /// Atomically reads and deletes a key.
    fn get_del(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Deletes keys, returning how many existed.
    fn del(&self, keys: &[String]) -> Result<u64>;

    /// Atomically adds `delta` to an integer counter.
    fn incr_by(&self, key: &str, delta: i64) -> Result<i64>;

    /// Writes every pair with the same expiry as one atomic batch. On
    /// failure no key may be left without that expiry.
    fn mset_ex(&self, values: &[(String, Vec<u8>)], ttl: Duration) -> Result<()>;

    /// Clears the whole keyspace.
    fn flush_db(&self) -> Result<()>;
}

/// Hands out connections by name.
pub trait ConnectionResolver: Send + Sync {
    fn connection(&self, name: &str) -> Result<Arc<dyn RemoteConnection>>;
}

// == Remote Store ==
/// A [`Store`] backed by a [`RemoteConnection`].
pub struct RemoteStore {
    connection: Arc<dyn RemoteConnection>,
    prefix: String,
}

impl RemoteStore {
    pub fn new(connection: Arc<dyn RemoteConnection>, prefix: impl Into<String>) -> Self {
        Self {
            connection,
            prefix: prefix.into(),
        }
    }

    fn key(&self, key: &str) -> String {
        format!("{}{}", self.prefix, key)
    }

    fn keys(&self, keys: &[&str]) -> Vec<String> {
        keys.iter().map(|key| self.key(key)).collect()
    }
}

impl std::fmt::Debug for RemoteStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteStore")
            .field("prefix", &self.prefix)
            .finish()
    }
}

impl Store for RemoteStore {
    fn driver(&self) -> &'static str {
        REMOTE_DRIVER
    }

    fn get(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.connection.get(&self.key(key))?.map(Value::from_bytes))
    }

    fn get_many(&self, keys: &[&str]) -> Result<Vec<Option<Value>>> {
        let values = self.connection.mget(&self.keys(keys))?;
        Ok(values
            .into_iter()
            .map(|value| value.map(Value::from_bytes))
            .collect())
    }

    fn put(&self, key: &str, value: Value, ttl: Duration) -> Result<()> {
        self.connection
            .set(&self.key(key), value.to_bytes(), Some(ttl))
    }

    fn put_many(&self, values: HashMap<String, Value>, ttl: Duration) -> Result<()> {
        if values.is_empty() {
            return Ok(());
        }

        let pairs: Vec<(String, Vec<u8>)> = values
            .into_iter()
            .map(|(key, value)| (self.key(&key), value.to_bytes()))
            .collect();
        self.connection.mset_ex(&pairs, ttl)
    }

    fn add(&self, key: &str, value: Value, ttl: Option<Duration>) -> Result<bool> {
        self.connection.set_nx(
            &self.key(key),
            value.to_bytes(),
            ttl.unwrap_or(DEFAULT_ADD_TTL),
        )
    }

    // == Pull ==
    /// Uses the service's atomic get-and-delete, falling back to a plain
    /// get followed by a delete when that primitive fails.
    fn pull(&self, key: &str, default: Option<Value>) -> Result<Option<Value>> {
        let key = self.key(key);
        let value = match self.connection.get_del(&key) {
            Ok(value) => value,
            Err(_) => {
                let value = self.connection.get(&key)?;
                if value.is_some() {
                    self.connection.del(std::slice::from_ref(&key))?;
                }
                value
            }
        };

        Ok(value.map(Value::from_bytes).or(default))
    }

    fn increment(&self, key: &str, delta: Option<i64>) -> Result<i64> {
        self.connection
            .incr_by(&self.key(key), delta.unwrap_or(DEFAULT_DELTA))
    }

    fn decrement(&self, key: &str, delta: Option<i64>) -> Result<i64> {
        let delta = delta.unwrap_or(DEFAULT_DELTA);
        let delta = delta
            .checked_neg()
            .ok_or_else(|| CacheError::InvalidRequest(format!("delta {} out of range", delta)))?;
        self.connection.incr_by(&self.key(key), delta)
    }

    fn forever(&self, key: &str, value: Value) -> Result<()> {
        self.connection.set(&self.key(key), value.to_bytes(), None)
    }

    fn forget(&self, key: &str) -> Result<()> {
        match self.connection.del(&[self.key(key)])? {
            0 => Err(CacheError::NotFound(key.to_string())),
            _ => Ok(()),
        }
    }

    fn flush(&self) -> Result<()> {
        self.connection.flush_db()
    }

    fn prefix(&self) -> &str {
        &self.prefix
    }
}

// == Driver ==
/// Driver constructor for remote stores.
///
/// The store config's `connection` field picks the connection (falling
/// back to `"default"`) and `prefix` namespaces the keys.
pub fn remote_driver(resolver: Arc<dyn ConnectionResolver>) -> DriverConstructor {
    driver_fn(move |config: &StoreConfig| {
        let name = config.connection.as_deref().unwrap_or(DEFAULT_CONNECTION);
        let connection = resolver.connection(name)?;
        Ok(Arc::new(RemoteStore::new(connection, config.prefix.clone())) as Arc<dyn Store>)
    })
}
