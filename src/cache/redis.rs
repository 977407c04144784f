//! Redis Connection Module
//!
//! [`RemoteConnection`] implementation over the synchronous `redis` client.
//! Only compiled with the `redis` feature.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use redis::{Client, Connection, FromRedisValue, RedisError};
use tracing::info;

use crate::cache::{ConnectionResolver, RemoteConnection};
use crate::error::{CacheError, Result};

fn remote_err(e: RedisError) -> CacheError {
    CacheError::Remote(e.to_string())
}

/// Expiry in milliseconds, never zero (Redis rejects `PX 0`). Durations
/// beyond `u64::MAX` milliseconds saturate.
fn millis(ttl: Duration) -> u64 {
    u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX).max(1)
}

// == Redis Connection ==
/// A single Redis connection shared behind a mutex.
pub struct RedisConnection {
    connection: Mutex<Connection>,
}

impl RedisConnection {
    /// Opens a connection to `url`, e.g. `redis://localhost:6379/0`.
    pub fn open(url: &str) -> Result<Self> {
        let client = Client::open(url).map_err(remote_err)?;
        Self::from_client(&client)
    }

    fn from_client(client: &Client) -> Result<Self> {
        let connection = client.get_connection().map_err(remote_err)?;
        Ok(Self {
            connection: Mutex::new(connection),
        })
    }

    fn lock(&self) -> MutexGuard<'_, Connection> {
        self.connection
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn query<T: FromRedisValue>(&self, cmd: &redis::Cmd) -> Result<T> {
        cmd.query(&mut *self.lock()).map_err(remote_err)
    }
}

impl RemoteConnection for RedisConnection {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        self.query(redis::cmd("GET").arg(key))
    }

    fn mget(&self, keys: &[String]) -> Result<Vec<Option<Vec<u8>>>> {
        if keys.is_empty() {
            return Ok(Vec::new());
        }
        self.query(redis::cmd("MGET").arg(keys))
    }

    fn set(&self, key: &str, value: Vec<u8>, ttl: Option<Duration>) -> Result<()> {
        match ttl {
            // An entry that expires immediately is never readable
            Some(ttl) if ttl.is_zero() => self.del(&[key.to_string()]).map(|_| ()),
            Some(ttl) => self.query(
                redis::cmd("SET")
                    .arg(key)
                    .arg(value)
                    .arg("PX")
                    .arg(millis(ttl)),
            ),
            None => self.query(redis::cmd("SET").arg(key).arg(value)),
        }
    }

    fn set_nx(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<bool> {
        let reply: Option<String> = self.query(
            redis::cmd("SET")
                .arg(key)
                .arg(value)
                .arg("NX")
                .arg("PX")
                .arg(millis(ttl)),
        )?;
        Ok(reply.is_some())
    }

    fn get_del(&self, key: &str) -> Result<Option<Vec<u8>>> {
        self.query(redis::cmd("GETDEL").arg(key))
    }

    fn del(&self, keys: &[String]) -> Result<u64> {
        self.query(redis::cmd("DEL").arg(keys))
    }

    fn incr_by(&self, key: &str, delta: i64) -> Result<i64> {
        self.query(redis::cmd("INCRBY").arg(key).arg(delta))
    }

    // == Batch Write ==
    /// One `SET .. PX` per key inside MULTI/EXEC, so each key carries its
    /// expiry from the moment it exists and the batch applies as a whole.
    fn mset_ex(&self, values: &[(String, Vec<u8>)], ttl: Duration) -> Result<()> {
        if values.is_empty() {
            return Ok(());
        }
        if ttl.is_zero() {
            let keys: Vec<String> = values.iter().map(|(key, _)| key.clone()).collect();
            return self.del(&keys).map(|_| ());
        }

        let px = millis(ttl);
        let mut pipe = redis::pipe();
        pipe.atomic();
        for (key, value) in values {
            pipe.cmd("SET")
                .arg(key)
                .arg(value.as_slice())
                .arg("PX")
                .arg(px)
                .ignore();
        }
        pipe.query::<()>(&mut *self.lock()).map_err(remote_err)
    }

    fn flush_db(&self) -> Result<()> {
        self.query(&redis::cmd("FLUSHDB"))
    }
}

// == Redis Resolver ==
/// Resolves connection names to Redis URLs, connecting lazily and reusing
/// one connection per name.
pub struct RedisResolver {
    clients: HashMap<String, Client>,
    connections: Mutex<HashMap<String, Arc<RedisConnection>>>,
}

impl RedisResolver {
    /// Creates a resolver from `name -> url` pairs. URLs are validated here
    /// but nothing connects until a store asks for the connection.
    pub fn new(urls: HashMap<String, String>) -> Result<Self> {
        let clients = urls
            .into_iter()
            .map(|(name, url)| Client::open(url.as_str()).map(|client| (name, client)))
            .collect::<std::result::Result<HashMap<_, _>, _>>()
            .map_err(|e| CacheError::Config(e.to_string()))?;

        Ok(Self {
            clients,
            connections: Mutex::new(HashMap::new()),
        })
    }
}

impl ConnectionResolver for RedisResolver {
    fn connection(&self, name: &str) -> Result<Arc<dyn RemoteConnection>> {
        let mut connections = self
            .connections
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        if let Some(connection) = connections.get(name) {
            return Ok(connection.clone());
        }

        let client = self
            .clients
            .get(name)
            .ok_or_else(|| CacheError::Config(format!("no redis connection named '{}'", name)))?;
        let connection = Arc::new(RedisConnection::from_client(client)?);
        info!(connection = name, "redis connection opened");

        connections.insert(name.to_string(), connection.clone());
        Ok(connection)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_millis_never_zero() {
        assert_eq!(millis(Duration::from_micros(10)), 1);
        assert_eq!(millis(Duration::from_secs(2)), 2000);
    }

    #[test]
    fn test_millis_saturates_huge_ttl() {
        assert_eq!(millis(Duration::from_secs(u64::MAX)), u64::MAX);
        assert_eq!(millis(Duration::MAX), u64::MAX);
    }

    #[test]
    fn test_resolver_rejects_bad_url() {
        let urls = HashMap::from([("main".to_string(), "not a url".to_string())]);
        assert!(matches!(
            RedisResolver::new(urls),
            Err(CacheError::Config(_))
        ));
    }

    #[test]
    fn test_resolver_unknown_name() {
        let urls = HashMap::from([("main".to_string(), "redis://127.0.0.1:1/".to_string())]);
        let resolver = RedisResolver::new(urls).unwrap();
        assert!(matches!(
            resolver.connection("other"),
            Err(CacheError::Config(_))
        ));
    }
}
