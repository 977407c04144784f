//! Store Factory Module
//!
//! Resolves store names to driver instances. Each name is built at most
//! once, by the constructor registered for its configured driver kind.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use tracing::info;

use crate::cache::{MemoryStore, Store, MEMORY_DRIVER};
use crate::config::{CacheConfig, StoreConfig};
use crate::error::{CacheError, Result};

/// Builds a store from its named configuration.
pub type DriverConstructor = Arc<dyn Fn(&StoreConfig) -> Result<Arc<dyn Store>> + Send + Sync>;

/// Wraps a closure as a [`DriverConstructor`].
pub fn driver_fn<F>(f: F) -> DriverConstructor
where
    F: Fn(&StoreConfig) -> Result<Arc<dyn Store>> + Send + Sync + 'static,
{
    Arc::new(f)
}

// == Store Factory ==
/// Registry of named stores and driver constructors.
pub struct StoreFactory {
    config: CacheConfig,
    stores: RwLock<HashMap<String, Arc<dyn Store>>>,
    drivers: RwLock<HashMap<String, DriverConstructor>>,
}

impl StoreFactory {
    /// Creates a factory with the memory driver already registered.
    pub fn new(config: CacheConfig) -> Self {
        let factory = Self {
            config,
            stores: RwLock::new(HashMap::new()),
            drivers: RwLock::new(HashMap::new()),
        };
        factory.extend(
            MEMORY_DRIVER,
            driver_fn(|config| Ok(Arc::new(MemoryStore::from_config(config)) as Arc<dyn Store>)),
        );
        factory
    }

    /// The configuration this factory resolves names against.
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    // == Extend ==
    /// Registers (or replaces) the constructor for a driver kind.
    pub fn extend(&self, driver: impl Into<String>, constructor: DriverConstructor) {
        let driver = driver.into();
        info!(driver = %driver, "registering cache driver");
        self.drivers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(driver, constructor);
    }

    /// Returns true if a constructor is registered for `driver`.
    pub fn has_driver(&self, driver: &str) -> bool {
        self.drivers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(driver)
    }

    // == Store Resolution ==
    /// Returns the store for `name`, building it on first access.
    ///
    /// # Panics
    /// Panics when the name has no configuration or its driver kind has no
    /// registered constructor. Both are deployment bugs; use
    /// [`StoreFactory::try_store`] at boundaries that must not panic.
    pub fn store(&self, name: &str) -> Arc<dyn Store> {
        self.try_store(name)
            .unwrap_or_else(|e| panic!("cache store '{}' unavailable: {}", name, e))
    }

    /// Returns the configured default store.
    pub fn default_store(&self) -> Arc<dyn Store> {
        self.store(&self.config.default)
    }

    /// Fallible variant of [`StoreFactory::store`].
    pub fn try_store(&self, name: &str) -> Result<Arc<dyn Store>> {
        if let Some(store) = self
            .stores
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
        {
            return Ok(store.clone());
        }

        let mut stores = self.stores.write().unwrap_or_else(PoisonError::into_inner);

        // Another caller may have built it while we waited for the lock
        if let Some(store) = stores.get(name) {
            return Ok(store.clone());
        }

        let store = self.make(name)?;
        stores.insert(name.to_string(), store.clone());
        Ok(store)
    }

    /// Names of the stores built so far.
    pub fn store_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .stores
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        names.sort();
        names
    }

    fn make(&self, name: &str) -> Result<Arc<dyn Store>> {
        let config = self
            .config
            .store(name)
            .ok_or_else(|| CacheError::UnknownStore(name.to_string()))?;

        let constructor = self
            .drivers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&config.driver)
            .cloned()
            .ok_or_else(|| CacheError::UnknownDriver(config.driver.clone()))?;

        let store = constructor(config)?;
        info!(store = name, driver = %config.driver, prefix = %config.prefix, "cache store created");
        Ok(store)
    }
}

impl std::fmt::Debug for StoreFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreFactory")
            .field("default", &self.config.default)
            .field("stores", &self.store_names())
            .finish()
    }
}
