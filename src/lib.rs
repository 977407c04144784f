//! Cachebox - pluggable key/value cache stores
//!
//! Interchangeable cache drivers (in-process and remote) behind one
//! capability set, resolved by name through a store factory.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use cachebox::{CacheConfig, Store, StoreFactory, Value};
//!
//! let factory = StoreFactory::new(CacheConfig::default());
//! let store = factory.default_store();
//!
//! store.put("greeting", Value::from("hello"), Duration::from_secs(60)).unwrap();
//! assert_eq!(store.get("greeting").unwrap(), Some(Value::from("hello")));
//! assert_eq!(store.increment("hits", None).unwrap(), 1);
//! ```

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;

pub use api::AppState;
pub use cache::{MemoryStore, RemoteStore, Store, StoreFactory, Value};
pub use config::{CacheConfig, ServerConfig, StoreConfig};
pub use error::CacheError;
