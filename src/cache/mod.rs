//! Cache Module
//!
//! Store drivers sharing one capability set, and the factory that builds
//! them by name.

mod clock;
mod entry;
mod factory;
mod memory;
#[cfg(feature = "redis")]
mod redis;
mod remote;
mod store;
mod value;


// Re-export public types
pub use clock::{Clock, ManualClock, SystemClock};
pub use entry::CacheEntry;
pub use factory::{driver_fn, DriverConstructor, StoreFactory};
pub use memory::{MemoryStore, MEMORY_DRIVER};
#[cfg(feature = "redis")]
pub use self::redis::{RedisConnection, RedisResolver};
pub use remote::{
    remote_driver, ConnectionResolver, RemoteConnection, RemoteStore, DEFAULT_CONNECTION,
    REMOTE_DRIVER,
};
pub use store::{Store, DEFAULT_ADD_TTL, DEFAULT_DELTA};
pub use value::Value;
