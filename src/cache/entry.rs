//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with TTL support.

use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::cache::Value;

// == Cache Entry ==
/// Represents a single cache entry with value and expiry metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    /// The stored value
    pub value: Value,
    /// Expiration instant, None = never expires
    pub expires_at: Option<DateTime<Utc>>,
}

impl CacheEntry {
    // == Constructors ==
    /// Creates an entry that expires `ttl` after `now`.
    pub fn expiring(value: Value, now: DateTime<Utc>, ttl: Duration) -> Self {
        Self {
            value,
            expires_at: Some(expiry_after(now, ttl)),
        }
    }

    /// Creates an entry exempt from expiry.
    pub fn forever(value: Value) -> Self {
        Self {
            value,
            expires_at: None,
        }
    }

    /// Returns true if the entry never expires.
    pub fn is_forever(&self) -> bool {
        self.expires_at.is_none()
    }

    // == Validity ==
    /// Checks if the entry is still valid at `now`.
    ///
    /// Forever entries are always valid. Expiring entries are valid only
    /// while `now` is strictly before the expiration instant.
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        match self.expires_at {
            Some(expires) => now < expires,
            None => true,
        }
    }

    // == Time To Live ==
    /// Remaining TTL at `now`, or None if the entry never expires.
    ///
    /// Returns `Some(Duration::ZERO)` once the entry has expired.
    pub fn ttl_remaining(&self, now: DateTime<Utc>) -> Option<Duration> {
        self.expires_at
            .map(|expires| (expires - now).to_std().unwrap_or(Duration::ZERO))
    }
}

/// Computes `now + ttl`, saturating at the far future for huge TTLs.
pub fn expiry_after(now: DateTime<Utc>, ttl: Duration) -> DateTime<Utc> {
    chrono::Duration::from_std(ttl)
        .ok()
        .and_then(|ttl| now.checked_add_signed(ttl))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}
