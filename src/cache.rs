//! Time-based memoization for loaded chart tables.
//!
//! Identical load requests within the time-to-live return the stored value;
//! once an entry is older than the TTL it is never served and the next request
//! recomputes it. Failed loads are not stored.

use std::{
    collections::HashMap,
    hash::Hash,
    time::{Duration, Instant},
};

use log::debug;

pub const DEFAULT_TTL: Duration = Duration::from_secs(60 * 60);

#[derive(Debug)]
struct CacheSlot<V> {
    stored_at: Instant,
    value: V,
}

#[derive(Debug)]
pub struct TtlCache<K, V> {
    ttl: Duration,
    slots: HashMap<K, CacheSlot<V>>,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash + Clone + std::fmt::Debug,
    V: Clone,
{
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            slots: HashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Returns the value for `key` if it was stored less than a TTL before `now`.
    pub fn get_at(&self, key: &K, now: Instant) -> Option<V> {
        let slot = self.slots.get(key)?;
        let age = now.saturating_duration_since(slot.stored_at);
        (age < self.ttl).then(|| slot.value.clone())
    }

    pub fn insert_at(&mut self, key: K, value: V, now: Instant) {
        self.slots.insert(
            key,
            CacheSlot {
                stored_at: now,
                value,
            },
        );
    }

    pub fn get_or_try_insert_with<E, F>(&mut self, key: &K, load: F) -> Result<V, E>
    where
        F: FnOnce() -> Result<V, E>,
    {
        self.get_or_try_insert_with_at(key, Instant::now(), load)
    }

    pub fn get_or_try_insert_with_at<E, F>(
        &mut self,
        key: &K,
        now: Instant,
        load: F,
    ) -> Result<V, E>
    where
        F: FnOnce() -> Result<V, E>,
    {
        if let Some(value) = self.get_at(key, now) {
            debug!("Cache hit for {key:?}");
            return Ok(value);
        }
        debug!("Cache miss for {key:?}");
        let value = load()?;
        self.insert_at(key.clone(), value.clone(), now);
        Ok(value)
    }

    /// Drops every entry that is stale at `now`.
    pub fn purge_expired_at(&mut self, now: Instant) {
        let ttl = self.ttl;
        self.slots
            .retain(|_, slot| now.saturating_duration_since(slot.stored_at) < ttl);
    }
}
