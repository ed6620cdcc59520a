//! Process-wide value cache with time-based expiry and explicit invalidation.

use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::{Duration, Instant};

use tracing::warn;

struct Entry<V> {
    value: V,
    stored_at: Instant,
}

struct Slot<V> {
    generation: u64,
    entry: Option<Entry<V>>,
}

/// Holds at most one value. Readers get a clone while the value is younger than the TTL.
///
/// Every [`invalidate`](Self::invalidate) bumps a generation counter. Loaders capture the
/// generation before reading the source and store through
/// [`set_if_generation`](Self::set_if_generation), so a load that raced a write is dropped
/// instead of overwriting the invalidation.
pub struct TtlCache<V> {
    name: &'static str,
    ttl: Duration,
    slot: RwLock<Slot<V>>,
}

impl<V: Clone> TtlCache<V> {
    pub fn new(name: &'static str, ttl: Duration) -> Self {
        Self {
            name,
            ttl,
            slot: RwLock::new(Slot {
                generation: 0,
                entry: None,
            }),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn get(&self) -> Option<V> {
        let slot = rw_read(&self.slot, self.name, "get");
        slot.entry
            .as_ref()
            .filter(|entry| entry.stored_at.elapsed() < self.ttl)
            .map(|entry| entry.value.clone())
    }

    pub fn generation(&self) -> u64 {
        rw_read(&self.slot, self.name, "generation").generation
    }

    pub fn set(&self, value: V) {
        rw_write(&self.slot, self.name, "set").entry = Some(Entry {
            value,
            stored_at: Instant::now(),
        });
    }

    /// Stores `value` only if no invalidation happened since `generation` was read.
    pub fn set_if_generation(&self, generation: u64, value: V) -> bool {
        let mut slot = rw_write(&self.slot, self.name, "set_if_generation");
        if slot.generation != generation {
            return false;
        }
        slot.entry = Some(Entry {
            value,
            stored_at: Instant::now(),
        });
        true
    }

    pub fn invalidate(&self) {
        let mut slot = rw_write(&self.slot, self.name, "invalidate");
        slot.generation = slot.generation.wrapping_add(1);
        slot.entry = None;
    }
}

fn rw_read<'a, T>(
    lock: &'a RwLock<T>,
    cache: &'static str,
    op: &'static str,
) -> RwLockReadGuard<'a, T> {
    match lock.read() {
        Ok(guard) => guard,
        Err(poisoned) => {
            warn!(
                op,
                cache,
                lock_kind = "rwlock.read",
                result = "poisoned_recovered",
                "Recovered from poisoned cache lock"
            );
            poisoned.into_inner()
        }
    }
}

fn rw_write<'a, T>(
    lock: &'a RwLock<T>,
    cache: &'static str,
    op: &'static str,
) -> RwLockWriteGuard<'a, T> {
    match lock.write() {
        Ok(guard) => guard,
        Err(poisoned) => {
            warn!(
                op,
                cache,
                lock_kind = "rwlock.write",
                result = "poisoned_recovered",
                "Recovered from poisoned cache lock"
            );
            poisoned.into_inner()
        }
    }
}
