use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use fvqc_core::{QcError, QcSetup};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::space::QCIndexSpace;

type Slot = Arc<Mutex<Option<Arc<QCIndexSpace>>>>;

/// Counters describing cache traffic.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    /// Lookups served from a finished build.
    pub hits: u64,
    /// Lookups that found no finished build.
    pub misses: u64,
    /// Completed builds.
    pub builds: u64,
    /// Keys currently holding a built space.
    pub entries: usize,
}

/// Thread-safe, caller-owned memo of built index spaces.
///
/// Keyed by [`QcSetup::cache_key`]. Concurrent requests for the same key
/// wait on a per-key slot so the enumeration runs at most once; distinct
/// keys build in parallel. Failed builds are not cached.
#[derive(Debug, Default)]
pub struct IndexSpaceCache {
    slots: Mutex<HashMap<String, Slot>>,
    hits: AtomicU64,
    misses: AtomicU64,
    builds: AtomicU64,
}

impl IndexSpaceCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self, key: &str) -> Slot {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        slots.entry(key.to_string()).or_default().clone()
    }

    /// Returns the cached space for `setup`, building it on first use.
    pub fn get_or_build(&self, setup: &QcSetup) -> Result<Arc<QCIndexSpace>, QcError> {
        let key = setup.cache_key()?;
        let slot = self.slot(&key);
        let mut guard = slot.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(space) = guard.as_ref() {
            self.hits.fetch_add(1, Ordering::Relaxed);
            debug!(key = %key, "index space cache hit");
            return Ok(Arc::clone(space));
        }
        self.misses.fetch_add(1, Ordering::Relaxed);
        debug!(key = %key, "index space cache miss");
        let space = Arc::new(QCIndexSpace::from_setup(setup.clone())?);
        self.builds.fetch_add(1, Ordering::Relaxed);
        *guard = Some(Arc::clone(&space));
        Ok(space)
    }

    /// Returns a finished build without triggering one.
    pub fn get(&self, setup: &QcSetup) -> Result<Option<Arc<QCIndexSpace>>, QcError> {
        let key = setup.cache_key()?;
        let slot = {
            let slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
            slots.get(&key).cloned()
        };
        Ok(slot.and_then(|slot| {
            slot.lock()
                .unwrap_or_else(PoisonError::into_inner)
                .as_ref()
                .map(Arc::clone)
        }))
    }

    /// Drops every cached space; counters are kept.
    pub fn clear(&self) {
        self.slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// Snapshot of the traffic counters.
    pub fn stats(&self) -> CacheStats {
        let entries = {
            let slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
            slots
                .values()
                .filter(|slot| {
                    slot.lock()
                        .unwrap_or_else(PoisonError::into_inner)
                        .is_some()
                })
                .count()
        };
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            builds: self.builds.load(Ordering::Relaxed),
            entries,
        }
    }
}
