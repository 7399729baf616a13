//! Pool statistics and growth bookkeeping
//!
//! Each backing store keeps its own counters: plain cells for the local
//! store, relaxed atomics for the shared store. Both produce the same
//! [`PoolStats`] snapshot.

use std::cell::Cell;
use std::sync::atomic::{AtomicU64, Ordering};

/// Point-in-time snapshot of a pool's counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoolStats {
    /// Instances currently waiting for reuse.
    pub available: usize,
    /// Factory invocations (initial fill, growth and misses).
    pub created: u64,
    /// `get` calls served from the available set.
    pub hits: u64,
    /// `get` calls that had to manufacture a new instance.
    pub misses: u64,
    /// Instances handed back through `release`.
    pub released: u64,
    /// Instances added by pre-growth, including the initial fill.
    pub grown: u64,
    /// Factory errors returned to callers.
    pub factory_errors: u64,
}

impl PoolStats {
    /// Total `get` calls observed.
    pub fn gets(&self) -> u64 {
        self.hits + self.misses
    }

    /// Fraction of `get` calls served without the factory (0.0 to 1.0).
    pub fn hit_rate(&self) -> f64 {
        let total = self.gets();
        if total == 0 {
            return 0.0;
        }

        self.hits as f64 / total as f64
    }
}

/// Counters for the single-threaded store.
#[derive(Debug, Default)]
pub(crate) struct LocalCounters {
    created: Cell<u64>,
    hits: Cell<u64>,
    misses: Cell<u64>,
    released: Cell<u64>,
    grown: Cell<u64>,
    factory_errors: Cell<u64>,
}

impl LocalCounters {
    #[inline]
    pub(crate) fn record_hit(&self) {
        bump(&self.hits, 1);
    }

    #[inline]
    pub(crate) fn record_miss(&self) {
        bump(&self.misses, 1);
        bump(&self.created, 1);
    }

    #[inline]
    pub(crate) fn record_release(&self) {
        bump(&self.released, 1);
    }

    pub(crate) fn record_growth(&self, count: u64) {
        bump(&self.grown, count);
        bump(&self.created, count);
    }

    pub(crate) fn record_factory_error(&self) {
        bump(&self.factory_errors, 1);
    }

    pub(crate) fn snapshot(&self, available: usize) -> PoolStats {
        PoolStats {
            available,
            created: self.created.get(),
            hits: self.hits.get(),
            misses: self.misses.get(),
            released: self.released.get(),
            grown: self.grown.get(),
            factory_errors: self.factory_errors.get(),
        }
    }
}

#[inline]
fn bump(cell: &Cell<u64>, by: u64) {
    cell.set(cell.get().wrapping_add(by));
}

/// Counters for the concurrent store.
#[derive(Debug, Default)]
pub(crate) struct AtomicCounters {
    created: AtomicU64,
    hits: AtomicU64,
    misses: AtomicU64,
    released: AtomicU64,
    grown: AtomicU64,
    factory_errors: AtomicU64,
}

impl AtomicCounters {
    #[inline]
    pub(crate) fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
        self.created.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_release(&self) {
        self.released.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_growth(&self, count: u64) {
        self.grown.fetch_add(count, Ordering::Relaxed);
        self.created.fetch_add(count, Ordering::Relaxed);
    }

    pub(crate) fn record_factory_error(&self) {
        self.factory_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self, available: usize) -> PoolStats {
        PoolStats {
            available,
            created: self.created.load(Ordering::Relaxed),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            released: self.released.load(Ordering::Relaxed),
            grown: self.grown.load(Ordering::Relaxed),
            factory_errors: self.factory_errors.load(Ordering::Relaxed),
        }
    }
}
