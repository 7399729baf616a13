use super::{BackingStore, PoolKind};
use crate::factory::{into_ok, Factory};
use crate::stats::{AtomicCounters, PoolStats};
use std::convert::Infallible;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{debug, trace};

/// Backing store shared across a worker-thread pool.
///
/// Available instances live in a lock-free queue, so `get`, `release` and
/// `grow_pool` may be called from any thread without caller-side locking.
/// A successful pop hands the instance to exactly one caller.
pub struct SharedStore<T, E = Infallible> {
    available: lockfree::queue::Queue<T>,
    /// lockfree::queue::Queue has no len(); tracked alongside pushes/pops.
    len: AtomicUsize,
    make: Factory<T, E>,
    counters: AtomicCounters,
}

impl<T: Send> SharedStore<T> {
    /// Create a store and pre-fill it with `initial_size` instances.
    pub fn new<F>(initial_size: usize, make: F) -> Self
    where
        F: Fn() -> T + Send + Sync + 'static,
    {
        into_ok(Self::try_new(initial_size, move || Ok(make())))
    }
}

impl<T: Send, E> SharedStore<T, E> {
    /// Create a store over a fallible factory and pre-fill it.
    ///
    /// The first factory error aborts construction and is returned as is.
    pub fn try_new<F>(initial_size: usize, make: F) -> Result<Self, E>
    where
        F: Fn() -> Result<T, E> + Send + Sync + 'static,
    {
        let store = Self {
            available: lockfree::queue::Queue::new(),
            len: AtomicUsize::new(0),
            make: Box::new(make),
            counters: AtomicCounters::default(),
        };
        store.try_grow_pool(initial_size)?;
        debug!(initial_size, "concurrent backing store ready");
        Ok(store)
    }

    fn manufacture(&self) -> Result<T, E> {
        (self.make)().inspect_err(|_| {
            self.counters.record_factory_error();
            debug!("concurrent store factory failed");
        })
    }

    #[inline]
    fn push(&self, obj: T) {
        // Count first so a concurrent pop of this instance never drives the
        // counter below zero.
        self.len.fetch_add(1, Ordering::AcqRel);
        self.available.push(obj);
    }

    #[inline]
    fn pop(&self) -> Option<T> {
        let obj = self.available.pop()?;
        self.len.fetch_sub(1, Ordering::AcqRel);
        Some(obj)
    }
}

impl<T: Send, E> BackingStore<T> for SharedStore<T, E> {
    type Error = E;

    #[inline]
    fn try_get(&self) -> Result<T, E> {
        if let Some(obj) = self.pop() {
            self.counters.record_hit();
            return Ok(obj);
        }

        let obj = self.manufacture()?;
        self.counters.record_miss();
        trace!("concurrent store miss, manufactured new instance");
        Ok(obj)
    }

    #[inline]
    fn release(&self, obj: T) {
        self.push(obj);
        self.counters.record_release();
    }

    fn try_grow_pool(&self, count: usize) -> Result<(), E> {
        if count == 0 {
            return Ok(());
        }

        for _ in 0..count {
            let obj = self.manufacture()?;
            self.push(obj);
            self.counters.record_growth(1);
        }
        trace!(count, "concurrent store grown");
        Ok(())
    }

    #[inline]
    fn available(&self) -> usize {
        self.len.load(Ordering::Acquire)
    }

    fn stats(&self) -> PoolStats {
        self.counters.snapshot(self.available())
    }

    fn kind(&self) -> PoolKind {
        PoolKind::Concurrent
    }
}

impl<T: Send, E> fmt::Debug for SharedStore<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedStore")
            .field("available", &self.available())
            .field("stats", &self.stats())
            .finish_non_exhaustive()
    }
}
