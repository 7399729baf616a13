use super::{BackingStore, PoolKind};
use crate::factory::{into_ok, LocalFactory};
use crate::stats::{LocalCounters, PoolStats};
use std::cell::RefCell;
use std::convert::Infallible;
use std::fmt;
use tracing::{debug, trace};

/// Backing store for single-threaded hot loops.
///
/// Holds available instances in a stack so the most recently released
/// instance, still warm in cache, is the next one handed out. A release
/// followed by a `get` therefore returns the same instance.
///
/// The store uses `RefCell`/`Cell` internally and is `!Sync`: it can be moved
/// into a worker thread (when `T: Send`) but cannot be shared between
/// threads. Wrap it in the caller's own lock if it must be.
pub struct LocalStore<T, E = Infallible> {
    available: RefCell<Vec<T>>,
    make: LocalFactory<T, E>,
    counters: LocalCounters,
}

impl<T> LocalStore<T> {
    /// Create a store and pre-fill it with `initial_size` instances.
    pub fn new<F>(initial_size: usize, make: F) -> Self
    where
        F: Fn() -> T + Send + 'static,
    {
        into_ok(Self::try_new(initial_size, move || Ok(make())))
    }
}

impl<T, E> LocalStore<T, E> {
    /// Create a store over a fallible factory and pre-fill it.
    ///
    /// The first factory error aborts construction and is returned as is.
    pub fn try_new<F>(initial_size: usize, make: F) -> Result<Self, E>
    where
        F: Fn() -> Result<T, E> + Send + 'static,
    {
        let store = Self {
            available: RefCell::new(Vec::with_capacity(initial_size)),
            make: Box::new(make),
            counters: LocalCounters::default(),
        };
        store.try_grow_pool(initial_size)?;
        debug!(initial_size, "local backing store ready");
        Ok(store)
    }

    fn manufacture(&self) -> Result<T, E> {
        (self.make)().inspect_err(|_| {
            self.counters.record_factory_error();
            debug!("local store factory failed");
        })
    }
}

impl<T, E> BackingStore<T> for LocalStore<T, E> {
    type Error = E;

    #[inline]
    fn try_get(&self) -> Result<T, E> {
        // The borrow ends before the factory runs, so a factory may touch
        // this store without tripping the RefCell.
        let reused = self.available.borrow_mut().pop();
        match reused {
            Some(obj) => {
                self.counters.record_hit();
                Ok(obj)
            }
            None => {
                let obj = self.manufacture()?;
                self.counters.record_miss();
                trace!("local store miss, manufactured new instance");
                Ok(obj)
            }
        }
    }

    #[inline]
    fn release(&self, obj: T) {
        self.available.borrow_mut().push(obj);
        self.counters.record_release();
    }

    fn try_grow_pool(&self, count: usize) -> Result<(), E> {
        if count == 0 {
            return Ok(());
        }

        self.available.borrow_mut().reserve(count);
        for _ in 0..count {
            let obj = self.manufacture()?;
            self.available.borrow_mut().push(obj);
            self.counters.record_growth(1);
        }
        trace!(count, available = self.available(), "local store grown");
        Ok(())
    }

    #[inline]
    fn available(&self) -> usize {
        self.available.borrow().len()
    }

    fn stats(&self) -> PoolStats {
        self.counters.snapshot(self.available())
    }

    fn kind(&self) -> PoolKind {
        PoolKind::Local
    }
}

impl<T, E> fmt::Debug for LocalStore<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalStore")
            .field("available", &self.available())
            .field("stats", &self.stats())
            .finish_non_exhaustive()
    }
}
