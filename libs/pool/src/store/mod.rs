//! Backing stores: the reuse queues behind an [`ObjectPool`](crate::ObjectPool)
//!
//! Both stores implement [`BackingStore`]. Which one a pool uses is fixed
//! when the pool is built and never changes afterwards.

mod local;
mod shared;

pub use local::LocalStore;
pub use shared::SharedStore;

use crate::factory::into_ok;
use crate::stats::PoolStats;
use std::convert::Infallible;
use std::fmt;

/// Concurrency discipline of a backing store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PoolKind {
    /// Single owner at a time, no internal synchronization.
    Local,
    /// Safe for unrestricted concurrent use.
    Concurrent,
}

impl fmt::Display for PoolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PoolKind::Local => write!(f, "local"),
            PoolKind::Concurrent => write!(f, "concurrent"),
        }
    }
}

/// Reuse contract shared by both store variants.
///
/// Ownership of an instance returned by [`try_get`](Self::try_get) moves
/// fully to the caller until it comes back through
/// [`release`](Self::release). The store never hands one instance to two
/// callers at once, but it does not detect double releases or foreign
/// instances either.
///
/// `Error` is the factory's error type. Stores built from an infallible
/// factory use `Infallible` and get the plain `get`/`grow_pool` methods of
/// [`InfallibleStore`].
pub trait BackingStore<T> {
    type Error;

    /// Take an available instance, manufacturing one if none is left.
    ///
    /// Fails only when the store is empty and the factory fails.
    fn try_get(&self) -> Result<T, Self::Error>;

    /// Make `obj` eligible for a future [`try_get`](Self::try_get).
    fn release(&self, obj: T);

    /// Manufacture `count` instances and keep them available.
    ///
    /// `count == 0` is a no-op. On a factory error the instances made
    /// before it stay in the store.
    fn try_grow_pool(&self, count: usize) -> Result<(), Self::Error>;

    /// Instances currently waiting for reuse.
    ///
    /// Exact for the local store; a point-in-time approximation for the
    /// concurrent store while other threads are active.
    fn available(&self) -> usize;

    /// Snapshot of the store's counters.
    fn stats(&self) -> PoolStats;

    fn kind(&self) -> PoolKind;
}

/// Error-free surface of a store whose factory cannot fail.
pub trait InfallibleStore<T>: BackingStore<T, Error = Infallible> {
    #[inline]
    fn get(&self) -> T {
        into_ok(self.try_get())
    }

    fn grow_pool(&self, count: usize) {
        into_ok(self.try_grow_pool(count))
    }
}

impl<T, S> InfallibleStore<T> for S where S: BackingStore<T, Error = Infallible> + ?Sized {}
