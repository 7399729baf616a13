//! Public reuse manager over a [`BackingStore`]

use crate::factory::{into_ok, DEFAULT_INITIAL_SIZE};
use crate::stats::PoolStats;
use crate::store::{BackingStore, LocalStore, PoolKind, SharedStore};
use std::convert::Infallible;
use std::fmt;
use std::marker::PhantomData;
use std::ops::{Deref, DerefMut};

/// Pool confined to one thread at a time.
pub type LocalPool<T, E = Infallible> = ObjectPool<T, LocalStore<T, E>>;

/// Pool shared between threads.
pub type SharedPool<T, E = Infallible> = ObjectPool<T, SharedStore<T, E>>;

/// Reuse manager for instances of `T`.
///
/// A thin facade over exactly one backing store. It defines no error
/// conditions of its own: with an infallible factory `get` always yields a
/// usable instance; with a fallible one, `try_get` and `try_grow_pool`
/// return the factory's error unchanged. `release` always succeeds. The
/// pool is `Sync` exactly when its store is, so a [`SharedPool`] can sit
/// behind an `Arc` while a [`LocalPool`] cannot.
pub struct ObjectPool<T, S = SharedStore<T>> {
    store: S,
    _marker: PhantomData<fn() -> T>,
}

impl<T> ObjectPool<T, LocalStore<T>> {
    /// Build a non-concurrent pool pre-filled with `initial_size` instances.
    pub fn local<F>(initial_size: usize, make: F) -> Self
    where
        F: Fn() -> T + Send + 'static,
    {
        Self::from_store(LocalStore::new(initial_size, make))
    }

    /// Build a non-concurrent pool with [`DEFAULT_INITIAL_SIZE`] instances.
    pub fn local_with_default_size<F>(make: F) -> Self
    where
        F: Fn() -> T + Send + 'static,
    {
        Self::local(DEFAULT_INITIAL_SIZE, make)
    }
}

impl<T, E> ObjectPool<T, LocalStore<T, E>> {
    /// Build a non-concurrent pool over a fallible factory.
    pub fn try_local<F>(initial_size: usize, make: F) -> Result<Self, E>
    where
        F: Fn() -> Result<T, E> + Send + 'static,
    {
        Ok(Self::from_store(LocalStore::try_new(initial_size, make)?))
    }
}

impl<T: Send> ObjectPool<T, SharedStore<T>> {
    /// Build a concurrent pool pre-filled with `initial_size` instances.
    pub fn concurrent<F>(initial_size: usize, make: F) -> Self
    where
        F: Fn() -> T + Send + Sync + 'static,
    {
        Self::from_store(SharedStore::new(initial_size, make))
    }

    /// Build a concurrent pool with [`DEFAULT_INITIAL_SIZE`] instances.
    pub fn concurrent_with_default_size<F>(make: F) -> Self
    where
        F: Fn() -> T + Send + Sync + 'static,
    {
        Self::concurrent(DEFAULT_INITIAL_SIZE, make)
    }
}

impl<T: Send, E> ObjectPool<T, SharedStore<T, E>> {
    /// Build a concurrent pool over a fallible factory.
    pub fn try_concurrent<F>(initial_size: usize, make: F) -> Result<Self, E>
    where
        F: Fn() -> Result<T, E> + Send + Sync + 'static,
    {
        Ok(Self::from_store(SharedStore::try_new(initial_size, make)?))
    }
}

impl<T, S: BackingStore<T>> ObjectPool<T, S> {
    /// Wrap an already constructed store.
    pub fn from_store(store: S) -> Self {
        Self {
            store,
            _marker: PhantomData,
        }
    }

    /// Borrow an instance, manufacturing one if the store is exhausted.
    ///
    /// Fails only when a new instance was needed and the factory failed.
    #[inline]
    pub fn try_get(&self) -> Result<T, S::Error> {
        self.store.try_get()
    }

    /// Hand an instance back for reuse.
    ///
    /// Clear whatever mutable state the next borrower must not see before
    /// releasing; the pool does not.
    #[inline]
    pub fn release(&self, obj: T) {
        self.store.release(obj)
    }

    /// Pre-warm the pool with `count` new instances, stopping at the first
    /// factory error.
    pub fn try_grow_pool(&self, count: usize) -> Result<(), S::Error> {
        self.store.try_grow_pool(count)
    }

    /// Guarded variant of [`try_get`](Self::try_get).
    pub fn try_checkout(&self) -> Result<Pooled<'_, T, S>, S::Error> {
        Ok(Pooled {
            item: Some(self.try_get()?),
            pool: self,
        })
    }

    pub fn available(&self) -> usize {
        self.store.available()
    }

    pub fn stats(&self) -> PoolStats {
        self.store.stats()
    }

    pub fn kind(&self) -> PoolKind {
        self.store.kind()
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}

impl<T, S: BackingStore<T, Error = Infallible>> ObjectPool<T, S> {
    /// Borrow an instance, manufacturing one if the store is exhausted.
    ///
    /// The instance is returned exactly as it was released.
    #[inline]
    pub fn get(&self) -> T {
        into_ok(self.try_get())
    }

    /// Pre-warm the pool with `count` new instances ahead of a burst.
    pub fn grow_pool(&self, count: usize) {
        into_ok(self.try_grow_pool(count))
    }

    /// Borrow an instance that goes back to the pool when the guard drops.
    pub fn checkout(&self) -> Pooled<'_, T, S> {
        into_ok(self.try_checkout())
    }
}

impl<T, S: BackingStore<T>> fmt::Debug for ObjectPool<T, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectPool")
            .field("kind", &self.kind())
            .field("stats", &self.stats())
            .finish()
    }
}

/// RAII checkout that releases its instance back to the pool on drop.
pub struct Pooled<'a, T, S: BackingStore<T>> {
    item: Option<T>,
    pool: &'a ObjectPool<T, S>,
}

impl<'a, T, S: BackingStore<T>> Pooled<'a, T, S> {
    /// Take the instance out, preventing its return to the pool.
    pub fn detach(mut self) -> T {
        self.item.take().expect("pooled instance present until drop")
    }
}

impl<'a, T, S: BackingStore<T>> Deref for Pooled<'a, T, S> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        self.item.as_ref().expect("pooled instance present until drop")
    }
}

impl<'a, T, S: BackingStore<T>> DerefMut for Pooled<'a, T, S> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.item.as_mut().expect("pooled instance present until drop")
    }
}

impl<'a, T, S: BackingStore<T>> Drop for Pooled<'a, T, S> {
    fn drop(&mut self) {
        if let Some(item) = self.item.take() {
            self.pool.release(item);
        }
    }
}

impl<'a, T: fmt::Debug, S: BackingStore<T>> fmt::Debug for Pooled<'a, T, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Pooled").field(&self.item).finish()
    }
}
