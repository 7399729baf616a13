//! Factory abstraction for lazily constructed pool instances

use std::convert::Infallible;

/// Number of instances a pool manufactures up front when no size is given.
pub const DEFAULT_INITIAL_SIZE: usize = 16;

/// Zero-argument constructor used by a [`SharedStore`](crate::SharedStore).
///
/// Invoked from whichever thread misses, so it must be `Send + Sync`. A
/// factory that cannot fail uses `E = Infallible`.
pub type Factory<T, E = Infallible> = Box<dyn Fn() -> Result<T, E> + Send + Sync>;

/// Zero-argument constructor used by a [`LocalStore`](crate::LocalStore).
///
/// Only ever called by the store's single owner, so `Sync` is not required
/// and the factory may keep `Cell`/`RefCell` state. `Send` remains so the
/// store can move to a worker thread.
pub type LocalFactory<T, E = Infallible> = Box<dyn Fn() -> Result<T, E> + Send>;

#[inline]
pub(crate) fn into_ok<T>(result: Result<T, Infallible>) -> T {
    match result {
        Ok(value) => value,
        Err(never) => match never {},
    }
}
