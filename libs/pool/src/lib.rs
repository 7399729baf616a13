//! # Object Reuse Pools
//!
//! ## Purpose
//!
//! Amortizes allocation and construction cost for the message converter's hot
//! path. Conversion routines borrow scratch instances from a pool, use them,
//! and hand them back for reuse instead of dropping them.
//!
//! ## Architecture Role
//!
//! ```text
//! Converter Thread → [ObjectPool::get] → Conversion Work → [ObjectPool::release]
//!        ↓                  ↓                                      ↓
//!   Hot Path         BackingStore pop                      BackingStore push
//!                    (factory on miss)                     (no validation)
//! ```
//!
//! ## Backing Stores
//!
//! Two implementations share the [`BackingStore`] contract:
//! - [`LocalStore`]: no internal synchronization. The type is `!Sync`, so it
//!   can be moved to a worker thread but never shared between threads.
//! - [`SharedStore`]: lock-free queue, safe for `get`/`release`/`grow_pool`
//!   from any number of threads without caller-side locking.
//!
//! The discipline is picked once, at construction:
//!
//! ```rust
//! use pool::ObjectPool;
//!
//! // Confined to the current worker
//! let local = ObjectPool::local(16, || Vec::<u8>::with_capacity(1024));
//! let mut buf = local.get();
//! buf.extend_from_slice(b"fields");
//! buf.clear();
//! local.release(buf);
//!
//! // Shared across a worker pool
//! let shared = ObjectPool::concurrent(16, || Vec::<u8>::with_capacity(1024));
//! let buf = shared.get();
//! shared.release(buf);
//! ```
//!
//! ## Contract
//!
//! - `get` never fails on an empty store; it manufactures a new instance.
//! - The pool never inspects or resets instances. Whoever releases an
//!   instance leaves it reusable, or the next borrower sees stale state.
//! - `release` accepts any instance of `T`, including ones the pool never
//!   produced.
//! - Factory failure reaches the caller of the operation that triggered
//!   it. Fallible factories (`Fn() -> Result<T, E>`) are built with
//!   `try_local`/`try_concurrent` and report through `try_get`,
//!   `try_grow_pool` and `try_checkout`; an infallible factory that panics
//!   unwinds through whichever call triggered it.
//!
//! ```rust
//! use pool::ObjectPool;
//!
//! let pool = ObjectPool::try_local(0, || Err::<Vec<u8>, _>("no memory budget"));
//! let pool = pool.unwrap();
//! assert_eq!(pool.try_get(), Err("no memory budget"));
//! assert_eq!(pool.stats().factory_errors, 1);
//! ```

pub mod factory;
pub mod pool;
pub mod stats;
pub mod store;

pub use factory::{Factory, LocalFactory, DEFAULT_INITIAL_SIZE};
pub use pool::{LocalPool, ObjectPool, Pooled, SharedPool};
pub use stats::PoolStats;
pub use store::{BackingStore, InfallibleStore, LocalStore, PoolKind, SharedStore};
