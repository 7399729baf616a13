//! Per-converter support context: scratch buffers plus service id resolution
//!
//! ## Usage
//!
//! ```rust
//! use converter::{ConversionContext, ConversionError, ConverterConfig, ServiceDirectory, ServiceIdResolver};
//! use std::sync::Arc;
//!
//! let config = ConverterConfig::default();
//! let directory: ServiceDirectory = [("DIRECT_FEED", 5)].into_iter().collect();
//! let resolver = Arc::new(ServiceIdResolver::new(&config.resolution).with_callback(directory));
//! let context = ConversionContext::concurrent(&config.pool, resolver);
//!
//! let encoded = context.with_scratch(|buffer| {
//!     let service_id = context.service_id("DIRECT_FEED")?;
//!     buffer.extend_from_slice(&service_id.to_be_bytes());
//!     Ok::<_, ConversionError>(buffer.clone())
//! })?;
//! assert_eq!(encoded, vec![0x00, 0x05]);
//! # Ok::<(), ConversionError>(())
//! ```

use crate::config::PoolConfig;
use crate::error::ConversionResult;
use crate::resolution::{ServiceId, ServiceIdResolver};
use pool::{BackingStore, LocalStore, ObjectPool, PoolStats, SharedStore};
use std::convert::Infallible;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Context confined to one converter thread.
pub type LocalContext = ConversionContext<LocalStore<Vec<u8>>>;

/// Context shared by a pool of converter threads.
pub type SharedContext = ConversionContext<SharedStore<Vec<u8>>>;

/// Support state a conversion routine borrows from.
///
/// Scratch buffers come from an [`ObjectPool`] whose discipline matches the
/// context's; the resolver is shared, so several contexts (one per worker,
/// say) can point at the same host callback and id cache.
pub struct ConversionContext<S: BackingStore<Vec<u8>, Error = Infallible>> {
    buffers: ObjectPool<Vec<u8>, S>,
    resolver: Arc<ServiceIdResolver>,
}

impl ConversionContext<LocalStore<Vec<u8>>> {
    pub fn local(config: &PoolConfig, resolver: Arc<ServiceIdResolver>) -> Self {
        let capacity = config.scratch_capacity;
        let buffers = ObjectPool::local(config.initial_size, move || Vec::with_capacity(capacity));
        Self::from_parts(buffers, resolver)
    }
}

impl ConversionContext<SharedStore<Vec<u8>>> {
    pub fn concurrent(config: &PoolConfig, resolver: Arc<ServiceIdResolver>) -> Self {
        let capacity = config.scratch_capacity;
        let buffers =
            ObjectPool::concurrent(config.initial_size, move || Vec::with_capacity(capacity));
        Self::from_parts(buffers, resolver)
    }
}

impl<S: BackingStore<Vec<u8>, Error = Infallible>> ConversionContext<S> {
    pub fn from_parts(buffers: ObjectPool<Vec<u8>, S>, resolver: Arc<ServiceIdResolver>) -> Self {
        debug!(
            kind = %buffers.kind(),
            available = buffers.available(),
            "conversion context ready"
        );
        Self { buffers, resolver }
    }

    /// Run `f` with an empty scratch buffer borrowed from the pool.
    ///
    /// The buffer is cleared and returned to the pool afterwards whether `f`
    /// succeeds, fails or panics.
    pub fn with_scratch<R, E, F>(&self, f: F) -> Result<R, E>
    where
        F: FnOnce(&mut Vec<u8>) -> Result<R, E>,
    {
        let mut buffer = self.buffers.checkout();
        // A panicking routine may have released it dirty
        buffer.clear();
        let result = f(&mut *buffer);
        buffer.clear();
        result
    }

    /// Numeric id for `service_name`, failing this message if unresolved.
    pub fn service_id(&self, service_name: &str) -> ConversionResult<ServiceId> {
        self.resolver.resolve(service_name)
    }

    /// Pre-warm the scratch pool ahead of an expected burst.
    pub fn grow_scratch(&self, count: usize) {
        self.buffers.grow_pool(count);
    }

    pub fn scratch_stats(&self) -> PoolStats {
        self.buffers.stats()
    }

    pub fn resolver(&self) -> &Arc<ServiceIdResolver> {
        &self.resolver
    }
}

impl<S: BackingStore<Vec<u8>, Error = Infallible>> fmt::Debug for ConversionContext<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionContext")
            .field("buffers", &self.buffers)
            .field("resolver", &self.resolver)
            .finish()
    }
}
