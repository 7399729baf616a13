use super::{
    ResolutionOutcome, ServiceId, ServiceNameToIdCallback, ServiceNameToIdEvent,
};
use crate::config::ResolutionConfig;
use crate::error::{ConversionError, ConversionResult};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// Converter-side consumer of the resolution protocol.
///
/// Holds at most one registered callback plus a cache of ids the callback
/// already produced. The cache is only used for callbacks that report a
/// [`generation`](ServiceNameToIdCallback::generation), and is emptied as
/// soon as that generation moves, so a host-side change (a removed or
/// renumbered service) is seen by the next message. Failures are never
/// cached.
///
/// Share one resolver between converter threads with `Arc`; the callback is
/// then invoked concurrently.
pub struct ServiceIdResolver {
    callback: Option<Arc<dyn ServiceNameToIdCallback>>,
    cache: Option<RwLock<IdCache>>,
}

/// Ids produced by the callback while it reported `generation`.
#[derive(Debug, Default)]
struct IdCache {
    generation: u64,
    ids: HashMap<String, ServiceId>,
}

impl ServiceIdResolver {
    /// Resolver without a callback; every lookup fails until one is set.
    pub fn new(config: &ResolutionConfig) -> Self {
        Self {
            callback: None,
            cache: config.cache_service_ids.then(|| RwLock::new(IdCache::default())),
        }
    }

    /// Register `callback`, replacing any previous one.
    pub fn with_callback<C>(self, callback: C) -> Self
    where
        C: ServiceNameToIdCallback + 'static,
    {
        self.with_shared_callback(Arc::new(callback))
    }

    /// Register a callback the host keeps a handle to, e.g. an
    /// `Arc<ServiceDirectory>` it updates later.
    pub fn with_shared_callback(mut self, callback: Arc<dyn ServiceNameToIdCallback>) -> Self {
        self.callback = Some(callback);
        if let Some(cache) = self.cache.as_mut() {
            *cache.get_mut() = IdCache::default();
        }
        self
    }

    /// Register a closure as the callback.
    pub fn with_fn<F>(self, callback: F) -> Self
    where
        F: Fn(&mut ServiceNameToIdEvent<'_>) -> ResolutionOutcome + Send + Sync + 'static,
    {
        self.with_callback(callback)
    }

    pub fn has_callback(&self) -> bool {
        self.callback.is_some()
    }

    /// Resolve `service_name`, failing the message on any resolution failure.
    pub fn resolve(&self, service_name: &str) -> ConversionResult<ServiceId> {
        let Some(callback) = self.callback.as_deref() else {
            debug!(service_name, "no service name to id callback registered");
            return Err(ConversionError::no_callback(service_name));
        };

        // Read before the callback runs, so a cached id is never newer
        // than the generation it is filed under.
        let generation = callback.generation();
        if let Some(service_id) = generation.and_then(|g| self.cached(service_name, g)) {
            return Ok(service_id);
        }

        let mut event = ServiceNameToIdEvent::new(service_name);
        match callback.resolve(&mut event) {
            ResolutionOutcome::Success => match event.service_id() {
                Some(service_id) => {
                    trace!(service_name, service_id, "service id resolved");
                    if let Some(generation) = generation {
                        self.remember(service_name, service_id, generation);
                    }
                    Ok(service_id)
                }
                None => {
                    warn!(service_name, "callback reported success without a service id");
                    Err(ConversionError::missing_id(service_name))
                }
            },
            ResolutionOutcome::Failure => {
                debug!(service_name, "service name could not be resolved");
                Err(ConversionError::callback_failure(service_name))
            }
        }
    }

    /// Outcome/id pair view of [`resolve`](Self::resolve).
    ///
    /// The id is `Some` exactly when the outcome is `Success`.
    pub fn lookup(&self, service_name: &str) -> (ResolutionOutcome, Option<ServiceId>) {
        match self.resolve(service_name) {
            Ok(service_id) => (ResolutionOutcome::Success, Some(service_id)),
            Err(_) => (ResolutionOutcome::Failure, None),
        }
    }

    /// Drop the cached id for `service_name`, returning it.
    pub fn invalidate(&self, service_name: &str) -> Option<ServiceId> {
        self.cache
            .as_ref()
            .and_then(|cache| cache.write().ids.remove(service_name))
    }

    /// Drop every cached id, e.g. after the host's directory was replaced.
    pub fn clear_cache(&self) {
        if let Some(cache) = &self.cache {
            cache.write().ids.clear();
        }
    }

    /// Number of cached mappings.
    pub fn cached_len(&self) -> usize {
        self.cache.as_ref().map_or(0, |cache| cache.read().ids.len())
    }

    fn cached(&self, service_name: &str, generation: u64) -> Option<ServiceId> {
        let cache = self.cache.as_ref()?.read();
        if cache.generation != generation {
            return None;
        }
        cache.ids.get(service_name).copied()
    }

    fn remember(&self, service_name: &str, service_id: ServiceId, generation: u64) {
        let Some(cache) = &self.cache else {
            return;
        };

        let mut cache = cache.write();
        if generation < cache.generation {
            // Answer from before a change another thread already saw
            return;
        }
        if generation > cache.generation {
            trace!(generation, stale = cache.ids.len(), "service directory changed");
            cache.ids.clear();
            cache.generation = generation;
        }
        cache.ids.insert(service_name.to_string(), service_id);
    }
}

impl Default for ServiceIdResolver {
    fn default() -> Self {
        Self::new(&ResolutionConfig::default())
    }
}

impl fmt::Debug for ServiceIdResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceIdResolver")
            .field("has_callback", &self.has_callback())
            .field("caching", &self.cache.is_some())
            .field("cached", &self.cached_len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolution::ServiceDirectory;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Host mapping knowing only DIRECT_FEED, with a fixed generation.
    struct DirectFeedOnly {
        calls: Arc<AtomicUsize>,
    }

    impl ServiceNameToIdCallback for DirectFeedOnly {
        fn resolve(&self, event: &mut ServiceNameToIdEvent<'_>) -> ResolutionOutcome {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if event.service_name() == "DIRECT_FEED" {
                event.set_service_id(5);
                ResolutionOutcome::Success
            } else {
                ResolutionOutcome::Failure
            }
        }

        fn generation(&self) -> Option<u64> {
            Some(1)
        }
    }

    fn direct_feed_only(calls: Arc<AtomicUsize>) -> ServiceIdResolver {
        ServiceIdResolver::default().with_callback(DirectFeedOnly { calls })
    }

    #[test]
    fn test_success_path() {
        let resolver = direct_feed_only(Arc::new(AtomicUsize::new(0)));
        assert_eq!(resolver.resolve("DIRECT_FEED"), Ok(5));
        assert_eq!(
            resolver.lookup("DIRECT_FEED"),
            (ResolutionOutcome::Success, Some(5))
        );
    }

    #[test]
    fn test_failure_path() {
        let resolver = direct_feed_only(Arc::new(AtomicUsize::new(0)));
        assert_eq!(
            resolver.resolve("UNKNOWN_FEED"),
            Err(ConversionError::callback_failure("UNKNOWN_FEED"))
        );
        assert_eq!(
            resolver.lookup("UNKNOWN_FEED"),
            (ResolutionOutcome::Failure, None)
        );
    }

    #[test]
    fn test_no_callback_fails_like_callback_failure() {
        let resolver = ServiceIdResolver::default();
        assert!(!resolver.has_callback());
        assert_eq!(
            resolver.lookup("DIRECT_FEED"),
            (ResolutionOutcome::Failure, None)
        );
        assert!(matches!(
            resolver.resolve("DIRECT_FEED"),
            Err(ConversionError::ServiceNotFound { .. })
        ));
    }

    #[test]
    fn test_success_is_cached() {
        let calls = Arc::new(AtomicUsize::new(0));
        let resolver = direct_feed_only(Arc::clone(&calls));

        for _ in 0..3 {
            assert_eq!(resolver.resolve("DIRECT_FEED"), Ok(5));
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(resolver.cached_len(), 1);

        assert_eq!(resolver.invalidate("DIRECT_FEED"), Some(5));
        assert_eq!(resolver.resolve("DIRECT_FEED"), Ok(5));
        assert_eq!(calls.load(Ordering::SeqCst), 2);

        resolver.clear_cache();
        assert_eq!(resolver.cached_len(), 0);
        assert_eq!(resolver.resolve("DIRECT_FEED"), Ok(5));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_failure_is_not_cached() {
        let calls = Arc::new(AtomicUsize::new(0));
        let resolver = direct_feed_only(Arc::clone(&calls));

        assert!(resolver.resolve("UNKNOWN_FEED").is_err());
        assert!(resolver.resolve("UNKNOWN_FEED").is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(resolver.cached_len(), 0);
    }

    #[test]
    fn test_cache_disabled_calls_every_time() {
        let calls = Arc::new(AtomicUsize::new(0));
        let config = ResolutionConfig {
            cache_service_ids: false,
        };
        let resolver = ServiceIdResolver::new(&config).with_callback(DirectFeedOnly {
            calls: Arc::clone(&calls),
        });

        assert_eq!(resolver.resolve("DIRECT_FEED"), Ok(5));
        assert_eq!(resolver.resolve("DIRECT_FEED"), Ok(5));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(resolver.cached_len(), 0);
    }

    #[test]
    fn test_untracked_callback_is_never_cached() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counted = Arc::clone(&calls);
        let resolver = ServiceIdResolver::default().with_fn(move |event| {
            counted.fetch_add(1, Ordering::SeqCst);
            event.set_service_id(7);
            ResolutionOutcome::Success
        });

        assert_eq!(resolver.resolve("A"), Ok(7));
        assert_eq!(resolver.resolve("A"), Ok(7));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(resolver.cached_len(), 0);
    }

    #[test]
    fn test_success_without_id_is_failure() {
        let resolver = ServiceIdResolver::default().with_fn(|_event| ResolutionOutcome::Success);
        assert_eq!(
            resolver.resolve("DIRECT_FEED"),
            Err(ConversionError::missing_id("DIRECT_FEED"))
        );
        assert_eq!(resolver.cached_len(), 0);
    }

    #[test]
    fn test_failure_ignores_id_written_by_callback() {
        let resolver = ServiceIdResolver::default().with_fn(|event| {
            event.set_service_id(99);
            ResolutionOutcome::Failure
        });
        assert_eq!(
            resolver.lookup("DIRECT_FEED"),
            (ResolutionOutcome::Failure, None)
        );
    }

    #[test]
    fn test_shared_directory_sees_host_updates() {
        let directory = Arc::new(ServiceDirectory::new());
        let resolver = ServiceIdResolver::default()
            .with_shared_callback(Arc::clone(&directory) as Arc<dyn ServiceNameToIdCallback>);

        assert!(resolver.resolve("DIRECT_FEED").is_err());
        directory.insert("DIRECT_FEED", 5);
        assert_eq!(resolver.resolve("DIRECT_FEED"), Ok(5));
        assert_eq!(resolver.cached_len(), 1);

        // Renumbered by the host: seen on the next lookup
        directory.insert("DIRECT_FEED", 6);
        assert_eq!(resolver.resolve("DIRECT_FEED"), Ok(6));
    }

    #[test]
    fn test_removed_service_stops_resolving() {
        let directory = Arc::new(ServiceDirectory::new());
        directory.insert("DIRECT_FEED", 5);
        directory.insert("ELEKTRON_DD", 257);
        let resolver = ServiceIdResolver::default()
            .with_shared_callback(Arc::clone(&directory) as Arc<dyn ServiceNameToIdCallback>);

        assert_eq!(resolver.resolve("DIRECT_FEED"), Ok(5));
        assert_eq!(resolver.resolve("ELEKTRON_DD"), Ok(257));
        assert_eq!(resolver.cached_len(), 2);

        directory.remove("DIRECT_FEED");
        assert_eq!(
            resolver.resolve("DIRECT_FEED"),
            Err(ConversionError::callback_failure("DIRECT_FEED"))
        );
        // Entries from before the change are re-fetched, not served
        assert_eq!(resolver.resolve("ELEKTRON_DD"), Ok(257));
        assert_eq!(resolver.cached_len(), 1);
    }

    #[test]
    fn test_replacing_callback_starts_a_fresh_cache() {
        let busy: ServiceDirectory = ServiceDirectory::new();
        for (name, id) in [("A", 1), ("B", 2), ("DIRECT_FEED", 5)] {
            busy.insert(name, id);
        }
        let resolver = ServiceIdResolver::default().with_callback(busy);
        assert_eq!(resolver.resolve("DIRECT_FEED"), Ok(5));

        // Younger directory: lower generation than the one cached above
        let fresh: ServiceDirectory = [("DIRECT_FEED", 9)].into_iter().collect();
        let resolver = resolver.with_callback(fresh);
        assert_eq!(resolver.cached_len(), 0);
        assert_eq!(resolver.resolve("DIRECT_FEED"), Ok(9));
        assert_eq!(resolver.cached_len(), 1);
    }
}
