use super::{ResolutionOutcome, ServiceId, ServiceNameToIdCallback, ServiceNameToIdEvent};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

/// Map-backed service directory the host can register as its callback.
///
/// The host keeps it current (from session negotiation, configuration or a
/// directory feed) through [`insert`](Self::insert) and
/// [`remove`](Self::remove); share it as `Arc<ServiceDirectory>` to update
/// it after registration. Every change bumps the directory's generation,
/// which makes resolvers drop the ids they cached from it.
#[derive(Debug, Default)]
pub struct ServiceDirectory {
    services: RwLock<HashMap<String, ServiceId>>,
    generation: AtomicU64,
}

impl ServiceDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Map `name` to `service_id`, returning the previous id if any.
    pub fn insert(&self, name: impl Into<String>, service_id: ServiceId) -> Option<ServiceId> {
        let mut services = self.services.write();
        let previous = services.insert(name.into(), service_id);
        if previous != Some(service_id) {
            self.generation.fetch_add(1, Ordering::AcqRel);
        }
        previous
    }

    pub fn remove(&self, name: &str) -> Option<ServiceId> {
        let mut services = self.services.write();
        let removed = services.remove(name);
        if removed.is_some() {
            self.generation.fetch_add(1, Ordering::AcqRel);
        }
        removed
    }

    pub fn get(&self, name: &str) -> Option<ServiceId> {
        self.services.read().get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.services.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.services.read().is_empty()
    }
}

impl<S: Into<String>> FromIterator<(S, ServiceId)> for ServiceDirectory {
    fn from_iter<I: IntoIterator<Item = (S, ServiceId)>>(iter: I) -> Self {
        let services = iter
            .into_iter()
            .map(|(name, id)| (name.into(), id))
            .collect();
        Self {
            services: RwLock::new(services),
            generation: AtomicU64::new(0),
        }
    }
}

impl ServiceNameToIdCallback for ServiceDirectory {
    fn resolve(&self, event: &mut ServiceNameToIdEvent<'_>) -> ResolutionOutcome {
        match self.get(event.service_name()) {
            Some(service_id) => {
                event.set_service_id(service_id);
                ResolutionOutcome::Success
            }
            None => ResolutionOutcome::Failure,
        }
    }

    fn generation(&self) -> Option<u64> {
        Some(self.generation.load(Ordering::Acquire))
    }
}
