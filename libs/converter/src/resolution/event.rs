use super::ServiceId;
use std::fmt;

/// Result of one resolution callback invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResolutionOutcome {
    /// The event's id slot holds the service id.
    Success,
    /// No mapping exists; the id slot is meaningless.
    Failure,
}

impl ResolutionOutcome {
    #[inline]
    pub fn is_success(self) -> bool {
        matches!(self, ResolutionOutcome::Success)
    }
}

impl fmt::Display for ResolutionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolutionOutcome::Success => write!(f, "SUCCESS"),
            ResolutionOutcome::Failure => write!(f, "FAILURE"),
        }
    }
}

/// Per-invocation request to map a service name to its id.
///
/// The event borrows the name from the message being converted and lives
/// only for the duration of one callback call; the callback gets
/// `&mut ServiceNameToIdEvent<'_>` and cannot keep it.
#[derive(Debug)]
pub struct ServiceNameToIdEvent<'a> {
    service_name: &'a str,
    service_id: Option<ServiceId>,
}

impl<'a> ServiceNameToIdEvent<'a> {
    pub fn new(service_name: &'a str) -> Self {
        Self {
            service_name,
            service_id: None,
        }
    }

    /// Name being resolved.
    pub fn service_name(&self) -> &str {
        self.service_name
    }

    /// Populate the id slot. Pair with [`ResolutionOutcome::Success`].
    pub fn set_service_id(&mut self, service_id: ServiceId) {
        self.service_id = Some(service_id);
    }

    /// Id written by the callback, if any.
    pub fn service_id(&self) -> Option<ServiceId> {
        self.service_id
    }
}
