use super::{ResolutionOutcome, ServiceNameToIdEvent};

/// Host-supplied mapping from service name to service id.
///
/// Invoked synchronously on the converting thread. Converters running on
/// several threads may call one callback concurrently, hence `Send + Sync`.
/// Implementations must answer without blocking on I/O: conversion sits on
/// a latency-sensitive path.
///
/// Any matching function or closure is a callback:
///
/// ```rust
/// use converter::{ResolutionOutcome, ServiceNameToIdCallback, ServiceNameToIdEvent};
///
/// fn direct_feed(event: &mut ServiceNameToIdEvent<'_>) -> ResolutionOutcome {
///     if event.service_name() == "DIRECT_FEED" {
///         event.set_service_id(5);
///         ResolutionOutcome::Success
///     } else {
///         ResolutionOutcome::Failure
///     }
/// }
///
/// let mut event = ServiceNameToIdEvent::new("DIRECT_FEED");
/// assert_eq!(direct_feed.resolve(&mut event), ResolutionOutcome::Success);
/// assert_eq!(event.service_id(), Some(5));
/// ```
pub trait ServiceNameToIdCallback: Send + Sync {
    /// Write the id into `event` and return `Success`, or return `Failure`.
    fn resolve(&self, event: &mut ServiceNameToIdEvent<'_>) -> ResolutionOutcome;

    /// Version of the mapping behind this callback.
    ///
    /// Must change whenever an answer could change. The converter caches
    /// ids only for callbacks that report a generation and drops them all
    /// once it moves; `None` means every lookup goes to the callback.
    fn generation(&self) -> Option<u64> {
        None
    }
}

impl<F> ServiceNameToIdCallback for F
where
    F: Fn(&mut ServiceNameToIdEvent<'_>) -> ResolutionOutcome + Send + Sync,
{
    fn resolve(&self, event: &mut ServiceNameToIdEvent<'_>) -> ResolutionOutcome {
        self(event)
    }
}
