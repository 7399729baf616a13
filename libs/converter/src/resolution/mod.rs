//! Service name → service id resolution protocol
//!
//! The binary wire format identifies services by number while the textual
//! format carries names. The host application owns the mapping and answers
//! through a [`ServiceNameToIdCallback`]; [`ServiceIdResolver`] is the
//! converter-side consumer.

mod callback;
mod directory;
mod event;
mod resolver;

pub use callback::ServiceNameToIdCallback;
pub use directory::ServiceDirectory;
pub use event::{ResolutionOutcome, ServiceNameToIdEvent};
pub use resolver::ServiceIdResolver;

/// Numeric service identifier carried by the binary wire format.
pub type ServiceId = u16;
