//! # Conversion Support Layer
//!
//! ## Purpose
//!
//! Support pieces for the converter translating between the textual
//! name/value message representation and the binary wire representation:
//! - Scratch buffer reuse on the conversion hot path (via the `pool` crate)
//! - Service name → numeric service id resolution delegated to the host
//!   application through a registered callback
//!
//! ## Architecture Role
//!
//! ```text
//! Textual Message → [ConversionContext] → Binary Encoder
//!       ↓                  ↓                    ↓
//!  "DIRECT_FEED"    ServiceIdResolver       service id 5
//!                          ↓
//!               host ServiceNameToIdCallback
//! ```
//!
//! ## Resolution Contract
//!
//! The converter owns no service directory. When a message names a service
//! whose id is not cached, the resolver builds a [`ServiceNameToIdEvent`],
//! calls the host's callback synchronously on the calling thread and:
//! - **Success**: reads the id from the event; it is cached only while the
//!   callback's [`generation`](ServiceNameToIdCallback::generation) stays put
//! - **Failure**: fails that one message with
//!   [`ConversionError::ServiceNotFound`]; no id is ever made up
//!
//! A resolver without a callback behaves exactly like one whose callback
//! always fails.
//!
//! ## What This Crate Does NOT Contain
//! - Wire-format encoders/decoders
//! - Transport, session or login handling

pub mod config;
pub mod context;
pub mod error;
pub mod resolution;

pub use config::{ConverterConfig, PoolConfig, ResolutionConfig};
pub use context::{ConversionContext, LocalContext, SharedContext};
pub use error::{ConversionError, ConversionResult};
pub use resolution::{
    ResolutionOutcome, ServiceDirectory, ServiceId, ServiceIdResolver, ServiceNameToIdCallback,
    ServiceNameToIdEvent,
};
