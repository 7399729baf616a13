//! Conversion-level errors surfaced to the converter's caller
//!
//! Every variant describes why one specific message could not be converted.
//! Pool exhaustion never shows up here: pools manufacture on a miss.

use thiserror::Error;

/// Errors failing the conversion of a single message
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConversionError {
    /// Service name could not be mapped to a numeric service id
    #[error("Service not found: '{service_name}' has no service id ({cause})")]
    ServiceNotFound {
        service_name: String,
        cause: String,
    },

    /// Configuration value is unusable
    #[error("Invalid converter configuration: {field} {reason}")]
    InvalidConfig { field: String, reason: String },
}

impl ConversionError {
    /// No callback registered to resolve `service_name`
    pub fn no_callback(service_name: impl Into<String>) -> Self {
        Self::ServiceNotFound {
            service_name: service_name.into(),
            cause: "no service name to id callback registered".to_string(),
        }
    }

    /// Registered callback reported failure for `service_name`
    pub fn callback_failure(service_name: impl Into<String>) -> Self {
        Self::ServiceNotFound {
            service_name: service_name.into(),
            cause: "callback reported no matching service".to_string(),
        }
    }

    /// Callback reported success but left the id slot empty
    pub fn missing_id(service_name: impl Into<String>) -> Self {
        Self::ServiceNotFound {
            service_name: service_name.into(),
            cause: "callback reported success without setting a service id".to_string(),
        }
    }

    pub fn invalid_config(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Service name carried by a resolution failure
    pub fn service_name(&self) -> Option<&str> {
        match self {
            Self::ServiceNotFound { service_name, .. } => Some(service_name),
            Self::InvalidConfig { .. } => None,
        }
    }
}

/// Result type for conversion operations
pub type ConversionResult<T> = std::result::Result<T, ConversionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_not_found_display() {
        let err = ConversionError::callback_failure("UNKNOWN_FEED");
        assert_eq!(
            err.to_string(),
            "Service not found: 'UNKNOWN_FEED' has no service id (callback reported no matching service)"
        );
        assert_eq!(err.service_name(), Some("UNKNOWN_FEED"));
    }

    #[test]
    fn test_no_callback_is_service_not_found() {
        let err = ConversionError::no_callback("DIRECT_FEED");
        assert!(matches!(err, ConversionError::ServiceNotFound { .. }));
        assert!(err.to_string().contains("no service name to id callback registered"));
    }

    #[test]
    fn test_invalid_config_has_no_service_name() {
        let err = ConversionError::invalid_config("pool.scratch_capacity", "must be greater than zero");
        assert_eq!(err.service_name(), None);
        assert_eq!(
            err.to_string(),
            "Invalid converter configuration: pool.scratch_capacity must be greater than zero"
        );
    }
}
