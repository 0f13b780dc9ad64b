//! Server error types.

use std::io;

use hostpool_core::{TracingError, WindowError};
use hostpool_providers::ProviderError;
use thiserror::Error;

/// Result type for server operations.
pub type ServerResult<T> = Result<T, ServerError>;

/// Errors that can occur while starting or running the server.
#[derive(Debug, Error)]
pub enum ServerError {
    /// IO error (config file, listener).
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Configuration error.
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Provider setup error.
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Logging setup error.
    #[error("Tracing error: {0}")]
    Tracing(#[from] TracingError),
}

impl ServerError {
    /// Creates a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }
}

/// Why a booking request did not produce an outcome.
#[derive(Debug, Error)]
pub enum BookingError {
    /// Required request fields are absent or blank.
    #[error("missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),

    /// The requested instants are unparseable or inverted.
    #[error("invalid slot: {0}")]
    InvalidSlot(#[from] WindowError),

    /// No host currently offers the exact slot.
    #[error("no host has the slot {start} to {end}")]
    NoAvailability { start: String, end: String },

    /// The provider refused or failed the reservation (and any fallback).
    #[error("upstream booking failed: {0}")]
    Upstream(#[from] ProviderError),
}

impl BookingError {
    /// Returns true for failures caused by the caller's input.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::MissingFields(_) | Self::InvalidSlot(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_message_lists_fields() {
        let err = BookingError::MissingFields(vec!["start_time", "invitee.email"]);
        assert_eq!(
            err.to_string(),
            "missing required fields: start_time, invitee.email"
        );
        assert!(err.is_validation());
    }

    #[test]
    fn upstream_is_not_validation() {
        let err = BookingError::from(ProviderError::upstream(500, "boom"));
        assert!(!err.is_validation());
        assert!(err.to_string().contains("500"));
    }

    #[test]
    fn config_error_message() {
        let err = ServerError::config("no hosts configured");
        assert_eq!(err.to_string(), "Configuration error: no hosts configured");
    }
}
