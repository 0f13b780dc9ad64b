//! Error types for upstream provider operations.
//!
//! Every failure that can happen while talking to the scheduling provider, or
//! while preparing to talk to it, is a [`ProviderError`]. The
//! [`ProviderErrorCode`] tells callers which class of failure they are
//! looking at; upstream rejections additionally carry the HTTP status and
//! raw response body so operators can see exactly what the provider said.

use std::fmt;
use thiserror::Error;

/// The category of a provider error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderErrorCode {
    /// The host is misconfigured, e.g. its credential variable is unset.
    Configuration,
    /// The host's event type could not be found among its event types.
    NotFound,
    /// The provider answered with a non-success status.
    Upstream,
    /// The request never produced a response (connect, timeout, DNS).
    Network,
    /// The provider answered 2xx with a body we could not understand.
    InvalidResponse,
}

impl ProviderErrorCode {
    /// Returns a stable snake_case name for this error code.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Configuration => "configuration_error",
            Self::NotFound => "not_found",
            Self::Upstream => "upstream_error",
            Self::Network => "network_error",
            Self::InvalidResponse => "invalid_response",
        }
    }
}

impl fmt::Display for ProviderErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An error that occurred while interacting with the scheduling provider.
#[derive(Debug, Error)]
pub struct ProviderError {
    code: ProviderErrorCode,
    message: String,
    /// Host the failing operation was made for, if known.
    host: Option<String>,
    /// HTTP status of an upstream rejection.
    status: Option<u16>,
    /// Raw body of an upstream rejection.
    body: Option<String>,
    /// Scheduling URLs observed while looking for a host's event type.
    seen_scheduling_urls: Vec<String>,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl ProviderError {
    /// Creates a new provider error with the given code and message.
    pub fn new(code: ProviderErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            host: None,
            status: None,
            body: None,
            seen_scheduling_urls: Vec::new(),
            source: None,
        }
    }

    /// Creates a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::Configuration, message)
    }

    /// Creates a generic not found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::NotFound, message)
    }

    /// Creates the error returned when no event type matches `expected`.
    pub fn event_type_not_found(expected: &str, seen: Vec<String>) -> Self {
        let mut err = Self::not_found(format!(
            "no event type with scheduling url {expected} (seen: [{}])",
            seen.join(", ")
        ));
        err.seen_scheduling_urls = seen;
        err
    }

    /// Creates an upstream rejection carrying the status and raw body.
    pub fn upstream(status: u16, body: impl Into<String>) -> Self {
        let body = body.into();
        let mut err = Self::new(
            ProviderErrorCode::Upstream,
            format!("provider returned {status}: {body}"),
        );
        err.status = Some(status);
        err.body = Some(body);
        err
    }

    /// Creates a network error.
    pub fn network(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::Network, message)
    }

    /// Creates an invalid response error.
    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::InvalidResponse, message)
    }

    /// Sets the host this error relates to.
    pub fn with_host(mut self, host_id: impl Into<String>) -> Self {
        self.host = Some(host_id.into());
        self
    }

    /// Sets the source error for this error.
    pub fn with_source<E>(mut self, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        self.source = Some(Box::new(source));
        self
    }

    /// Returns the error code.
    pub fn code(&self) -> ProviderErrorCode {
        self.code
    }

    /// Returns the error message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the host id, if set.
    pub fn host(&self) -> Option<&str> {
        self.host.as_deref()
    }

    /// Returns the HTTP status of an upstream rejection.
    pub fn status(&self) -> Option<u16> {
        self.status
    }

    /// Returns the raw body of an upstream rejection.
    pub fn body(&self) -> Option<&str> {
        self.body.as_deref()
    }

    /// Returns the scheduling URLs seen during a failed event-type lookup.
    pub fn seen_scheduling_urls(&self) -> &[String] {
        &self.seen_scheduling_urls
    }
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ref host) = self.host {
            write!(f, "[{}] ", host)?;
        }
        write!(f, "{}: {}", self.code, self.message)
    }
}

/// A specialized Result type for provider operations.
pub type ProviderResult<T> = Result<T, ProviderError>;
