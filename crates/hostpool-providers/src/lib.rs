//! Upstream scheduling client and event-type resolution.
//!
//! This crate is everything that talks to the scheduling provider:
//!
//! - [`SchedulingProvider`] - The trait the pool logic depends on
//! - [`CalendlyClient`] - The HTTP implementation of that trait
//! - [`EventTypeResolver`] - Host → provider event type, cached per process
//! - [`CredentialStore`] - Per-host access tokens from the environment
//! - [`ProviderError`] - Error type for all of the above
//!
//! # Architecture
//!
//! ```text
//!   Aggregator / Verifier / Assignor
//!                 │
//!                 ▼
//!        ┌──────────────────┐     ┌─────────────────┐
//!        │ EventTypeResolver│────▶│ CredentialStore │
//!        └────────┬─────────┘     └─────────────────┘
//!                 │ Arc<dyn SchedulingProvider>
//!                 ▼
//!        ┌──────────────────┐
//!        │  CalendlyClient  │──── call(credential, method, path, body)
//!        └──────────────────┘
//! ```

pub mod calendly;
pub mod credentials;
pub mod error;
pub mod provider;
pub mod resolver;
#[cfg(any(test, feature = "testing"))]
pub mod testing;

// Re-export main types at crate root
pub use calendly::{CalendlyClient, CalendlyConfig};
pub use credentials::CredentialStore;
pub use error::{ProviderError, ProviderErrorCode, ProviderResult};
pub use provider::{
    AvailabilityQuery, AvailableTime, BoxFuture, EventTypeInfo, InviteeBooking, InviteeDetails,
    SchedulingLink, SchedulingProvider, UserInfo,
};
pub use resolver::{EventTypeCache, EventTypeResolver};
