//! Calendly provider implementation.
//!
//! [`CalendlyClient`] implements [`SchedulingProvider`](crate::SchedulingProvider)
//! against the Calendly v2 REST API using per-host personal access tokens.
//!
//! # Endpoints used
//!
//! | operation | request |
//! |---|---|
//! | identity | `GET /users/me` |
//! | event types | `GET /event_types?user=…` (paginated) |
//! | availability | `GET /event_type_available_times` |
//! | direct booking | `POST /invitees` |
//! | fallback link | `POST /scheduling_links` |
//!
//! # Example
//!
//! ```ignore
//! use hostpool_providers::calendly::{CalendlyClient, CalendlyConfig};
//!
//! let client = CalendlyClient::new(CalendlyConfig::default())?;
//! let me = client.fetch_current_user(&token).await?;
//! ```

mod client;
mod config;

pub use client::CalendlyClient;
pub use config::CalendlyConfig;
