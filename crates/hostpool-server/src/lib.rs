//! Host pool scheduling server.
//!
//! This crate puts a single scheduling API in front of a roster of upstream
//! accounts:
//!
//! - [`Aggregator`] - Fans availability queries out and merges union slots
//! - [`SlotVerifier`] - Re-checks one host's exact slot at booking time
//! - [`BookingAssignor`] - Picks a host by priority and books, with link fallback
//! - [`HostPool`] - Wires the above around one shared resolver
//! - [`server`] - axum router and listener
//!
//! # Architecture
//!
//! ```text
//!   GET /availability        POST /book
//!          │                      │
//!          ▼                      ▼
//!    ┌────────────┐        ┌────────────────┐     ┌──────────────┐
//!    │ Aggregator │        │ BookingAssignor│────▶│ SlotVerifier │
//!    └─────┬──────┘        └───────┬────────┘     └──────┬───────┘
//!          │                       │                     │
//!          └───────────────┬───────┴─────────────────────┘
//!                          ▼
//!              Arc<EventTypeResolver> ──▶ SchedulingProvider
//! ```

pub mod aggregate;
pub mod assign;
pub mod cli;
pub mod config;
pub mod error;
pub mod handlers;
pub mod pool;
pub mod routes;
pub mod server;
pub mod verify;

pub use aggregate::{Aggregator, merge_slots};
pub use assign::{BookingAssignor, select_host};
pub use config::ServerConfig;
pub use error::{BookingError, ServerError, ServerResult};
pub use pool::{HostCheck, HostPool, PoolPolicy};
pub use server::{AppState, app, start_server};
pub use verify::SlotVerifier;
