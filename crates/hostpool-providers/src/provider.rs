//! SchedulingProvider trait definition.
//!
//! This module defines the [`SchedulingProvider`] trait, the seam between the
//! pool logic and the upstream scheduling service. Every method takes the
//! credential of the host it acts for; providers hold no per-host state.

use std::future::Future;
use std::pin::Pin;

use chrono::{DateTime, Utc};
use hostpool_core::TimeWindow;
use hostpool_core::time::canonical_instant;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ProviderResult;

/// The identity behind a credential.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UserInfo {
    /// Provider URI of the user, used to scope event-type listings.
    pub uri: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub scheduling_url: Option<String>,
}

/// One bookable event type owned by a user.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EventTypeInfo {
    /// Provider-internal identifier.
    pub uri: String,
    /// Public scheduling URL, matched against `Host::event_type_uri`.
    #[serde(default)]
    pub scheduling_url: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub active: Option<bool>,
    /// Configured meeting length in minutes.
    #[serde(default)]
    pub duration: Option<u32>,
}

/// One start time reported by the availability endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AvailableTime {
    #[serde(with = "canonical_instant")]
    pub start_time: DateTime<Utc>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub invitees_remaining: Option<u32>,
    #[serde(default)]
    pub scheduling_url: Option<String>,
}

/// Parameters of an availability query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvailabilityQuery {
    pub event_type: String,
    pub window: TimeWindow,
    pub timezone: String,
}

impl AvailabilityQuery {
    pub fn new(event_type: impl Into<String>, window: TimeWindow, timezone: impl Into<String>) -> Self {
        Self {
            event_type: event_type.into(),
            window,
            timezone: timezone.into(),
        }
    }
}

/// The invitee half of a direct reservation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InviteeDetails {
    pub name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
}

/// A direct reservation request for one exact slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InviteeBooking {
    pub event_type: String,
    #[serde(with = "canonical_instant")]
    pub start_time: DateTime<Utc>,
    #[serde(with = "canonical_instant")]
    pub end_time: DateTime<Utc>,
    pub invitee: InviteeDetails,
}

/// A single- or limited-use booking link.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SchedulingLink {
    pub booking_url: String,
    #[serde(default)]
    pub owner: Option<String>,
    #[serde(default)]
    pub owner_type: Option<String>,
}

/// A boxed future for async trait methods.
///
/// Boxed futures keep the trait object-safe so the pool can hold an
/// `Arc<dyn SchedulingProvider>`.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// The upstream scheduling service as seen by the pool.
///
/// Implementations translate each call into one or more upstream requests
/// authenticated with `credential`. Failures are reported, never retried.
pub trait SchedulingProvider: Send + Sync {
    /// Returns the provider's name (e.g. "calendly").
    fn name(&self) -> &str;

    /// Fetches the identity the credential belongs to.
    fn current_user<'a>(&'a self, credential: &'a str) -> BoxFuture<'a, ProviderResult<UserInfo>>;

    /// Lists every event type owned by `user_uri`, across all pages.
    fn list_event_types<'a>(
        &'a self,
        credential: &'a str,
        user_uri: &'a str,
    ) -> BoxFuture<'a, ProviderResult<Vec<EventTypeInfo>>>;

    /// Lists the start times the event type has free within the query window.
    fn available_times<'a>(
        &'a self,
        credential: &'a str,
        query: AvailabilityQuery,
    ) -> BoxFuture<'a, ProviderResult<Vec<AvailableTime>>>;

    /// Books an invitee directly. Returns the provider's booking record.
    fn create_invitee<'a>(
        &'a self,
        credential: &'a str,
        booking: &'a InviteeBooking,
    ) -> BoxFuture<'a, ProviderResult<Value>>;

    /// Creates a booking link for the event type usable `max_event_count` times.
    fn create_scheduling_link<'a>(
        &'a self,
        credential: &'a str,
        event_type: &'a str,
        max_event_count: u32,
    ) -> BoxFuture<'a, ProviderResult<SchedulingLink>>;
}
