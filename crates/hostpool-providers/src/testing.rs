//! In-memory [`SchedulingProvider`] for tests.
//!
//! Responses are registered per credential or event type up front, and every
//! call is recorded so tests can assert on what reached the "upstream".

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde_json::{Value, json};

use crate::error::{ProviderError, ProviderResult};
use crate::provider::{
    AvailabilityQuery, AvailableTime, BoxFuture, EventTypeInfo, InviteeBooking, SchedulingLink,
    SchedulingProvider, UserInfo,
};

#[derive(Debug, Default)]
struct FakeState {
    users: HashMap<String, UserInfo>,
    event_types: HashMap<String, Vec<EventTypeInfo>>,
    availability: HashMap<String, Vec<DateTime<Utc>>>,
    availability_errors: HashMap<String, u16>,
    booking_errors: HashMap<String, (u16, String)>,
    link_errors: HashMap<String, u16>,
    calls: Vec<String>,
}

/// A scripted provider.
#[derive(Debug, Default)]
pub struct FakeProvider {
    state: Mutex<FakeState>,
}

impl FakeProvider {
    pub fn new() -> Self {
        Self::default()
    }

    fn update(self, f: impl FnOnce(&mut FakeState)) -> Self {
        f(&mut self.state.lock().expect("fake provider lock"));
        self
    }

    /// Registers an account reachable with `credential` that owns one event
    /// type `event_type` published at `scheduling_url`.
    pub fn with_account(
        self,
        credential: &str,
        user_uri: &str,
        event_type: &str,
        scheduling_url: &str,
    ) -> Self {
        self.update(|s| {
            s.users.insert(
                credential.to_string(),
                UserInfo {
                    uri: user_uri.to_string(),
                    name: None,
                    scheduling_url: None,
                },
            );
            s.event_types
                .entry(user_uri.to_string())
                .or_default()
                .push(EventTypeInfo {
                    uri: event_type.to_string(),
                    scheduling_url: Some(scheduling_url.to_string()),
                    name: None,
                    active: Some(true),
                    duration: Some(30),
                });
        })
    }

    /// Adds free start times for an event type.
    pub fn with_available(self, event_type: &str, starts: &[DateTime<Utc>]) -> Self {
        self.update(|s| {
            s.availability
                .entry(event_type.to_string())
                .or_default()
                .extend_from_slice(starts);
        })
    }

    /// Makes availability queries for an event type fail with `status`.
    pub fn with_availability_error(self, event_type: &str, status: u16) -> Self {
        self.update(|s| {
            s.availability_errors.insert(event_type.to_string(), status);
        })
    }

    /// Makes direct bookings for an event type fail with `status`.
    pub fn with_booking_rejection(self, event_type: &str, status: u16, body: &str) -> Self {
        self.update(|s| {
            s.booking_errors
                .insert(event_type.to_string(), (status, body.to_string()));
        })
    }

    /// Makes link creation for an event type fail with `status`.
    pub fn with_link_error(self, event_type: &str, status: u16) -> Self {
        self.update(|s| {
            s.link_errors.insert(event_type.to_string(), status);
        })
    }

    /// Every call made so far, as `"<operation>:<subject>"`.
    pub fn calls(&self) -> Vec<String> {
        self.state.lock().expect("fake provider lock").calls.clone()
    }

    /// Number of recorded calls whose operation is `operation`.
    pub fn count(&self, operation: &str) -> usize {
        let prefix = format!("{operation}:");
        self.calls()
            .iter()
            .filter(|c| c.starts_with(&prefix))
            .count()
    }

    fn record(&self, call: String) {
        self.state.lock().expect("fake provider lock").calls.push(call);
    }

    fn user(&self, credential: &str) -> ProviderResult<UserInfo> {
        self.record(format!("current_user:{credential}"));
        let state = self.state.lock().expect("fake provider lock");
        state
            .users
            .get(credential)
            .cloned()
            .ok_or_else(|| ProviderError::upstream(401, r#"{"title":"Unauthenticated"}"#))
    }

    fn event_types(&self, user_uri: &str) -> Vec<EventTypeInfo> {
        self.record(format!("list_event_types:{user_uri}"));
        let state = self.state.lock().expect("fake provider lock");
        state.event_types.get(user_uri).cloned().unwrap_or_default()
    }

    fn times(&self, query: &AvailabilityQuery) -> ProviderResult<Vec<AvailableTime>> {
        self.record(format!("available_times:{}", query.event_type));
        let state = self.state.lock().expect("fake provider lock");
        if let Some(status) = state.availability_errors.get(&query.event_type) {
            return Err(ProviderError::upstream(*status, "availability failed"));
        }
        let times = state
            .availability
            .get(&query.event_type)
            .map(|starts| {
                starts
                    .iter()
                    .filter(|s| **s >= query.window.start && **s < query.window.end)
                    .map(|s| AvailableTime {
                        start_time: *s,
                        status: Some("available".to_string()),
                        invitees_remaining: Some(1),
                        scheduling_url: None,
                    })
                    .collect()
            })
            .unwrap_or_default();
        Ok(times)
    }

    fn book(&self, booking: &InviteeBooking) -> ProviderResult<Value> {
        self.record(format!("create_invitee:{}", booking.event_type));
        let state = self.state.lock().expect("fake provider lock");
        if let Some((status, body)) = state.booking_errors.get(&booking.event_type) {
            return Err(ProviderError::upstream(*status, body.clone()));
        }
        Ok(json!({
            "event_type": booking.event_type,
            "start_time": hostpool_core::canonical(&booking.start_time),
            "email": booking.invitee.email,
        }))
    }

    fn link(&self, event_type: &str, max_event_count: u32) -> ProviderResult<SchedulingLink> {
        self.record(format!("create_scheduling_link:{event_type}"));
        let state = self.state.lock().expect("fake provider lock");
        if let Some(status) = state.link_errors.get(event_type) {
            return Err(ProviderError::upstream(*status, "link creation failed"));
        }
        let slug = event_type.rsplit('/').next().unwrap_or_default();
        Ok(SchedulingLink {
            booking_url: format!("https://calendly.test/d/{slug}/{max_event_count}"),
            owner: Some(event_type.to_string()),
            owner_type: Some("EventType".to_string()),
        })
    }
}

impl SchedulingProvider for FakeProvider {
    fn name(&self) -> &str {
        "fake"
    }

    fn current_user<'a>(&'a self, credential: &'a str) -> BoxFuture<'a, ProviderResult<UserInfo>> {
        Box::pin(async move { self.user(credential) })
    }

    fn list_event_types<'a>(
        &'a self,
        _credential: &'a str,
        user_uri: &'a str,
    ) -> BoxFuture<'a, ProviderResult<Vec<EventTypeInfo>>> {
        Box::pin(async move { Ok(self.event_types(user_uri)) })
    }

    fn available_times<'a>(
        &'a self,
        _credential: &'a str,
        query: AvailabilityQuery,
    ) -> BoxFuture<'a, ProviderResult<Vec<AvailableTime>>> {
        Box::pin(async move { self.times(&query) })
    }

    fn create_invitee<'a>(
        &'a self,
        _credential: &'a str,
        booking: &'a InviteeBooking,
    ) -> BoxFuture<'a, ProviderResult<Value>> {
        Box::pin(async move { self.book(booking) })
    }

    fn create_scheduling_link<'a>(
        &'a self,
        _credential: &'a str,
        event_type: &'a str,
        max_event_count: u32,
    ) -> BoxFuture<'a, ProviderResult<SchedulingLink>> {
        Box::pin(async move { self.link(event_type, max_event_count) })
    }
}
