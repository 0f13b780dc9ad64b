//! Booking assignment.
//!
//! A booking request goes to exactly one host:
//!
//! 1. the request is validated and its instants canonicalized
//! 2. every host is asked, concurrently, whether it still has the exact slot
//! 3. the eligible host with the highest `priority_weight` wins, ties going
//!    to the lowest `host_id`
//! 4. the invitee is booked directly with that host
//! 5. if the provider refuses with a fallback status, a single-use
//!    scheduling link for the same host is returned instead
//!
//! Another host is never tried after the winner is picked. Availability is
//! re-read right before booking, but two concurrent requests for the same
//! slot can still both pass verification; the provider settles that race.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures_util::future::join_all;
use hostpool_core::{
    BookingOutcome, BookingRequest, Host, WindowError, canonical, canonical_timezone, parse_field,
};
use hostpool_providers::{EventTypeResolver, InviteeBooking, InviteeDetails, ProviderError};
use tracing::{info, warn};

use crate::config::DEFAULT_FALLBACK_STATUSES;
use crate::error::BookingError;
use crate::verify::SlotVerifier;

/// A request that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
struct ValidBooking {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    name: String,
    email: String,
    timezone: Option<String>,
}

impl TryFrom<&BookingRequest> for ValidBooking {
    type Error = BookingError;

    fn try_from(request: &BookingRequest) -> Result<Self, Self::Error> {
        let missing = request.missing_fields();
        let (Some(raw_start), Some(raw_end), Some(invitee)) =
            (&request.start_time, &request.end_time, &request.invitee)
        else {
            return Err(BookingError::MissingFields(missing));
        };
        let (Some(name), Some(email)) = (&invitee.name, &invitee.email) else {
            return Err(BookingError::MissingFields(missing));
        };
        if !missing.is_empty() {
            return Err(BookingError::MissingFields(missing));
        }

        let start = parse_field("start_time", raw_start)?;
        let end = parse_field("end_time", raw_end)?;
        if end <= start {
            return Err(WindowError::Empty {
                start: canonical(&start),
                end: canonical(&end),
            }
            .into());
        }

        Ok(Self {
            start,
            end,
            name: name.trim().to_string(),
            email: email.trim().to_string(),
            timezone: request
                .timezone
                .as_deref()
                .map(str::trim)
                .filter(|tz| !tz.is_empty())
                .map(|tz| canonical_timezone(Some(tz), tz)),
        })
    }
}

/// Picks a host for each booking request and reserves the slot.
#[derive(Debug, Clone)]
pub struct BookingAssignor {
    hosts: Arc<[Host]>,
    resolver: Arc<EventTypeResolver>,
    verifier: SlotVerifier,
    fallback_statuses: Vec<u16>,
}

impl BookingAssignor {
    pub fn new(
        hosts: Arc<[Host]>,
        resolver: Arc<EventTypeResolver>,
        verifier: SlotVerifier,
    ) -> Self {
        Self {
            hosts,
            resolver,
            verifier,
            fallback_statuses: DEFAULT_FALLBACK_STATUSES.to_vec(),
        }
    }

    /// Builder: set the statuses that switch to the link fallback.
    pub fn with_fallback_statuses(mut self, statuses: impl Into<Vec<u16>>) -> Self {
        self.fallback_statuses = statuses.into();
        self
    }

    /// Books `request` with one eligible host.
    ///
    /// # Errors
    ///
    /// - [`BookingError::MissingFields`] / [`BookingError::InvalidSlot`] for
    ///   bad input, before any upstream call
    /// - [`BookingError::NoAvailability`] if no host offers the exact slot
    /// - [`BookingError::Upstream`] if the reservation (or its fallback) fails
    pub async fn book(&self, request: &BookingRequest) -> Result<BookingOutcome, BookingError> {
        let booking = ValidBooking::try_from(request)?;

        let eligible = self.eligible_hosts(booking.start, booking.end).await;
        let Some(host) = select_host(eligible) else {
            info!(
                start = %canonical(&booking.start),
                end = %canonical(&booking.end),
                "no host has the requested slot"
            );
            return Err(BookingError::NoAvailability {
                start: canonical(&booking.start),
                end: canonical(&booking.end),
            });
        };

        info!(host_id = %host.host_id, weight = host.priority_weight, "assigned booking");
        self.reserve(host, booking).await
    }

    async fn eligible_hosts(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Vec<&Host> {
        let checks = self
            .hosts
            .iter()
            .map(|host| self.verifier.has_exact_slot(host, start, end));
        let offered = join_all(checks).await;

        self.hosts
            .iter()
            .zip(offered)
            .filter_map(|(host, ok)| ok.then_some(host))
            .collect()
    }

    async fn reserve(
        &self,
        host: &Host,
        booking: ValidBooking,
    ) -> Result<BookingOutcome, BookingError> {
        let event_type = self.resolver.resolve(host).await?;
        let credential = self.resolver.credential(host)?;
        let provider = self.resolver.provider();

        let request = InviteeBooking {
            event_type,
            start_time: booking.start,
            end_time: booking.end,
            invitee: InviteeDetails {
                name: booking.name,
                email: booking.email,
                timezone: booking.timezone,
            },
        };

        match provider.create_invitee(&credential, &request).await {
            Ok(record) => Ok(BookingOutcome::Confirmed {
                booking: record,
                host_assigned: host.display_name.clone(),
            }),
            Err(e) if self.is_fallback(&e) => {
                warn!(
                    host_id = %host.host_id,
                    status = ?e.status(),
                    "direct booking refused, issuing single-use link"
                );
                let link = provider
                    .create_scheduling_link(&credential, &request.event_type, 1)
                    .await
                    .map_err(|e| e.with_host(&host.host_id))?;
                Ok(BookingOutcome::Redirect {
                    redirect: link.booking_url,
                    host_assigned: host.display_name.clone(),
                })
            }
            Err(e) => Err(e.with_host(&host.host_id).into()),
        }
    }

    fn is_fallback(&self, error: &ProviderError) -> bool {
        error
            .status()
            .is_some_and(|status| self.fallback_statuses.contains(&status))
    }
}

/// Returns the eligible host with the highest weight, lowest id on ties.
pub fn select_host<'a>(eligible: impl IntoIterator<Item = &'a Host>) -> Option<&'a Host> {
    eligible.into_iter().min_by(|a, b| {
        b.priority_weight
            .cmp(&a.priority_weight)
            .then_with(|| a.host_id.cmp(&b.host_id))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use hostpool_core::Invitee;
    use hostpool_providers::testing::FakeProvider;
    use hostpool_providers::{CredentialStore, ProviderErrorCode};
    use serde_json::json;

    const A_ET: &str = "https://api.calendly.com/event_types/A";
    const B_ET: &str = "https://api.calendly.com/event_types/B";

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 6, hour, minute, 0).unwrap()
    }

    fn roster() -> Arc<[Host]> {
        vec![
            Host::new("a", "Host A", "PAT_A", "https://calendly.com/a/30min").with_priority(10),
            Host::new("b", "Host B", "PAT_B", "https://calendly.com/b/30min").with_priority(20),
        ]
        .into()
    }

    fn accounts() -> FakeProvider {
        FakeProvider::new()
            .with_account("tok-a", "users/a", A_ET, "https://calendly.com/a/30min")
            .with_account("tok-b", "users/b", B_ET, "https://calendly.com/b/30min")
    }

    fn assignor(provider: Arc<FakeProvider>) -> BookingAssignor {
        let credentials = CredentialStore::in_memory()
            .with_token("PAT_A", "tok-a")
            .with_token("PAT_B", "tok-b");
        let resolver = Arc::new(EventTypeResolver::new(provider, credentials));
        let verifier = SlotVerifier::new(resolver.clone(), Duration::minutes(30), "UTC");
        BookingAssignor::new(roster(), resolver, verifier)
    }

    fn request() -> BookingRequest {
        BookingRequest::new(
            "2026-01-06T10:00:00Z",
            "2026-01-06T10:30:00Z",
            "Ada",
            "ada@example.com",
        )
    }

    #[test]
    fn selection_prefers_weight_then_id() {
        let hosts = [
            Host::new("c", "C", "P", "u").with_priority(5),
            Host::new("b", "B", "P", "u").with_priority(7),
            Host::new("a", "A", "P", "u").with_priority(7),
        ];
        assert_eq!(select_host(&hosts).map(|h| h.host_id.as_str()), Some("a"));
        assert!(select_host(Vec::<&Host>::new()).is_none());
    }

    #[test]
    fn validation_canonicalizes_offsets() {
        let request = BookingRequest::new(
            "2026-01-06T15:30:00+05:30",
            "2026-01-06T16:00:00+05:30",
            " Ada ",
            "ada@example.com",
        );
        let booking = ValidBooking::try_from(&request).unwrap();
        assert_eq!(booking.start, at(10, 0));
        assert_eq!(booking.end, at(10, 30));
        assert_eq!(booking.name, "Ada");
        assert_eq!(booking.timezone, None);
    }

    #[test]
    fn validation_rewrites_legacy_timezone() {
        let legacy = BookingRequest {
            timezone: Some(" Asia/Calcutta ".to_string()),
            ..request()
        };
        let booking = ValidBooking::try_from(&legacy).unwrap();
        assert_eq!(booking.timezone.as_deref(), Some("Asia/Kolkata"));

        let current = BookingRequest {
            timezone: Some("America/New_York".to_string()),
            ..request()
        };
        let booking = ValidBooking::try_from(&current).unwrap();
        assert_eq!(booking.timezone.as_deref(), Some("America/New_York"));
    }

    #[tokio::test]
    async fn highest_weight_host_is_booked() {
        let provider = Arc::new(
            accounts()
                .with_available(A_ET, &[at(10, 0)])
                .with_available(B_ET, &[at(10, 0)]),
        );
        let outcome = assignor(provider.clone()).book(&request()).await.unwrap();

        assert_eq!(
            outcome,
            BookingOutcome::Confirmed {
                booking: json!({
                    "event_type": B_ET,
                    "start_time": "2026-01-06T10:00:00.000Z",
                    "email": "ada@example.com",
                }),
                host_assigned: "Host B".to_string(),
            }
        );
        assert_eq!(provider.count("create_invitee"), 1);
        assert_eq!(provider.count("create_scheduling_link"), 0);
    }

    #[tokio::test]
    async fn only_eligible_hosts_are_considered() {
        let provider = Arc::new(accounts().with_available(A_ET, &[at(10, 0)]));
        let outcome = assignor(provider).book(&request()).await.unwrap();
        assert_eq!(outcome.host_assigned(), "Host A");
    }

    #[tokio::test]
    async fn conflict_falls_back_to_single_use_link() {
        let provider = Arc::new(
            accounts()
                .with_available(A_ET, &[at(10, 0)])
                .with_available(B_ET, &[at(10, 0)])
                .with_booking_rejection(B_ET, 409, r#"{"title":"Conflict"}"#),
        );
        let outcome = assignor(provider.clone()).book(&request()).await.unwrap();

        assert_eq!(
            outcome,
            BookingOutcome::Redirect {
                redirect: "https://calendly.test/d/B/1".to_string(),
                host_assigned: "Host B".to_string(),
            }
        );
        // never re-selects host A
        assert_eq!(provider.count("create_invitee"), 1);
        assert_eq!(provider.calls().last().unwrap(), &format!("create_scheduling_link:{B_ET}"));
    }

    #[tokio::test]
    async fn forbidden_and_bad_request_also_fall_back() {
        for status in [400, 403] {
            let provider = Arc::new(
                accounts()
                    .with_available(B_ET, &[at(10, 0)])
                    .with_booking_rejection(B_ET, status, "nope"),
            );
            let outcome = assignor(provider.clone()).book(&request()).await.unwrap();
            assert!(outcome.is_redirect(), "status {status}");
            assert_eq!(provider.count("create_invitee"), 1, "status {status}");
            assert_eq!(provider.count("create_scheduling_link"), 1, "status {status}");
        }
    }

    #[tokio::test]
    async fn other_rejections_are_upstream_errors() {
        let provider = Arc::new(
            accounts()
                .with_available(B_ET, &[at(10, 0)])
                .with_booking_rejection(B_ET, 500, "internal"),
        );
        let err = assignor(provider.clone()).book(&request()).await.unwrap_err();

        let BookingError::Upstream(e) = &err else {
            panic!("expected upstream error, got {err:?}");
        };
        assert_eq!(e.status(), Some(500));
        assert_eq!(e.body(), Some("internal"));
        assert_eq!(e.host(), Some("b"));
        assert_eq!(provider.count("create_scheduling_link"), 0);
    }

    #[tokio::test]
    async fn custom_fallback_statuses() {
        let provider = Arc::new(
            accounts()
                .with_available(B_ET, &[at(10, 0)])
                .with_booking_rejection(B_ET, 400, "bad"),
        );
        let err = assignor(provider)
            .with_fallback_statuses([409])
            .book(&request())
            .await
            .unwrap_err();
        assert!(matches!(err, BookingError::Upstream(_)));
    }

    #[tokio::test]
    async fn failed_link_creation_is_an_upstream_error() {
        let provider = Arc::new(
            accounts()
                .with_available(B_ET, &[at(10, 0)])
                .with_booking_rejection(B_ET, 409, "conflict")
                .with_link_error(B_ET, 502),
        );
        let err = assignor(provider).book(&request()).await.unwrap_err();

        let BookingError::Upstream(e) = &err else {
            panic!("expected upstream error, got {err:?}");
        };
        assert_eq!(e.code(), ProviderErrorCode::Upstream);
        assert_eq!(e.status(), Some(502));
    }

    #[tokio::test]
    async fn no_eligible_host_means_no_reservation() {
        let provider = Arc::new(accounts().with_available(A_ET, &[at(11, 0)]));
        let err = assignor(provider.clone()).book(&request()).await.unwrap_err();

        assert!(matches!(err, BookingError::NoAvailability { .. }));
        assert_eq!(
            err.to_string(),
            "no host has the slot 2026-01-06T10:00:00.000Z to 2026-01-06T10:30:00.000Z"
        );
        assert_eq!(provider.count("create_invitee"), 0);
    }

    #[tokio::test]
    async fn mismatched_duration_is_not_bookable() {
        let provider = Arc::new(accounts().with_available(B_ET, &[at(10, 0)]));
        let request = BookingRequest::new(
            "2026-01-06T10:00:00Z",
            "2026-01-06T11:00:00Z",
            "Ada",
            "ada@example.com",
        );
        let err = assignor(provider).book(&request).await.unwrap_err();
        assert!(matches!(err, BookingError::NoAvailability { .. }));
    }

    #[tokio::test]
    async fn overlapping_slot_is_not_bookable() {
        let provider = Arc::new(accounts().with_available(B_ET, &[at(10, 30)]));
        let request = BookingRequest::new(
            "2026-01-06T10:00:00Z",
            "2026-01-06T11:00:00Z",
            "Ada",
            "ada@example.com",
        );
        let err = assignor(provider.clone()).book(&request).await.unwrap_err();
        assert!(matches!(err, BookingError::NoAvailability { .. }));
        assert_eq!(provider.count("create_invitee"), 0);
    }

    #[tokio::test]
    async fn missing_fields_fail_before_any_upstream_call() {
        let provider = Arc::new(accounts().with_available(B_ET, &[at(10, 0)]));
        let request = BookingRequest {
            invitee: Some(Invitee {
                name: Some("Ada".to_string()),
                email: None,
            }),
            ..request()
        };

        let err = assignor(provider.clone()).book(&request).await.unwrap_err();
        assert!(matches!(err, BookingError::MissingFields(ref f) if f == &vec!["invitee.email"]));
        assert!(provider.calls().is_empty());
    }

    #[tokio::test]
    async fn unparseable_or_inverted_instants_are_rejected() {
        let provider = Arc::new(accounts());
        let assignor = assignor(provider.clone());

        let garbled = BookingRequest {
            start_time: Some("tomorrow at ten".to_string()),
            ..request()
        };
        let err = assignor.book(&garbled).await.unwrap_err();
        assert!(matches!(
            err,
            BookingError::InvalidSlot(WindowError::Unparseable { field: "start_time", .. })
        ));

        let inverted = BookingRequest::new(
            "2026-01-06T10:30:00Z",
            "2026-01-06T10:00:00Z",
            "Ada",
            "ada@example.com",
        );
        let err = assignor.book(&inverted).await.unwrap_err();
        assert!(matches!(err, BookingError::InvalidSlot(WindowError::Empty { .. })));
        assert!(provider.calls().is_empty());
    }
}
