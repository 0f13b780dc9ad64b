//! Availability aggregation.
//!
//! Every host is queried at once; the answers are merged into one list of
//! slots where each distinct `(start, end)` pair appears once and carries every
//! host that offers it. A host that cannot be queried is logged and left out,
//! it never fails the whole request.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use futures_util::future::join_all;
use hostpool_core::{Host, HostRef, Slot, TimeWindow};
use hostpool_providers::{AvailabilityQuery, EventTypeResolver, ProviderResult};
use tracing::{debug, warn};

/// Fans availability queries out over the roster.
#[derive(Debug, Clone)]
pub struct Aggregator {
    hosts: Arc<[Host]>,
    resolver: Arc<EventTypeResolver>,
    slot_duration: Duration,
}

impl Aggregator {
    pub fn new(
        hosts: Arc<[Host]>,
        resolver: Arc<EventTypeResolver>,
        slot_duration: Duration,
    ) -> Self {
        Self {
            hosts,
            resolver,
            slot_duration,
        }
    }

    /// Returns the union of every host's free slots within `window`, sorted
    /// by start.
    pub async fn aggregate(&self, window: &TimeWindow, timezone: &str) -> Vec<Slot> {
        let queries = self
            .hosts
            .iter()
            .map(|host| self.host_starts(host, window, timezone));
        let results = join_all(queries).await;

        let offered = self
            .hosts
            .iter()
            .zip(results)
            .filter_map(|(host, result)| match result {
                Ok(starts) => Some((host.to_ref(), starts)),
                Err(e) => {
                    warn!(host_id = %host.host_id, error = %e, "skipping host availability");
                    None
                }
            });

        let slots = merge_slots(offered, self.slot_duration);
        debug!(
            start = %window.start_str(),
            end = %window.end_str(),
            slots = slots.len(),
            "aggregated availability"
        );
        slots
    }

    async fn host_starts(
        &self,
        host: &Host,
        window: &TimeWindow,
        timezone: &str,
    ) -> ProviderResult<Vec<DateTime<Utc>>> {
        let event_type = self.resolver.resolve(host).await?;
        let credential = self.resolver.credential(host)?;
        let query = AvailabilityQuery::new(event_type, window.clone(), timezone);

        let times = self
            .resolver
            .provider()
            .available_times(&credential, query)
            .await
            .map_err(|e| e.with_host(&host.host_id))?;
        Ok(times.into_iter().map(|t| t.start_time).collect())
    }
}

/// Merges per-host start times into deduplicated slots ordered by start.
///
/// Each start becomes a slot ending `slot_duration` later. Slots with the
/// same bounds collapse into one whose hosts are unique by id, in the order
/// they were first seen.
pub fn merge_slots<I>(offered: I, slot_duration: Duration) -> Vec<Slot>
where
    I: IntoIterator<Item = (HostRef, Vec<DateTime<Utc>>)>,
{
    let mut union: BTreeMap<(DateTime<Utc>, DateTime<Utc>), Slot> = BTreeMap::new();
    for (host, starts) in offered {
        for start in starts {
            let end = start + slot_duration;
            union
                .entry((start, end))
                .or_insert_with(|| Slot::new(start, end))
                .add_host(host.clone());
        }
    }
    union.into_values().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use hostpool_providers::CredentialStore;
    use hostpool_providers::testing::FakeProvider;

    const ALICE_ET: &str = "https://api.calendly.com/event_types/ALICE";
    const BOB_ET: &str = "https://api.calendly.com/event_types/BOB";

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 6, hour, minute, 0).unwrap()
    }

    fn href(id: &str, name: &str) -> HostRef {
        HostRef {
            id: id.to_string(),
            name: name.to_string(),
        }
    }

    fn roster() -> Arc<[Host]> {
        vec![
            Host::new("alice", "Alice", "PAT_ALICE", "https://calendly.com/alice/30min"),
            Host::new("bob", "Bob", "PAT_BOB", "https://calendly.com/bob/30min"),
        ]
        .into()
    }

    fn accounts() -> FakeProvider {
        FakeProvider::new()
            .with_account("tok-alice", "users/alice", ALICE_ET, "https://calendly.com/alice/30min")
            .with_account("tok-bob", "users/bob", BOB_ET, "https://calendly.com/bob/30min")
    }

    fn aggregator(provider: FakeProvider) -> Aggregator {
        let credentials = CredentialStore::in_memory()
            .with_token("PAT_ALICE", "tok-alice")
            .with_token("PAT_BOB", "tok-bob");
        let resolver = Arc::new(EventTypeResolver::new(Arc::new(provider), credentials));
        Aggregator::new(roster(), resolver, Duration::minutes(30))
    }

    fn window() -> TimeWindow {
        TimeWindow::new(at(9, 0), at(17, 0)).unwrap()
    }

    #[test]
    fn merge_collapses_shared_slots_and_sorts() {
        let slots = merge_slots(
            [
                (href("a", "A"), vec![at(11, 0), at(10, 0)]),
                (href("b", "B"), vec![at(10, 0)]),
            ],
            Duration::minutes(30),
        );

        assert_eq!(slots.len(), 2);
        assert_eq!(slots[0].start, at(10, 0));
        assert_eq!(slots[0].end, at(10, 30));
        assert_eq!(slots[0].hosts, vec![href("a", "A"), href("b", "B")]);
        assert_eq!(slots[1].start, at(11, 0));
        assert_eq!(slots[1].hosts, vec![href("a", "A")]);
    }

    #[test]
    fn merge_deduplicates_repeated_host_entries() {
        let slots = merge_slots(
            [(href("a", "A"), vec![at(10, 0), at(10, 0)])],
            Duration::minutes(30),
        );
        assert_eq!(slots.len(), 1);
        assert_eq!(slots[0].hosts.len(), 1);
    }

    #[test]
    fn merge_of_nothing_is_empty() {
        let slots = merge_slots(Vec::<(HostRef, Vec<DateTime<Utc>>)>::new(), Duration::minutes(30));
        assert!(slots.is_empty());
    }

    #[tokio::test]
    async fn union_of_two_hosts() {
        let provider = accounts()
            .with_available(ALICE_ET, &[at(10, 0), at(11, 0)])
            .with_available(BOB_ET, &[at(10, 0), at(12, 0)]);

        let slots = aggregator(provider).aggregate(&window(), "Asia/Kolkata").await;

        insta::assert_json_snapshot!(slots, @r#"
        [
          {
            "start_time": "2026-01-06T10:00:00.000Z",
            "end_time": "2026-01-06T10:30:00.000Z",
            "hosts": [
              {
                "id": "alice",
                "name": "Alice"
              },
              {
                "id": "bob",
                "name": "Bob"
              }
            ]
          },
          {
            "start_time": "2026-01-06T11:00:00.000Z",
            "end_time": "2026-01-06T11:30:00.000Z",
            "hosts": [
              {
                "id": "alice",
                "name": "Alice"
              }
            ]
          },
          {
            "start_time": "2026-01-06T12:00:00.000Z",
            "end_time": "2026-01-06T12:30:00.000Z",
            "hosts": [
              {
                "id": "bob",
                "name": "Bob"
              }
            ]
          }
        ]
        "#);
    }

    #[tokio::test]
    async fn failing_host_is_skipped() {
        let provider = accounts()
            .with_available(ALICE_ET, &[at(10, 0)])
            .with_available(BOB_ET, &[at(12, 0)])
            .with_availability_error(BOB_ET, 429);

        let slots = aggregator(provider).aggregate(&window(), "UTC").await;

        assert_eq!(slots.len(), 1);
        assert!(slots[0].offered_by("alice"));
        assert!(!slots[0].offered_by("bob"));
    }

    #[tokio::test]
    async fn unresolvable_host_is_skipped() {
        // bob has no account registered, so identity lookup fails
        let provider = FakeProvider::new()
            .with_account("tok-alice", "users/alice", ALICE_ET, "https://calendly.com/alice/30min")
            .with_available(ALICE_ET, &[at(10, 0)]);

        let slots = aggregator(provider).aggregate(&window(), "UTC").await;
        assert_eq!(slots.len(), 1);
        assert_eq!(slots[0].hosts, vec![href("alice", "Alice")]);
    }

    #[tokio::test]
    async fn every_host_failing_yields_no_slots() {
        let provider = accounts()
            .with_availability_error(ALICE_ET, 500)
            .with_availability_error(BOB_ET, 500);

        let slots = aggregator(provider).aggregate(&window(), "UTC").await;
        assert!(slots.is_empty());
    }

    #[tokio::test]
    async fn slot_length_follows_policy() {
        let provider = accounts().with_available(ALICE_ET, &[at(10, 0)]);
        let credentials = CredentialStore::in_memory()
            .with_token("PAT_ALICE", "tok-alice")
            .with_token("PAT_BOB", "tok-bob");
        let resolver = Arc::new(EventTypeResolver::new(Arc::new(provider), credentials));
        let aggregator = Aggregator::new(roster(), resolver, Duration::minutes(45));

        let slots = aggregator.aggregate(&window(), "UTC").await;
        assert_eq!(slots[0].end, at(10, 45));
    }
}
