//! Bookable slots.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::host::HostRef;
use crate::time::canonical_instant;

/// An exact start/end pair together with the hosts offering it.
///
/// Two slots are the same slot only when both instants are identical;
/// overlapping intervals are distinct slots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slot {
    #[serde(rename = "start_time", with = "canonical_instant")]
    pub start: DateTime<Utc>,
    #[serde(rename = "end_time", with = "canonical_instant")]
    pub end: DateTime<Utc>,
    pub hosts: Vec<HostRef>,
}

impl Slot {
    /// Creates a slot with no hosts yet.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            start,
            end,
            hosts: Vec::new(),
        }
    }

    /// Adds `host` unless a host with the same id is already present.
    ///
    /// Returns `true` when the host was added.
    pub fn add_host(&mut self, host: HostRef) -> bool {
        if self.hosts.iter().any(|h| h.id == host.id) {
            return false;
        }
        self.hosts.push(host);
        true
    }

    /// Returns true if the host with `host_id` offers this slot.
    pub fn offered_by(&self, host_id: &str) -> bool {
        self.hosts.iter().any(|h| h.id == host_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn host(id: &str, name: &str) -> HostRef {
        HostRef {
            id: id.to_string(),
            name: name.to_string(),
        }
    }

    #[test]
    fn add_host_deduplicates_by_id() {
        let start = Utc.with_ymd_and_hms(2026, 1, 6, 10, 0, 0).unwrap();
        let mut slot = Slot::new(start, start + chrono::Duration::minutes(30));

        assert!(slot.add_host(host("a", "Alice")));
        assert!(!slot.add_host(host("a", "Alice (renamed)")));
        assert!(slot.add_host(host("b", "Bob")));

        assert_eq!(slot.hosts.len(), 2);
        assert!(slot.offered_by("a"));
        assert!(!slot.offered_by("c"));
    }

    #[test]
    fn serializes_with_canonical_instants() {
        let start = Utc.with_ymd_and_hms(2026, 1, 6, 10, 0, 0).unwrap();
        let mut slot = Slot::new(start, start + chrono::Duration::minutes(30));
        slot.add_host(host("a", "Alice"));

        insta::assert_json_snapshot!(slot, @r#"
        {
          "start_time": "2026-01-06T10:00:00.000Z",
          "end_time": "2026-01-06T10:30:00.000Z",
          "hosts": [
            {
              "id": "a",
              "name": "Alice"
            }
          ]
        }
        "#);
    }
}
