//! Host roster types.
//!
//! A [`Host`] is one upstream account participating in the shared pool. The
//! roster is loaded once at startup and never changes while the process runs.

use serde::{Deserialize, Serialize};

/// One calendar-holding account in the pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Host {
    /// Stable identifier, unique within the roster.
    pub host_id: String,
    /// Name shown to invitees and reported as `host_assigned`.
    pub display_name: String,
    /// Name of the environment variable holding the host's access token.
    pub pat_env: String,
    /// Public scheduling URL of the host's bookable event type.
    pub event_type_uri: String,
    /// Higher weights win when several hosts can take a booking.
    #[serde(default)]
    pub priority_weight: i64,
}

impl Host {
    /// Creates a host with zero priority weight.
    pub fn new(
        host_id: impl Into<String>,
        display_name: impl Into<String>,
        pat_env: impl Into<String>,
        event_type_uri: impl Into<String>,
    ) -> Self {
        Self {
            host_id: host_id.into(),
            display_name: display_name.into(),
            pat_env: pat_env.into(),
            event_type_uri: event_type_uri.into(),
            priority_weight: 0,
        }
    }

    /// Builder: set priority weight.
    pub fn with_priority(mut self, weight: i64) -> Self {
        self.priority_weight = weight;
        self
    }

    /// Returns the public `{id, name}` projection of this host.
    pub fn to_ref(&self) -> HostRef {
        HostRef {
            id: self.host_id.clone(),
            name: self.display_name.clone(),
        }
    }
}

/// The public view of a host attached to slots.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HostRef {
    pub id: String,
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn host_builder() {
        let host = Host::new("alice", "Alice", "PAT_ALICE", "https://calendly.com/alice/30min")
            .with_priority(10);

        assert_eq!(host.host_id, "alice");
        assert_eq!(host.priority_weight, 10);
        assert_eq!(
            host.to_ref(),
            HostRef {
                id: "alice".to_string(),
                name: "Alice".to_string()
            }
        );
    }

    #[test]
    fn priority_defaults_to_zero_when_absent() {
        let json = r#"{
            "host_id": "bob",
            "display_name": "Bob",
            "pat_env": "PAT_BOB",
            "event_type_uri": "https://calendly.com/bob/intro"
        }"#;

        let host: Host = serde_json::from_str(json).unwrap();
        assert_eq!(host.priority_weight, 0);
    }
}
