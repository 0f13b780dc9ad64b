//! Booking request and outcome types.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The person a booking is made for.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invitee {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

/// A caller's request to book one exact slot.
///
/// Every field is optional on the wire so that missing values surface as a
/// validation failure rather than a deserialization error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingRequest {
    #[serde(default)]
    pub start_time: Option<String>,
    #[serde(default)]
    pub end_time: Option<String>,
    #[serde(default)]
    pub invitee: Option<Invitee>,
    /// Invitee timezone forwarded to the provider.
    #[serde(default)]
    pub timezone: Option<String>,
}

impl BookingRequest {
    /// Creates a fully populated request.
    pub fn new(
        start_time: impl Into<String>,
        end_time: impl Into<String>,
        name: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        Self {
            start_time: Some(start_time.into()),
            end_time: Some(end_time.into()),
            invitee: Some(Invitee {
                name: Some(name.into()),
                email: Some(email.into()),
            }),
            timezone: None,
        }
    }

    /// Returns the names of required fields that are missing or blank.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        fn blank(v: &Option<String>) -> bool {
            v.as_deref().is_none_or(|s| s.trim().is_empty())
        }

        let mut missing = Vec::new();
        if blank(&self.start_time) {
            missing.push("start_time");
        }
        if blank(&self.end_time) {
            missing.push("end_time");
        }
        match &self.invitee {
            None => missing.extend(["invitee.name", "invitee.email"]),
            Some(invitee) => {
                if blank(&invitee.name) {
                    missing.push("invitee.name");
                }
                if blank(&invitee.email) {
                    missing.push("invitee.email");
                }
            }
        }
        missing
    }
}

/// What happened to a booking request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum BookingOutcome {
    /// The provider accepted the reservation directly.
    Confirmed {
        booking: Value,
        host_assigned: String,
    },
    /// Direct reservation was refused; the invitee should finish booking
    /// through a single-use scheduling link.
    Redirect {
        redirect: String,
        host_assigned: String,
    },
}

impl BookingOutcome {
    /// Display name of the host the booking went to.
    pub fn host_assigned(&self) -> &str {
        match self {
            Self::Confirmed { host_assigned, .. } | Self::Redirect { host_assigned, .. } => {
                host_assigned
            }
        }
    }

    /// Returns true for the redirect variant.
    pub fn is_redirect(&self) -> bool {
        matches!(self, Self::Redirect { .. })
    }
}
