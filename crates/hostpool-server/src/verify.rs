//! Exact-slot verification at booking time.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use hostpool_core::{Host, TimeWindow, canonical};
use hostpool_providers::{AvailabilityQuery, EventTypeResolver, ProviderResult};
use tracing::{debug, warn};

/// Asks the provider whether one host still offers one exact slot.
#[derive(Debug, Clone)]
pub struct SlotVerifier {
    resolver: Arc<EventTypeResolver>,
    slot_duration: Duration,
    timezone: String,
}

impl SlotVerifier {
    pub fn new(
        resolver: Arc<EventTypeResolver>,
        slot_duration: Duration,
        timezone: impl Into<String>,
    ) -> Self {
        Self {
            resolver,
            slot_duration,
            timezone: timezone.into(),
        }
    }

    /// Returns true iff `host` currently offers a slot starting at `start`
    /// whose derived end equals `end`.
    ///
    /// Any failure along the way counts as "not offered".
    pub async fn has_exact_slot(
        &self,
        host: &Host,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> bool {
        match self.check(host, start, end).await {
            Ok(found) => {
                debug!(host_id = %host.host_id, start = %canonical(&start), found, "verified slot");
                found
            }
            Err(e) => {
                warn!(host_id = %host.host_id, error = %e, "slot verification failed");
                false
            }
        }
    }

    async fn check(
        &self,
        host: &Host,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> ProviderResult<bool> {
        let Some(window) = TimeWindow::new(start, end) else {
            return Ok(false);
        };
        let event_type = self.resolver.resolve(host).await?;
        let credential = self.resolver.credential(host)?;
        let query = AvailabilityQuery::new(event_type, window, self.timezone.as_str());

        let times = self
            .resolver
            .provider()
            .available_times(&credential, query)
            .await
            .map_err(|e| e.with_host(&host.host_id))?;

        Ok(times
            .iter()
            .any(|t| t.start_time == start && t.start_time + self.slot_duration == end))
    }
}
