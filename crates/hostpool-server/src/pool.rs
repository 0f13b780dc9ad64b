//! The host pool: roster, shared resolver and the components built on it.

use std::sync::Arc;

use chrono::Duration;
use futures_util::future::join_all;
use hostpool_core::{BookingOutcome, BookingRequest, DEFAULT_TIMEZONE, Host, Slot, TimeWindow};
use hostpool_providers::{
    CalendlyClient, CredentialStore, EventTypeResolver, ProviderResult, SchedulingProvider,
};

use crate::aggregate::Aggregator;
use crate::assign::BookingAssignor;
use crate::config::{DEFAULT_FALLBACK_STATUSES, ServerConfig};
use crate::error::{BookingError, ServerResult};
use crate::verify::SlotVerifier;

/// Policy knobs shared by aggregation and booking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolPolicy {
    pub slot_duration: Duration,
    /// Timezone sent with booking-time availability checks.
    pub timezone: String,
    pub fallback_statuses: Vec<u16>,
}

impl Default for PoolPolicy {
    fn default() -> Self {
        Self {
            slot_duration: Duration::minutes(30),
            timezone: DEFAULT_TIMEZONE.to_string(),
            fallback_statuses: DEFAULT_FALLBACK_STATUSES.to_vec(),
        }
    }
}

/// Result of resolving one host during `hostpool check`.
#[derive(Debug)]
pub struct HostCheck {
    pub host_id: String,
    pub result: ProviderResult<String>,
}

/// Everything a request handler needs, built once at startup.
#[derive(Debug)]
pub struct HostPool {
    hosts: Arc<[Host]>,
    resolver: Arc<EventTypeResolver>,
    aggregator: Aggregator,
    assignor: BookingAssignor,
}

impl HostPool {
    pub fn new(
        hosts: Vec<Host>,
        provider: Arc<dyn SchedulingProvider>,
        credentials: CredentialStore,
        policy: PoolPolicy,
    ) -> Self {
        let hosts: Arc<[Host]> = hosts.into();
        let resolver = Arc::new(EventTypeResolver::new(provider, credentials));
        let aggregator = Aggregator::new(hosts.clone(), resolver.clone(), policy.slot_duration);
        let verifier = SlotVerifier::new(resolver.clone(), policy.slot_duration, policy.timezone);
        let assignor = BookingAssignor::new(hosts.clone(), resolver.clone(), verifier)
            .with_fallback_statuses(policy.fallback_statuses);

        Self {
            hosts,
            resolver,
            aggregator,
            assignor,
        }
    }

    /// Builds the pool against the real provider, reading credentials from
    /// the process environment.
    pub fn from_config(config: &ServerConfig) -> ServerResult<Self> {
        let client = CalendlyClient::new(config.upstream.client_config()?)?;
        let policy = PoolPolicy {
            slot_duration: config.server.slot_duration(),
            timezone: config.server.default_timezone.clone(),
            fallback_statuses: config.server.fallback_statuses.clone(),
        };
        Ok(Self::new(
            config.hosts.clone(),
            Arc::new(client),
            CredentialStore::from_env(),
            policy,
        ))
    }

    pub fn hosts(&self) -> &[Host] {
        &self.hosts
    }

    pub fn resolver(&self) -> &EventTypeResolver {
        &self.resolver
    }

    /// Union of all hosts' free slots in `window`.
    pub async fn availability(&self, window: &TimeWindow, timezone: &str) -> Vec<Slot> {
        self.aggregator.aggregate(window, timezone).await
    }

    /// Assigns and reserves one booking.
    pub async fn book(&self, request: &BookingRequest) -> Result<BookingOutcome, BookingError> {
        self.assignor.book(request).await
    }

    /// Resolves every host's event type concurrently.
    pub async fn check(&self) -> Vec<HostCheck> {
        let results = join_all(self.hosts.iter().map(|h| self.resolver.resolve(h))).await;
        self.hosts
            .iter()
            .zip(results)
            .map(|(host, result)| HostCheck {
                host_id: host.host_id.clone(),
                result,
            })
            .collect()
    }
}
