//! Event-type resolution.
//!
//! Hosts are configured with the *public* scheduling URL of their event type,
//! but availability and booking calls need the provider's internal event-type
//! URI. [`EventTypeResolver`] finds that URI once per host and keeps it in an
//! [`EventTypeCache`] for the rest of the process lifetime.

use std::collections::HashMap;
use std::sync::Arc;

use hostpool_core::Host;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::credentials::CredentialStore;
use crate::error::{ProviderError, ProviderResult};
use crate::provider::SchedulingProvider;

/// Host id → provider event-type URI.
///
/// Entries are written at most once and never evicted. Concurrent first
/// resolutions of the same host may both reach [`fill`](Self::fill); the
/// first value stored wins and equals the second anyway.
#[derive(Debug, Default)]
pub struct EventTypeCache {
    entries: RwLock<HashMap<String, String>>,
}

impl EventTypeCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached event type for `host_id`.
    pub async fn get(&self, host_id: &str) -> Option<String> {
        self.entries.read().await.get(host_id).cloned()
    }

    /// Stores `event_type` for `host_id` unless already present and returns
    /// the stored value.
    pub async fn fill(&self, host_id: &str, event_type: String) -> String {
        let mut entries = self.entries.write().await;
        entries
            .entry(host_id.to_string())
            .or_insert(event_type)
            .clone()
    }

    /// Number of resolved hosts.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Returns true if nothing has been resolved yet.
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

/// Maps hosts to their provider event types and hands out credentials.
///
/// Shared by the aggregator, the verifier and the assignor through an `Arc`.
pub struct EventTypeResolver {
    provider: Arc<dyn SchedulingProvider>,
    credentials: CredentialStore,
    cache: EventTypeCache,
}

impl std::fmt::Debug for EventTypeResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventTypeResolver")
            .field("provider", &self.provider.name())
            .field("credentials", &self.credentials)
            .field("cache", &self.cache)
            .finish()
    }
}

impl EventTypeResolver {
    /// Creates a resolver with an empty cache.
    pub fn new(provider: Arc<dyn SchedulingProvider>, credentials: CredentialStore) -> Self {
        Self {
            provider,
            credentials,
            cache: EventTypeCache::new(),
        }
    }

    /// The provider used for resolution, shared with callers.
    pub fn provider(&self) -> &Arc<dyn SchedulingProvider> {
        &self.provider
    }

    /// The resolver's cache.
    pub fn cache(&self) -> &EventTypeCache {
        &self.cache
    }

    /// Returns the host's access token.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the token is not available.
    pub fn credential(&self, host: &Host) -> ProviderResult<String> {
        self.credentials.token_for(host)
    }

    /// Returns the provider event-type URI for `host`.
    ///
    /// # Errors
    ///
    /// - configuration error if the host's credential is missing
    /// - upstream/network error from the identity or listing calls
    /// - not found error, listing every scheduling URL seen, if no event
    ///   type is published at `host.event_type_uri`
    pub async fn resolve(&self, host: &Host) -> ProviderResult<String> {
        if let Some(event_type) = self.cache.get(&host.host_id).await {
            return Ok(event_type);
        }

        let credential = self.credential(host)?;
        let tag = |e: ProviderError| e.with_host(&host.host_id);

        let user = self.provider.current_user(&credential).await.map_err(tag)?;
        let event_types = self
            .provider
            .list_event_types(&credential, &user.uri)
            .await
            .map_err(tag)?;
        debug!(
            host_id = %host.host_id,
            count = event_types.len(),
            "scanning event types"
        );

        let found = event_types
            .iter()
            .find(|et| et.scheduling_url.as_deref() == Some(host.event_type_uri.as_str()));

        let Some(found) = found else {
            let seen = event_types
                .into_iter()
                .filter_map(|et| et.scheduling_url)
                .collect();
            return Err(
                ProviderError::event_type_not_found(&host.event_type_uri, seen)
                    .with_host(&host.host_id),
            );
        };

        let event_type = self.cache.fill(&host.host_id, found.uri.clone()).await;
        info!(host_id = %host.host_id, event_type = %event_type, "resolved event type");
        Ok(event_type)
    }
}
