//! Calendly API client.
//!
//! [`CalendlyClient::call`] is the only place that talks HTTP: it attaches
//! the host's bearer token, sends the request, and turns every non-2xx
//! answer into an upstream [`ProviderError`] carrying the status and raw
//! body. The typed operations of [`SchedulingProvider`] are thin wrappers
//! over it.

use reqwest::Method;
use std::collections::HashSet;

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::{debug, trace, warn};
use url::Url;

use crate::error::{ProviderError, ProviderResult};
use crate::provider::{
    AvailabilityQuery, AvailableTime, BoxFuture, EventTypeInfo, InviteeBooking, SchedulingLink,
    SchedulingProvider, UserInfo,
};

use super::config::{CalendlyConfig, with_trailing_slash};

/// Page size requested from collection endpoints.
const PAGE_SIZE: &str = "100";

/// Calendly API client.
///
/// Holds no credentials; each call is authenticated with the token passed
/// in, so one client serves every host in the pool.
#[derive(Debug, Clone)]
pub struct CalendlyClient {
    http: reqwest::Client,
    base_url: Url,
}

impl CalendlyClient {
    /// Creates a new client with the given configuration.
    pub fn new(config: CalendlyConfig) -> ProviderResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| {
                ProviderError::configuration(format!("failed to create HTTP client: {}", e))
            })?;

        Ok(Self {
            http,
            base_url: with_trailing_slash(config.base_url),
        })
    }

    /// Returns the base URL requests are sent to.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn url(&self, path: &str, query: &[(&str, String)]) -> ProviderResult<Url> {
        let mut url = self
            .base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| ProviderError::configuration(format!("invalid path {path}: {e}")))?;
        if !query.is_empty() {
            url.query_pairs_mut()
                .extend_pairs(query.iter().map(|(k, v)| (*k, v.as_str())));
        }
        Ok(url)
    }

    /// Sends one authenticated request and returns the decoded JSON body.
    ///
    /// An empty success body decodes to `Value::Null`.
    ///
    /// # Errors
    ///
    /// - upstream error with status and body for any non-2xx response
    /// - network error when no response arrives (including timeouts)
    /// - invalid response error when a 2xx body is not JSON
    pub async fn call(
        &self,
        credential: &str,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<&Value>,
    ) -> ProviderResult<Value> {
        let url = self.url(path, query)?;
        trace!(%method, %url, "calling provider");

        let mut request = self
            .http
            .request(method.clone(), url)
            .bearer_auth(credential)
            .header(reqwest::header::ACCEPT, "application/json");
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|e| {
            let message = if e.is_timeout() {
                "request timeout".to_string()
            } else if e.is_connect() {
                format!("connection failed: {}", e)
            } else {
                format!("request failed: {}", e)
            };
            ProviderError::network(message).with_source(e)
        })?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| ProviderError::network(format!("failed to read response: {}", e)))?;

        debug!(%method, path, status = status.as_u16(), "provider responded");

        if !status.is_success() {
            return Err(ProviderError::upstream(status.as_u16(), text));
        }

        if text.trim().is_empty() {
            return Ok(Value::Null);
        }

        serde_json::from_str(&text).map_err(|e| {
            ProviderError::invalid_response(format!("failed to parse response: {}", e))
        })
    }

    async fn get<T: DeserializeOwned>(
        &self,
        credential: &str,
        path: &str,
        query: &[(&str, String)],
    ) -> ProviderResult<T> {
        let value = self.call(credential, Method::GET, path, query, None).await?;
        decode(value, path)
    }

    async fn post<T: DeserializeOwned>(
        &self,
        credential: &str,
        path: &str,
        body: &Value,
    ) -> ProviderResult<T> {
        let value = self
            .call(credential, Method::POST, path, &[], Some(body))
            .await?;
        decode(value, path)
    }

    /// Fetches the user the credential belongs to.
    pub async fn fetch_current_user(&self, credential: &str) -> ProviderResult<UserInfo> {
        let response: Resource<UserInfo> = self.get(credential, "/users/me", &[]).await?;
        Ok(response.resource)
    }

    /// Lists all event types of `user_uri`, following pagination.
    pub async fn fetch_event_types(
        &self,
        credential: &str,
        user_uri: &str,
    ) -> ProviderResult<Vec<EventTypeInfo>> {
        let mut all = Vec::new();
        let mut page_token: Option<String> = None;
        let mut seen_tokens = HashSet::new();

        loop {
            let mut query = vec![
                ("user", user_uri.to_string()),
                ("count", PAGE_SIZE.to_string()),
            ];
            if let Some(token) = page_token.take() {
                query.push(("page_token", token));
            }

            let page: Collection<EventTypeInfo> =
                self.get(credential, "/event_types", &query).await?;
            all.extend(page.collection);

            match page.pagination.and_then(|p| p.next_page_token) {
                Some(token) if !token.is_empty() => {
                    if !seen_tokens.insert(token.clone()) {
                        warn!(user = user_uri, token = %token, "page token repeated, stopping");
                        break;
                    }
                    page_token = Some(token);
                }
                _ => break,
            }
        }

        debug!(count = all.len(), user = user_uri, "fetched event types");
        Ok(all)
    }

    /// Lists available start times for an event type.
    pub async fn fetch_available_times(
        &self,
        credential: &str,
        query: &AvailabilityQuery,
    ) -> ProviderResult<Vec<AvailableTime>> {
        let params = [
            ("event_type", query.event_type.clone()),
            ("start_time", query.window.start_str()),
            ("end_time", query.window.end_str()),
            ("timezone", query.timezone.clone()),
        ];
        let response: Collection<AvailableTime> = self
            .get(credential, "/event_type_available_times", &params)
            .await?;
        Ok(response.collection)
    }

    /// Books an invitee and returns the provider's booking record.
    pub async fn book_invitee(
        &self,
        credential: &str,
        booking: &InviteeBooking,
    ) -> ProviderResult<Value> {
        let body = serde_json::to_value(booking).map_err(|e| {
            ProviderError::invalid_response(format!("failed to encode booking: {}", e))
        })?;
        let mut value: Value = self.post(credential, "/invitees", &body).await?;
        Ok(match value.get_mut("resource") {
            Some(resource) => resource.take(),
            None => value,
        })
    }

    /// Creates a scheduling link owned by an event type.
    pub async fn new_scheduling_link(
        &self,
        credential: &str,
        event_type: &str,
        max_event_count: u32,
    ) -> ProviderResult<SchedulingLink> {
        let body = json!({
            "max_event_count": max_event_count,
            "owner": event_type,
            "owner_type": "EventType",
        });
        let response: Resource<SchedulingLink> =
            self.post(credential, "/scheduling_links", &body).await?;
        Ok(response.resource)
    }
}

impl SchedulingProvider for CalendlyClient {
    fn name(&self) -> &str {
        "calendly"
    }

    fn current_user<'a>(&'a self, credential: &'a str) -> BoxFuture<'a, ProviderResult<UserInfo>> {
        Box::pin(self.fetch_current_user(credential))
    }

    fn list_event_types<'a>(
        &'a self,
        credential: &'a str,
        user_uri: &'a str,
    ) -> BoxFuture<'a, ProviderResult<Vec<EventTypeInfo>>> {
        Box::pin(self.fetch_event_types(credential, user_uri))
    }

    fn available_times<'a>(
        &'a self,
        credential: &'a str,
        query: AvailabilityQuery,
    ) -> BoxFuture<'a, ProviderResult<Vec<AvailableTime>>> {
        Box::pin(async move { self.fetch_available_times(credential, &query).await })
    }

    fn create_invitee<'a>(
        &'a self,
        credential: &'a str,
        booking: &'a InviteeBooking,
    ) -> BoxFuture<'a, ProviderResult<Value>> {
        Box::pin(self.book_invitee(credential, booking))
    }

    fn create_scheduling_link<'a>(
        &'a self,
        credential: &'a str,
        event_type: &'a str,
        max_event_count: u32,
    ) -> BoxFuture<'a, ProviderResult<SchedulingLink>> {
        Box::pin(self.new_scheduling_link(credential, event_type, max_event_count))
    }
}

fn decode<T: DeserializeOwned>(value: Value, path: &str) -> ProviderResult<T> {
    serde_json::from_value(value).map_err(|e| {
        ProviderError::invalid_response(format!("unexpected response shape from {path}: {e}"))
    })
}

/// Envelope of single-resource responses.
#[derive(Debug, Deserialize)]
struct Resource<T> {
    resource: T,
}

/// Envelope of collection responses.
#[derive(Debug, Deserialize)]
struct Collection<T> {
    #[serde(default = "Vec::new")]
    collection: Vec<T>,
    #[serde(default)]
    pagination: Option<Pagination>,
}

#[derive(Debug, Deserialize)]
struct Pagination {
    #[serde(default)]
    next_page_token: Option<String>,
}
