//! Server configuration.
//!
//! Everything lives in one TOML file passed with `--config`:
//!
//! ```toml
//! [server]
//! bind = "0.0.0.0:8080"
//! default_timezone = "Asia/Kolkata"
//! slot_duration_minutes = 30
//!
//! [upstream]
//! base_url = "https://api.calendly.com"
//! request_timeout_secs = 30
//!
//! [[hosts]]
//! host_id = "alice"
//! display_name = "Alice"
//! pat_env = "CALENDLY_PAT_ALICE"
//! event_type_uri = "https://calendly.com/alice/30min"
//! priority_weight = 10
//! ```
//!
//! Access tokens are never stored here; each host names the environment
//! variable that holds its token.

use std::collections::HashSet;
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

use hostpool_core::{DEFAULT_TIMEZONE, Host};
use hostpool_providers::CalendlyConfig;
use serde::{Deserialize, Serialize};

use crate::error::{ServerError, ServerResult};

/// Rejection statuses that trigger the single-use link fallback.
pub const DEFAULT_FALLBACK_STATUSES: [u16; 3] = [400, 403, 409];

/// Top-level configuration file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default)]
    pub server: ServerSettings,

    #[serde(default)]
    pub upstream: UpstreamSettings,

    /// The host roster.
    #[serde(default)]
    pub hosts: Vec<Host>,
}

/// `[server]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Address the HTTP listener binds to.
    pub bind: SocketAddr,

    /// Timezone used when a request does not name one.
    pub default_timezone: String,

    /// Length of every offered slot.
    pub slot_duration_minutes: u32,

    /// Provider statuses on direct booking that switch to a scheduling link.
    pub fallback_statuses: Vec<u16>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], 8080)),
            default_timezone: DEFAULT_TIMEZONE.to_string(),
            slot_duration_minutes: 30,
            fallback_statuses: DEFAULT_FALLBACK_STATUSES.to_vec(),
        }
    }
}

impl ServerSettings {
    pub fn slot_duration(&self) -> chrono::Duration {
        chrono::Duration::minutes(i64::from(self.slot_duration_minutes))
    }
}

/// `[upstream]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UpstreamSettings {
    pub base_url: String,
    pub request_timeout_secs: u64,
}

impl Default for UpstreamSettings {
    fn default() -> Self {
        Self {
            base_url: CalendlyConfig::DEFAULT_BASE_URL.to_string(),
            request_timeout_secs: CalendlyConfig::DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl UpstreamSettings {
    /// Builds the HTTP client configuration.
    pub fn client_config(&self) -> ServerResult<CalendlyConfig> {
        let config = CalendlyConfig::new(&self.base_url)
            .map_err(|e| ServerError::config(format!("invalid upstream.base_url: {e}")))?;
        Ok(config.with_timeout(Duration::from_secs(self.request_timeout_secs)))
    }
}

impl ServerConfig {
    /// Loads and validates configuration from `path`.
    pub fn load_from(path: &Path) -> ServerResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ServerError::config(format!("failed to read {}: {e}", path.display()))
        })?;
        Self::from_toml(&content)
    }

    /// Parses and validates configuration from TOML text.
    pub fn from_toml(content: &str) -> ServerResult<Self> {
        let config: Self = toml::from_str(content)
            .map_err(|e| ServerError::config(format!("failed to parse config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Checks the roster and policy values.
    pub fn validate(&self) -> ServerResult<()> {
        if self.hosts.is_empty() {
            return Err(ServerError::config("no hosts configured"));
        }

        let mut seen = HashSet::new();
        for host in &self.hosts {
            let fields = [
                ("host_id", &host.host_id),
                ("display_name", &host.display_name),
                ("pat_env", &host.pat_env),
                ("event_type_uri", &host.event_type_uri),
            ];
            if let Some((name, _)) = fields.iter().find(|(_, v)| v.trim().is_empty()) {
                return Err(ServerError::config(format!(
                    "host {:?} has an empty {name}",
                    host.host_id
                )));
            }
            if !seen.insert(host.host_id.as_str()) {
                return Err(ServerError::config(format!(
                    "duplicate host_id {:?}",
                    host.host_id
                )));
            }
        }

        if self.server.slot_duration_minutes == 0 {
            return Err(ServerError::config(
                "server.slot_duration_minutes must be greater than zero",
            ));
        }
        if self.server.default_timezone.trim().is_empty() {
            return Err(ServerError::config("server.default_timezone is empty"));
        }
        Ok(())
    }
}
