//! Calendly client configuration.

use std::time::Duration;
use url::Url;

/// Configuration for the Calendly client.
#[derive(Debug, Clone)]
pub struct CalendlyConfig {
    /// Base URL of the API; every request path is joined onto it.
    pub base_url: Url,

    /// Per-request timeout.
    pub timeout: Duration,

    /// User agent string.
    pub user_agent: String,
}

impl CalendlyConfig {
    /// Public Calendly API endpoint.
    pub const DEFAULT_BASE_URL: &'static str = "https://api.calendly.com";

    /// Default timeout in seconds.
    pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

    /// Creates a configuration pointing at `base_url`.
    ///
    /// A path prefix such as `https://gw.example/calendly` is kept: request
    /// paths are appended below it.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid.
    pub fn new(base_url: impl AsRef<str>) -> Result<Self, url::ParseError> {
        Ok(Self {
            base_url: with_trailing_slash(Url::parse(base_url.as_ref())?),
            timeout: Duration::from_secs(Self::DEFAULT_TIMEOUT_SECS),
            user_agent: format!("hostpool/{}", env!("CARGO_PKG_VERSION")),
        })
    }

    /// Builder: set request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Builder: set user agent.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

impl Default for CalendlyConfig {
    fn default() -> Self {
        Self {
            base_url: Url::parse(Self::DEFAULT_BASE_URL).expect("valid default URL"),
            timeout: Duration::from_secs(Self::DEFAULT_TIMEOUT_SECS),
            user_agent: format!("hostpool/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Ensures the URL path ends in `/` so that joining a relative path keeps
/// every existing segment.
pub(crate) fn with_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_points_at_public_api() {
        let config = CalendlyConfig::default();
        assert_eq!(config.base_url.as_str(), "https://api.calendly.com/");
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert!(config.user_agent.starts_with("hostpool/"));
    }

    #[test]
    fn custom_config() {
        let config = CalendlyConfig::new("http://127.0.0.1:9000")
            .unwrap()
            .with_timeout(Duration::from_secs(5))
            .with_user_agent("test-agent");

        assert_eq!(config.base_url.as_str(), "http://127.0.0.1:9000/");
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.user_agent, "test-agent");
    }

    #[test]
    fn path_prefix_is_kept() {
        let config = CalendlyConfig::new("https://gw.example/calendly").unwrap();
        assert_eq!(config.base_url.as_str(), "https://gw.example/calendly/");
        assert_eq!(
            config.base_url.join("users/me").unwrap().as_str(),
            "https://gw.example/calendly/users/me"
        );

        let config = CalendlyConfig::new("https://gw.example/calendly/").unwrap();
        assert_eq!(config.base_url.as_str(), "https://gw.example/calendly/");
    }

    #[test]
    fn invalid_url_is_rejected() {
        assert!(CalendlyConfig::new("not a url").is_err());
    }
}
