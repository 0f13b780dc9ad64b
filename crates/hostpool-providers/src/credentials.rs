//! Host credential lookup.
//!
//! Each host names the environment variable holding its personal access
//! token (`pat_env`). Tokens are read when needed, never logged, and a
//! missing variable is a configuration error for that host alone.

use std::collections::HashMap;
use std::fmt;

use hostpool_core::Host;

use crate::error::{ProviderError, ProviderResult};

/// Resolves host credentials from the environment or from explicit values.
#[derive(Clone, Default)]
pub struct CredentialStore {
    /// Explicit tokens keyed by variable name; checked before the environment.
    tokens: HashMap<String, String>,
    /// Whether to fall back to the process environment.
    read_env: bool,
}

impl CredentialStore {
    /// A store backed by the process environment.
    pub fn from_env() -> Self {
        Self {
            tokens: HashMap::new(),
            read_env: true,
        }
    }

    /// A store that only knows the tokens added with [`with_token`](Self::with_token).
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Builder: provide the token for variable `var`.
    pub fn with_token(mut self, var: impl Into<String>, token: impl Into<String>) -> Self {
        self.tokens.insert(var.into(), token.into());
        self
    }

    /// Returns the token for `host`.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the variable is unset or blank.
    pub fn token_for(&self, host: &Host) -> ProviderResult<String> {
        let var = host.pat_env.as_str();
        let token = match self.tokens.get(var) {
            Some(token) => Some(token.clone()),
            None if self.read_env => std::env::var(var).ok(),
            None => None,
        };

        token
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| {
                ProviderError::configuration(format!("credential variable `{}` is not set", var))
                    .with_host(&host.host_id)
            })
    }
}

impl fmt::Debug for CredentialStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut vars: Vec<_> = self.tokens.keys().collect();
        vars.sort();
        f.debug_struct("CredentialStore")
            .field("tokens", &vars)
            .field("read_env", &self.read_env)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProviderErrorCode;

    fn host(var: &str) -> Host {
        Host::new("alice", "Alice", var, "https://calendly.com/alice/30min")
    }

    #[test]
    fn explicit_token_is_returned() {
        let store = CredentialStore::in_memory().with_token("PAT_ALICE", "secret");
        assert_eq!(store.token_for(&host("PAT_ALICE")).unwrap(), "secret");
    }

    #[test]
    fn missing_token_is_configuration_error() {
        let store = CredentialStore::in_memory();
        let err = store.token_for(&host("PAT_ALICE")).unwrap_err();
        assert_eq!(err.code(), ProviderErrorCode::Configuration);
        assert_eq!(err.host(), Some("alice"));
        assert!(err.message().contains("PAT_ALICE"));
    }

    #[test]
    fn blank_token_counts_as_missing() {
        let store = CredentialStore::in_memory().with_token("PAT_ALICE", "  ");
        assert!(store.token_for(&host("PAT_ALICE")).is_err());
    }

    #[test]
    fn env_token_is_read() {
        unsafe {
            std::env::set_var("_HOSTPOOL_TEST_PAT", "env-secret");
        }
        let store = CredentialStore::from_env();
        assert_eq!(
            store.token_for(&host("_HOSTPOOL_TEST_PAT")).unwrap(),
            "env-secret"
        );
        unsafe {
            std::env::remove_var("_HOSTPOOL_TEST_PAT");
        }
    }

    #[test]
    fn debug_output_hides_tokens() {
        let store = CredentialStore::in_memory().with_token("PAT_ALICE", "very-secret");
        let debug = format!("{:?}", store);
        assert!(debug.contains("PAT_ALICE"));
        assert!(!debug.contains("very-secret"));
    }
}
