//! Client configuration
//!
//! Values come from the environment, falling back to defaults that match
//! the reference task store running locally.

use std::time::Duration;

use crate::filter::DEFAULT_SEARCH_DEBOUNCE;
use crate::{Error, Result};

pub const DEFAULT_API_URL: &str = "http://localhost:8000";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL of the remote task store
    pub api_url: String,
    /// Quiet period before typed search text is applied
    pub search_debounce: Duration,
    /// Per-request timeout for the HTTP gateway
    pub request_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            search_debounce: DEFAULT_SEARCH_DEBOUNCE,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

impl ClientConfig {
    /// Read `TASKSYNC_API_URL`, `TASKSYNC_SEARCH_DEBOUNCE_MS` and
    /// `TASKSYNC_REQUEST_TIMEOUT_SECS`
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();

        let api_url = match lookup("TASKSYNC_API_URL") {
            Some(raw) if !raw.trim().is_empty() => raw.trim().to_string(),
            _ => defaults.api_url,
        };

        let search_debounce = env_number(&lookup, "TASKSYNC_SEARCH_DEBOUNCE_MS")?
            .map(Duration::from_millis)
            .unwrap_or(defaults.search_debounce);

        let request_timeout = match env_number(&lookup, "TASKSYNC_REQUEST_TIMEOUT_SECS")? {
            Some(0) => {
                return Err(Error::Config(
                    "TASKSYNC_REQUEST_TIMEOUT_SECS must be greater than zero".into(),
                ))
            }
            Some(secs) => Duration::from_secs(secs),
            None => defaults.request_timeout,
        };

        Ok(Self {
            api_url,
            search_debounce,
            request_timeout,
        })
    }

    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    pub fn with_search_debounce(mut self, search_debounce: Duration) -> Self {
        self.search_debounce = search_debounce;
        self
    }
}

fn env_number(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> Result<Option<u64>> {
    match lookup(name) {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| Error::Config(format!("{} must be a whole number, got '{}'", name, raw))),
        _ => Ok(None),
    }
}
