//! Core runtime configuration.
//!
//! Configuration is resolved once at process startup and then passed into the core services.
//! Nothing in the fetch/classify/submit path reads process-wide environment variables, which
//! keeps behaviour consistent across concurrent runs and test harnesses.

use crate::constants::{
    DEFAULT_MAX_RETRIES, DEFAULT_PAGE_DELAY_MS, DEFAULT_REQUEST_TIMEOUT_SECS,
    DEFAULT_RETRY_DELAY_MS,
};
use crate::error::{ConfigError, ConfigResult};
use crate::fetcher::RetryPolicy;
use std::time::Duration;

/// Environment variable holding the remote API base URL.
pub const API_BASE_URL_VAR: &str = "API_BASE_URL";
/// Environment variable holding the remote API key.
pub const API_KEY_VAR: &str = "API_KEY";
/// Environment variable overriding the per-page retry budget.
pub const MAX_RETRIES_VAR: &str = "MAX_RETRIES";
/// Environment variable overriding the backoff base delay (milliseconds).
pub const RETRY_DELAY_VAR: &str = "RETRY_DELAY";
/// Environment variable overriding the pacing delay between pages (milliseconds).
pub const PAGE_DELAY_VAR: &str = "PAGE_DELAY";
/// Environment variable overriding the per-request timeout (seconds).
pub const REQUEST_TIMEOUT_VAR: &str = "REQUEST_TIMEOUT_SECS";

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    base_url: String,
    api_key: String,
    retry_policy: RetryPolicy,
    request_timeout: Duration,
}

impl CoreConfig {
    /// Create a new `CoreConfig`.
    ///
    /// The base URL is stored without a trailing slash so endpoint paths can be appended
    /// directly.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidInput` if the base URL is empty or not an http(s) URL, or if
    /// the API key is empty.
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        retry_policy: RetryPolicy,
        request_timeout: Duration,
    ) -> ConfigResult<Self> {
        let base_url = base_url.into().trim().trim_end_matches('/').to_string();
        let api_key = api_key.into().trim().to_string();

        if base_url.is_empty() {
            return Err(ConfigError::InvalidInput(
                "base_url cannot be empty".into(),
            ));
        }
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ConfigError::InvalidInput(format!(
                "base_url must start with http:// or https:// (got {base_url})"
            )));
        }
        if api_key.is_empty() {
            return Err(ConfigError::InvalidInput("api_key cannot be empty".into()));
        }

        Ok(Self {
            base_url,
            api_key,
            retry_policy,
            request_timeout,
        })
    }

    /// Resolve configuration through a variable lookup.
    ///
    /// Binaries pass `|name| std::env::var(name).ok()` after loading `.env`; tests pass a map.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> ConfigResult<Self> {
        let base_url = required_value(API_BASE_URL_VAR, lookup(API_BASE_URL_VAR))?;
        let api_key = required_value(API_KEY_VAR, lookup(API_KEY_VAR))?;

        let max_retries = u32_from_env_value(
            MAX_RETRIES_VAR,
            lookup(MAX_RETRIES_VAR),
            DEFAULT_MAX_RETRIES,
        )?;
        let retry_delay_ms = u64_from_env_value(
            RETRY_DELAY_VAR,
            lookup(RETRY_DELAY_VAR),
            DEFAULT_RETRY_DELAY_MS,
        )?;
        let page_delay_ms = u64_from_env_value(
            PAGE_DELAY_VAR,
            lookup(PAGE_DELAY_VAR),
            DEFAULT_PAGE_DELAY_MS,
        )?;
        let timeout_secs = u64_from_env_value(
            REQUEST_TIMEOUT_VAR,
            lookup(REQUEST_TIMEOUT_VAR),
            DEFAULT_REQUEST_TIMEOUT_SECS,
        )?;

        let retry_policy = RetryPolicy {
            max_retries,
            base_delay: Duration::from_millis(retry_delay_ms),
            page_delay: Duration::from_millis(page_delay_ms),
            ..RetryPolicy::default()
        };

        Self::new(
            base_url,
            api_key,
            retry_policy,
            Duration::from_secs(timeout_secs),
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry_policy
    }

    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }
}

fn required_value(name: &'static str, value: Option<String>) -> ConfigResult<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or(ConfigError::Missing(name))
}

/// Parse an optional numeric setting.
///
/// If `value` is `None` or empty/whitespace, returns `default`.
pub fn u64_from_env_value(
    name: &'static str,
    value: Option<String>,
    default: u64,
) -> ConfigResult<u64> {
    let value = value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty());

    match value {
        None => Ok(default),
        Some(v) => v
            .parse::<u64>()
            .map_err(|_| ConfigError::InvalidNumber { name, value: v }),
    }
}

/// Parse an optional retry-count style setting. See [`u64_from_env_value`].
pub fn u32_from_env_value(
    name: &'static str,
    value: Option<String>,
    default: u32,
) -> ConfigResult<u32> {
    let parsed = u64_from_env_value(name, value.clone(), u64::from(default))?;
    u32::try_from(parsed).map_err(|_| ConfigError::InvalidNumber {
        name,
        value: value.unwrap_or_default(),
    })
}
