//! Settings loaded from environment variables.
//!
//! - `SMM_API_KEY`: panel API key (optional until a network action is made)
//! - `SMM_API_URL`: panel endpoint, defaults to [`DEFAULT_ENDPOINT`]
//! - `SMM_TIMEOUT`: per-request timeout in seconds, defaults to 30
//! - `DRY_RUN`: `1` simulates order placement
//! - `SMM_RETRY_ATTEMPTS` / `SMM_RETRY_BASE_MS`: retry budget for transient failures
//!
//! Invalid values are logged and replaced by their defaults; loading never fails.

use std::time::Duration;

use crate::client::{DEFAULT_ENDPOINT, RetryPolicy};
use crate::domain::ApiKey;

pub const API_KEY_VAR: &str = "SMM_API_KEY";
pub const API_URL_VAR: &str = "SMM_API_URL";
pub const TIMEOUT_VAR: &str = "SMM_TIMEOUT";
pub const DRY_RUN_VAR: &str = "DRY_RUN";
pub const RETRY_ATTEMPTS_VAR: &str = "SMM_RETRY_ATTEMPTS";
pub const RETRY_BASE_MS_VAR: &str = "SMM_RETRY_BASE_MS";

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, PartialEq, Eq)]
/// Immutable process settings, read once at startup.
pub struct Settings {
    pub api_key: Option<ApiKey>,
    pub api_url: String,
    pub timeout: Duration,
    pub dry_run: bool,
    pub retry: RetryPolicy,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_key: None,
            api_url: DEFAULT_ENDPOINT.to_owned(),
            timeout: DEFAULT_TIMEOUT,
            dry_run: false,
            retry: RetryPolicy::default(),
        }
    }
}

impl Settings {
    /// Read settings from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read settings through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_owned())
                .filter(|value| !value.is_empty())
        };
        let defaults = Self::default();

        let api_key = var(API_KEY_VAR).and_then(|value| ApiKey::new(value).ok());

        let api_url = match var(API_URL_VAR) {
            Some(value) if url::Url::parse(&value).is_ok() => value,
            Some(value) => {
                tracing::warn!(
                    var = API_URL_VAR,
                    value = %value,
                    default = DEFAULT_ENDPOINT,
                    "invalid endpoint URL, using default"
                );
                defaults.api_url
            }
            None => defaults.api_url,
        };

        let timeout = positive_var(&var, TIMEOUT_VAR, |value| {
            value
                .parse::<f64>()
                .ok()
                .filter(|secs| *secs > 0.0)
                .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
        })
        .unwrap_or(defaults.timeout);

        let dry_run = var(DRY_RUN_VAR).as_deref() == Some("1");

        let max_attempts = positive_var(&var, RETRY_ATTEMPTS_VAR, |value| {
            value.parse::<u32>().ok().filter(|attempts| *attempts > 0)
        })
        .unwrap_or(defaults.retry.max_attempts);

        let base_delay = positive_var(&var, RETRY_BASE_MS_VAR, |value| {
            value.parse::<u64>().ok().filter(|ms| *ms > 0).map(Duration::from_millis)
        })
        .unwrap_or(defaults.retry.base_delay);

        Self {
            api_key,
            api_url,
            timeout,
            dry_run,
            retry: RetryPolicy {
                max_attempts,
                base_delay,
            },
        }
    }
}

fn positive_var<T>(
    var: &impl Fn(&str) -> Option<String>,
    name: &str,
    parse: impl Fn(&str) -> Option<T>,
) -> Option<T> {
    let value = var(name)?;
    let parsed = parse(&value);
    if parsed.is_none() {
        tracing::warn!(var = name, value = %value, "expected a positive number, using default");
    }
    parsed
}
