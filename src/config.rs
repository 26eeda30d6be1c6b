use crate::error::{AdprobeError, Result};
use crate::poll::PollConfig;
use std::env;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://qa-internship.avito.com/api/1";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 5;
pub const DEFAULT_POLL_ATTEMPTS: u32 = 10;
pub const DEFAULT_POLL_DELAY_MS: u64 = 2000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeConfig {
    /// Service root without a trailing slash, e.g. `https://host/api/1`.
    pub base_url: String,
    pub request_timeout: Duration,
    /// Budget used when waiting for freshly created ads to show up.
    pub poll: PollConfig,
}

impl ProbeConfig {
    /// # Errors
    ///
    /// Returns [`AdprobeError::Config`] for a non-http(s) base URL or a zero
    /// request timeout.
    pub fn new(base_url: &str, request_timeout: Duration, poll: PollConfig) -> Result<Self> {
        if request_timeout.is_zero() {
            return Err(AdprobeError::Config(
                "request timeout must be greater than zero".to_string(),
            ));
        }
        Ok(Self {
            base_url: normalize_base_url(base_url)?,
            request_timeout,
            poll,
        })
    }

    /// Load configuration from environment variables.
    ///
    /// Optional: ADPROBE_BASE_URL (defaults to the public QA endpoint)
    /// Optional: ADPROBE_REQUEST_TIMEOUT_SECS (default 5)
    /// Optional: ADPROBE_POLL_ATTEMPTS (default 10)
    /// Optional: ADPROBE_POLL_DELAY_MS (default 2000)
    /// Optional: ADPROBE_POLL_DEADLINE_SECS (no deadline when unset)
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok().filter(|v| !v.is_empty()))
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_url = lookup("ADPROBE_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let timeout_secs = parse_var(&lookup, "ADPROBE_REQUEST_TIMEOUT_SECS")?
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS);
        let attempts =
            parse_var(&lookup, "ADPROBE_POLL_ATTEMPTS")?.unwrap_or(DEFAULT_POLL_ATTEMPTS);
        let delay_ms = parse_var(&lookup, "ADPROBE_POLL_DELAY_MS")?.unwrap_or(DEFAULT_POLL_DELAY_MS);
        let deadline_secs: Option<u64> = parse_var(&lookup, "ADPROBE_POLL_DEADLINE_SECS")?;

        let mut poll = PollConfig::new(attempts, Duration::from_millis(delay_ms))?;
        if let Some(secs) = deadline_secs {
            poll = poll.with_deadline(Duration::from_secs(secs));
        }

        Self::new(&base_url, Duration::from_secs(timeout_secs), poll)
    }

    /// Absolute URL for a path relative to the service root.
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            poll: PollConfig::new(
                DEFAULT_POLL_ATTEMPTS,
                Duration::from_millis(DEFAULT_POLL_DELAY_MS),
            )
            .unwrap_or_default(),
        }
    }
}

fn parse_var<F, T>(lookup: &F, key: &str) -> Result<Option<T>>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| AdprobeError::Config(format!("Invalid {}: {}", key, raw))),
    }
}

fn normalize_base_url(raw: &str) -> Result<String> {
    let url = reqwest::Url::parse(raw.trim())
        .map_err(|e| AdprobeError::Config(format!("Invalid base URL {}: {}", raw, e)))?;
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(AdprobeError::Config(format!(
            "Base URL must use http or https, got: {}",
            raw
        )));
    }
    Ok(url.as_str().trim_end_matches('/').to_string())
}
