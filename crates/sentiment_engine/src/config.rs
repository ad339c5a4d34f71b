use std::time::Duration;

use sentiment_core::AnalysisKind;

/// Analysis service used when nothing else is configured.
pub const DEFAULT_BASE_URL: &str = "https://sentimentscope-j7sl.onrender.com";

/// Environment variable that overrides [`DEFAULT_BASE_URL`].
pub const API_URL_ENV: &str = "SENTIMENT_API_URL";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid service base url {url:?}: {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}

/// Exponential backoff for transient failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one.
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    /// Delay before retry number `retry_index` (0 for the first retry): `base * 2^index`.
    pub fn delay_for(&self, retry_index: u32) -> Duration {
        self.base_delay.saturating_mul(2u32.saturating_pow(retry_index))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    base_url: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub max_response_bytes: u64,
    pub retry: RetryPolicy,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            max_response_bytes: 5 * 1024 * 1024,
            retry: RetryPolicy::default(),
        }
    }
}

impl ServiceConfig {
    /// Default settings pointed at `base_url`.
    pub fn new(base_url: &str) -> Result<Self, ConfigError> {
        Self::default().with_base_url(base_url)
    }

    /// Default settings, with the base URL taken from [`API_URL_ENV`] when set.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_value(std::env::var(API_URL_ENV).ok())
    }

    pub(crate) fn from_env_value(value: Option<String>) -> Result<Self, ConfigError> {
        match value {
            Some(url) if !url.trim().is_empty() => Self::new(&url),
            _ => Ok(Self::default()),
        }
    }

    pub fn with_base_url(mut self, base_url: &str) -> Result<Self, ConfigError> {
        self.base_url = validate_base_url(base_url)?;
        Ok(self)
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Full URL of the endpoint serving `kind`.
    pub fn endpoint_url(&self, kind: AnalysisKind) -> String {
        format!("{}{}", self.base_url, kind.endpoint_path())
    }
}

fn validate_base_url(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim().trim_end_matches('/');
    let invalid = |reason: String| ConfigError::InvalidBaseUrl {
        url: raw.to_string(),
        reason,
    };

    let parsed = url::Url::parse(trimmed).map_err(|err| invalid(err.to_string()))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme {}", parsed.scheme())));
    }
    if parsed.query().is_some() || parsed.fragment().is_some() {
        return Err(invalid("query and fragment are not allowed".to_string()));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_doubles_from_base() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_for(0), Duration::from_secs(1));
        assert_eq!(policy.delay_for(1), Duration::from_secs(2));
        assert_eq!(policy.delay_for(2), Duration::from_secs(4));
    }

    #[test]
    fn endpoint_urls_tolerate_trailing_slash() {
        let config = ServiceConfig::new("http://localhost:8000/").unwrap();
        assert_eq!(
            config.endpoint_url(AnalysisKind::Hashtag),
            "http://localhost:8000/analyze/hashtag"
        );

        let nested = ServiceConfig::new("https://api.example.com/v1").unwrap();
        assert_eq!(
            nested.endpoint_url(AnalysisKind::Url),
            "https://api.example.com/v1/analyze/url"
        );
    }

    #[test]
    fn env_value_overrides_default_when_present() {
        let default = ServiceConfig::from_env_value(None).unwrap();
        assert_eq!(default.base_url(), DEFAULT_BASE_URL);

        let blank = ServiceConfig::from_env_value(Some("  ".to_string())).unwrap();
        assert_eq!(blank.base_url(), DEFAULT_BASE_URL);

        let custom =
            ServiceConfig::from_env_value(Some("http://127.0.0.1:5000".to_string())).unwrap();
        assert_eq!(custom.base_url(), "http://127.0.0.1:5000");
    }

    #[test]
    fn bad_base_urls_are_rejected() {
        assert!(ServiceConfig::new("localhost:8000").is_err());
        assert!(ServiceConfig::new("ftp://example.com").is_err());
        assert!(ServiceConfig::new("https://example.com/?q=1").is_err());
    }
}
