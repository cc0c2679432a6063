//! Sync configuration.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{SyncError, SyncResult};
use crate::retry::{Backoff, RetryPolicy};

/// Connection settings for the remote ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Base URL of the remote API, e.g. `https://pos.example.com/api/v1`.
    pub base_url: String,
    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,
    /// Total attempt budget per push.
    pub max_attempts: u32,
    /// Base delay between attempts, in milliseconds.
    pub base_delay_ms: u64,
    /// `"exponential"` or `"linear"`.
    pub backoff: String,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080/api/v1".to_string(),
            request_timeout_secs: 10,
            max_attempts: 3,
            base_delay_ms: 1000,
            backoff: "exponential".to_string(),
        }
    }
}

impl SyncConfig {
    /// Load from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> SyncResult<Self> {
        let raw = std::fs::read_to_string(path.as_ref())
            .map_err(|e| SyncError::Config(format!("read {}: {e}", path.as_ref().display())))?;
        toml::from_str(&raw).map_err(|e| SyncError::Config(e.to_string()))
    }

    /// Parsed and validated endpoint URL for sale submission.
    pub fn sale_url(&self) -> SyncResult<Url> {
        let base = Url::parse(&self.base_url).map_err(|e| SyncError::InvalidUrl(e.to_string()))?;
        base.join("sales/")
            .map_err(|e| SyncError::InvalidUrl(e.to_string()))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        let backoff = match self.backoff.as_str() {
            "linear" => Backoff::Linear,
            _ => Backoff::Exponential,
        };
        RetryPolicy::new(
            self.max_attempts,
            Duration::from_millis(self.base_delay_ms),
            backoff,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_sane() {
        let config = SyncConfig::default();
        assert_eq!(config.max_attempts, 3);
        assert_eq!(config.retry_policy().backoff, Backoff::Exponential);
        assert!(config.sale_url().is_ok());
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: SyncConfig =
            toml::from_str(r#"base_url = "https://pos.example.com/api/v1""#).unwrap();
        assert_eq!(config.base_url, "https://pos.example.com/api/v1");
        assert_eq!(config.max_attempts, 3);
    }

    #[test]
    fn test_linear_backoff_string() {
        let config: SyncConfig = toml::from_str(r#"backoff = "linear""#).unwrap();
        assert_eq!(config.retry_policy().backoff, Backoff::Linear);
    }

    #[test]
    fn test_bad_url_is_rejected() {
        let config = SyncConfig {
            base_url: "not a url".into(),
            ..Default::default()
        };
        assert!(matches!(config.sale_url(), Err(SyncError::InvalidUrl(_))));
    }
}
