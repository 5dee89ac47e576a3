/// Configuration schema for the auth client
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::error::ConfigError;

/// Client configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ClientConfig {
    /// Base URL of the RedefineAuth deployment
    pub base_url: String,

    /// Tenant identifier sent as `redefineDeveloperId`
    pub developer_id: String,

    /// Version reported to the server. The server may reject outdated versions.
    #[serde(default = "default_app_version")]
    pub app_version: String,

    /// Overall per-request timeout (seconds)
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Total attempts per request, including the first one
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Delay before the first retry (milliseconds), doubled on each retry
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,

    /// Directory name created under the user data directory
    #[serde(default = "default_app_dir_name")]
    pub app_dir_name: String,

    /// Explicit credential file location, overrides `app_dir_name`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credentials_path: Option<PathBuf>,
}

fn default_app_version() -> String {
    "1.0.0.0".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_max_attempts() -> u32 {
    3
}

fn default_base_delay_ms() -> u64 {
    1000
}

fn default_app_dir_name() -> String {
    "RedefineAuth".to_string()
}

fn resolve_base_url(configured: &str, compile_time: Option<&str>) -> String {
    let configured = configured.trim();
    let url = if configured.is_empty() {
        compile_time.map(str::trim).unwrap_or_default()
    } else {
        configured
    };
    url.trim_end_matches('/').to_string()
}

impl ClientConfig {
    /// Config with defaults for everything but the two required fields
    pub fn new(base_url: impl Into<String>, developer_id: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            developer_id: developer_id.into(),
            app_version: default_app_version(),
            timeout_secs: default_timeout_secs(),
            max_attempts: default_max_attempts(),
            base_delay_ms: default_base_delay_ms(),
            app_dir_name: default_app_dir_name(),
            credentials_path: None,
        }
    }

    pub fn with_app_version(mut self, app_version: impl Into<String>) -> Self {
        self.app_version = app_version.into();
        self
    }

    pub fn with_credentials_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.credentials_path = Some(path.into());
        self
    }

    /// Effective base URL with trailing slashes trimmed.
    ///
    /// A blank `base_url` falls back to `REDEFINE_API_BASE_URL` baked in at
    /// compile time, if any.
    pub fn api_base_url(&self) -> String {
        resolve_base_url(&self.base_url, option_env!("REDEFINE_API_BASE_URL"))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn base_delay(&self) -> Duration {
        Duration::from_millis(self.base_delay_ms)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        let effective_url = self.api_base_url();

        if effective_url.is_empty() {
            return Err(ConfigError::Missing("base_url"));
        }

        if (!effective_url.starts_with("http://") && !effective_url.starts_with("https://"))
            || reqwest::Url::parse(&effective_url).is_err()
        {
            return Err(ConfigError::InvalidBaseUrl(effective_url));
        }

        if self.developer_id.trim().is_empty() {
            return Err(ConfigError::Missing("developer_id"));
        }

        if self.app_dir_name.trim().is_empty() && self.credentials_path.is_none() {
            return Err(ConfigError::Missing("app_dir_name"));
        }

        if self.timeout_secs == 0 {
            return Err(ConfigError::NotPositive { field: "timeout_secs" });
        }

        if self.max_attempts == 0 {
            return Err(ConfigError::NotPositive { field: "max_attempts" });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_validation() {
        let mut config = ClientConfig::new("https://auth.example.com/", "dev_123");
        assert!(config.validate().is_ok());

        config.developer_id = "  ".to_string();
        assert!(matches!(config.validate(), Err(ConfigError::Missing("developer_id"))));

        config.developer_id = "dev_123".to_string();
        config.max_attempts = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NotPositive { field: "max_attempts" })
        ));
    }

    #[test]
    fn test_rejects_url_without_scheme() {
        let config = ClientConfig::new("auth.example.com", "dev_123");
        assert!(matches!(config.validate(), Err(ConfigError::InvalidBaseUrl(_))));
    }

    #[test]
    fn test_trailing_slash_trimmed() {
        let config = ClientConfig::new("http://localhost:3000//", "dev_123");
        assert_eq!(config.api_base_url(), "http://localhost:3000");
    }

    #[test]
    fn test_configured_url_wins_over_compile_time() {
        assert_eq!(
            resolve_base_url("https://tenant-a.example.com/", Some("https://baked.example.com")),
            "https://tenant-a.example.com"
        );
        assert_eq!(
            resolve_base_url("  ", Some("https://baked.example.com/")),
            "https://baked.example.com"
        );
        assert_eq!(resolve_base_url("", None), "");
    }

    #[test]
    fn test_malformed_configured_url_rejected() {
        let config = ClientConfig::new("not-a-url", "dev_123");
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidBaseUrl(url)) if url == "not-a-url"
        ));

        let config = ClientConfig::new("http://[bad-host", "dev_123");
        assert!(matches!(config.validate(), Err(ConfigError::InvalidBaseUrl(_))));
    }

    #[test]
    fn test_default_values() {
        let json = r#"{
            "base_url": "https://auth.example.com",
            "developer_id": "dev_123"
        }"#;

        let config: ClientConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.app_version, "1.0.0.0");
        assert_eq!(config.timeout(), Duration::from_secs(30));
        assert_eq!(config.max_attempts, 3);
        assert_eq!(config.base_delay(), Duration::from_secs(1));
        assert_eq!(config.app_dir_name, "RedefineAuth");
        assert!(config.credentials_path.is_none());
    }
}
