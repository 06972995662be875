//! YAML configuration file support.
//!
//! All stage configurations live in one file and are validated together on
//! load.
//!
//! ## Example YAML Configuration
//!
//! ```yaml
//! version: "1.0"
//! name: "spring contest"
//!
//! fetch:
//!   max_retries: 5
//!   user_agent: "workcrawl/0.1"
//!   timeout_secs: 30
//!
//! normalize:
//!   version: 1
//!   image_size: original
//!   animation_format: webm
//!   markers:
//!     original_mark: "original"
//!     ai_mark: "AI-generated"
//!
//! discovery:
//!   version: 1
//!   origin: "https://www.pixiv.net"
//!   crawl_number: -1
//!   order: date_d
//!
//! output:
//!   conflict_action: uniquify
//! ```

use std::fs;
use std::path::Path;
use std::time::Duration;

use discovery::DiscoveryConfig;
use fetch::{ConflictAction, HttpTransport, RetryPolicy, TransportError, DEFAULT_MAX_RETRIES};
use normalize::NormalizeConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Upper bound accepted for `fetch.max_retries`.
const MAX_RETRIES_CEILING: u32 = 100;

/// Errors that can occur when loading YAML configuration files.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigLoadError {
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("unsupported config version: {0}")]
    UnsupportedVersion(String),

    #[error("normalize: {0}")]
    Normalize(#[from] normalize::ConfigError),

    #[error("discovery: {0}")]
    Discovery(#[from] discovery::ConfigError),
}

/// Top-level configuration for a crawl.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct WorkcrawlConfig {
    /// Configuration format version.
    pub version: String,

    /// Optional label for logs.
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub fetch: FetchYamlConfig,

    #[serde(default)]
    pub normalize: NormalizeConfig,

    #[serde(default)]
    pub discovery: DiscoveryConfig,

    #[serde(default)]
    pub output: OutputYamlConfig,
}

impl WorkcrawlConfig {
    /// Load a YAML configuration file from the given path.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigLoadError> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse YAML configuration from a string.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigLoadError> {
        let config: WorkcrawlConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigLoadError> {
        match self.version.as_str() {
            "1.0" | "1" => Ok(()),
            v => Err(ConfigLoadError::UnsupportedVersion(v.to_string())),
        }?;

        self.fetch.validate()?;
        self.normalize.validate()?;
        self.discovery.validate()?;
        Ok(())
    }

    /// Transport for the configured origin, carrying the fetch settings.
    pub fn http_transport(&self) -> Result<HttpTransport, TransportError> {
        self.fetch.transport(&self.discovery.origin)
    }
}

impl Default for WorkcrawlConfig {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            name: None,
            fetch: FetchYamlConfig::default(),
            normalize: NormalizeConfig::default(),
            discovery: DiscoveryConfig::default(),
            output: OutputYamlConfig::default(),
        }
    }
}

/// Request and retry settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchYamlConfig {
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    #[serde(default)]
    pub user_agent: Option<String>,

    /// Unset keeps the HTTP client's own default.
    #[serde(default)]
    pub timeout_secs: Option<u64>,

    /// Cookie header sent to the configured origin only.
    #[serde(default)]
    pub cookie: Option<String>,
}

impl FetchYamlConfig {
    fn validate(&self) -> Result<(), ConfigLoadError> {
        if self.max_retries > MAX_RETRIES_CEILING {
            return Err(ConfigLoadError::Validation(format!(
                "fetch.max_retries must be <= {MAX_RETRIES_CEILING}"
            )));
        }
        if self.timeout_secs == Some(0) {
            return Err(ConfigLoadError::Validation(
                "fetch.timeout_secs must be >= 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::default().with_max_retries(self.max_retries)
    }

    pub fn transport(&self, origin: &str) -> Result<HttpTransport, TransportError> {
        let mut builder = HttpTransport::builder().origin(origin);
        if let Some(agent) = &self.user_agent {
            builder = builder.user_agent(agent.clone());
        }
        if let Some(secs) = self.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        if let Some(cookie) = &self.cookie {
            builder = builder.cookie(cookie.clone());
        }
        builder.build()
    }
}

impl Default for FetchYamlConfig {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            user_agent: None,
            timeout_secs: None,
            cookie: None,
        }
    }
}

/// How finished files are handed to the host.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputYamlConfig {
    #[serde(default)]
    pub conflict_action: ConflictAction,
}

fn default_max_retries() -> u32 {
    DEFAULT_MAX_RETRIES
}

#[cfg(test)]
mod tests {
    use super::*;
    use discovery::{ContestOrder, PageBudget};
    use normalize::{AnimationFormat, ImageSize};
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_valid_yaml() {
        let yaml = r#"
version: "1.0"
name: "test config"
fetch:
  max_retries: 3
normalize:
  image_size: thumb
discovery:
  crawl_number: 4
  order: popular_d
"#;

        let config = WorkcrawlConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.name, Some("test config".to_string()));
        assert_eq!(config.fetch.retry_policy().max_retries, 3);
        assert_eq!(config.normalize.image_size, ImageSize::Thumb);
        assert_eq!(config.normalize.animation_format, AnimationFormat::Webm);
        assert_eq!(config.discovery.page_budget().unwrap(), PageBudget::Limited(4));
        assert_eq!(config.discovery.order, ContestOrder::PopularDesc);
    }

    #[test]
    fn test_restricted_order_falls_back() {
        let yaml = "version: \"1\"\ndiscovery:\n  order: redirect_premium\n";

        let config = WorkcrawlConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.discovery.order, ContestOrder::DateDesc);
    }

    #[test]
    fn test_load_from_file() {
        let yaml = r#"
version: "1"
discovery:
  origin: "https://www.example.net"
"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(yaml.as_bytes()).unwrap();

        let config = WorkcrawlConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.version, "1");
        assert_eq!(config.discovery.origin, "https://www.example.net");
        assert_eq!(config.fetch.max_retries, DEFAULT_MAX_RETRIES);
    }

    #[test]
    fn test_missing_file() {
        let result = WorkcrawlConfig::from_file("/nonexistent/workcrawl.yaml");
        assert!(matches!(result, Err(ConfigLoadError::FileRead(_))));
    }

    #[test]
    fn test_default_config() {
        let config = WorkcrawlConfig::default();
        assert_eq!(config.version, "1.0");
        assert!(config.validate().is_ok());
        assert_eq!(config.output.conflict_action, ConflictAction::Uniquify);
    }

    #[test]
    fn test_unsupported_version() {
        let result = WorkcrawlConfig::from_yaml("version: \"2\"\n");
        assert!(matches!(
            result,
            Err(ConfigLoadError::UnsupportedVersion(v)) if v == "2"
        ));
    }

    #[test]
    fn test_stage_validation() {
        let zero_budget = r#"
version: "1.0"
discovery:
  crawl_number: 0
"#;
        let err = WorkcrawlConfig::from_yaml(zero_budget).unwrap_err();
        assert!(matches!(err, ConfigLoadError::Discovery(_)));

        let same_markers = r#"
version: "1.0"
normalize:
  markers:
    original_mark: "x"
    ai_mark: "x"
"#;
        let err = WorkcrawlConfig::from_yaml(same_markers).unwrap_err();
        assert!(matches!(err, ConfigLoadError::Normalize(_)));

        let zero_timeout = r#"
version: "1.0"
fetch:
  timeout_secs: 0
"#;
        let err = WorkcrawlConfig::from_yaml(zero_timeout).unwrap_err();
        assert!(err.to_string().contains("timeout_secs"));
    }

    #[test]
    fn test_transport_from_config() {
        let config = WorkcrawlConfig::from_yaml(
            r#"
version: "1.0"
fetch:
  user_agent: "workcrawl-test"
  timeout_secs: 5
  cookie: "session=abc"
"#,
        )
        .unwrap();
        assert!(config.http_transport().is_ok());
    }
}
