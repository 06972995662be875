//! Discovery configuration.
//!
//! ```rust
//! use discovery::{ContestOrder, DiscoveryConfig, PageBudget};
//!
//! let config = DiscoveryConfig {
//!     crawl_number: 3,
//!     ..Default::default()
//! };
//! assert_eq!(config.page_budget().unwrap(), PageBudget::Limited(3));
//! assert_eq!(config.order, ContestOrder::DateDesc);
//! ```

use serde::{Deserialize, Serialize};

use crate::discover::PageBudget;
use crate::error::DiscoveryError;
use crate::page::{ContestOrder, DEFAULT_ENTRIES_TEMPLATE};

/// Runtime configuration for contest discovery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    /// Configuration schema version.
    ///
    /// Default: `1`
    pub version: u32,

    /// Upstream origin, e.g. `https://www.example.net`.
    pub origin: String,

    /// Entries endpoint relative to `origin`. Placeholders: `{kind}`,
    /// `{name}`, `{page}`, `{order}`.
    ///
    /// Default: [`DEFAULT_ENTRIES_TEMPLATE`]
    pub entries_template: String,

    /// Pages to request per run; `-1` means until upstream runs out.
    ///
    /// Default: `-1`
    pub crawl_number: i64,

    /// Listing order sent upstream.
    ///
    /// Default: [`ContestOrder::DateDesc`]
    pub order: ContestOrder,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            version: 1,
            origin: "https://www.pixiv.net".to_string(),
            entries_template: DEFAULT_ENTRIES_TEMPLATE.to_string(),
            crawl_number: -1,
            order: ContestOrder::default(),
        }
    }
}

impl DiscoveryConfig {
    pub fn page_budget(&self) -> Result<PageBudget, DiscoveryError> {
        PageBudget::from_crawl_number(self.crawl_number)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.version == 0 {
            return Err(ConfigError::InvalidVersion(self.version));
        }
        if !(self.origin.starts_with("http://") || self.origin.starts_with("https://")) {
            return Err(ConfigError::InvalidOrigin(self.origin.clone()));
        }
        if !self.entries_template.contains("{page}") {
            return Err(ConfigError::TemplateMissingPage);
        }
        self.page_budget()?;
        Ok(())
    }
}

/// Errors raised by [`DiscoveryConfig::validate`].
#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("config version must be positive, got {0}")]
    InvalidVersion(u32),
    #[error("origin must be an http(s) url, got '{0}'")]
    InvalidOrigin(String),
    #[error("entries template must contain a {{page}} placeholder")]
    TemplateMissingPage,
    #[error(transparent)]
    Budget(#[from] DiscoveryError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_unlimited_and_valid() {
        let config = DiscoveryConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.page_budget().unwrap(), PageBudget::Unlimited);
    }

    #[test]
    fn zero_budget_is_rejected() {
        let config = DiscoveryConfig {
            crawl_number: 0,
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::Budget(DiscoveryError::InvalidPageBudget(0)))
        );
    }

    #[test]
    fn template_needs_page_placeholder() {
        let config = DiscoveryConfig {
            entries_template: "/ajax/{kind}/contest/{name}/entries".into(),
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::TemplateMissingPage));
    }
}
